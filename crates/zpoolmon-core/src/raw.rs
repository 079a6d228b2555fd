//! Serde shapes for the records `zpool status -j` emits.
//!
//! Fields are loosely typed here. The domain types in `pool`, `vdev` and
//! `scan` decode them once; nothing past that boundary sees raw strings.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::units::from_human;

/// A numeric field as it appears in either output mode.
///
/// `--json-int` yields plain integers; the default mode yields strings,
/// sometimes humanised ("1.50G").
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Numeric {
    Int(u64),
    Float(f64),
    Text(String),
}

impl Numeric {
    pub(crate) fn as_count(&self) -> Option<u64> {
        match self {
            Numeric::Int(n) => Some(*n),
            Numeric::Float(f) if f.is_finite() && *f >= 0.0 => Some(f.round() as u64),
            Numeric::Float(_) => None,
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }

    pub(crate) fn as_bytes(&self) -> Option<u64> {
        match self {
            Numeric::Text(s) => {
                let s = s.trim();
                s.parse()
                    .ok()
                    .or_else(|| from_human(s).ok().map(|b| b.round() as u64))
            }
            other => other.as_count(),
        }
    }

    pub(crate) fn as_timestamp(&self) -> Option<i64> {
        match self {
            Numeric::Int(n) => i64::try_from(*n).ok(),
            Numeric::Float(f) if f.is_finite() => Some(f.round() as i64),
            Numeric::Float(_) => None,
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPool {
    pub state: String,
    pub status: Option<String>,
    pub action: Option<String>,
    pub error_count: Numeric,
    #[serde(default)]
    pub vdevs: Map<String, Value>,
    pub scan_stats: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawVdev {
    pub name: Option<String>,
    pub state: String,
    pub devid: Option<String>,
    pub path: Option<String>,
    pub phys_space: Option<Numeric>,
    pub def_space: Option<Numeric>,
    pub read_errors: Numeric,
    pub write_errors: Numeric,
    pub checksum_errors: Numeric,
    pub trim_notsup: Option<Value>,
    pub trim_state: Option<String>,
    pub trim_time: Option<Numeric>,
    pub trimmed: Option<Numeric>,
    pub to_trim: Option<Numeric>,
    #[serde(default)]
    pub vdevs: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawScan {
    pub function: Option<String>,
    pub state: Option<String>,
    pub start_time: Option<Numeric>,
    pub end_time: Option<Numeric>,
    pub pass_start: Option<Numeric>,
    pub to_examine: Option<Numeric>,
    pub examined: Option<Numeric>,
    pub skipped: Option<Numeric>,
    pub issued: Option<Numeric>,
    pub processed: Option<Numeric>,
    pub errors: Option<Numeric>,
}
