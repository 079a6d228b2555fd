use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FormatError;
use crate::raw::{Numeric, RawVdev};

/// Health reported for a pool or one of its vdevs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Health {
    Online,
    Degraded,
    Offline,
    /// FAULTED, UNAVAIL, REMOVED, or anything newer than this tool.
    Other(String),
}

/// How loudly a value should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
}

impl Health {
    pub fn parse(state: &str) -> Self {
        match state {
            "ONLINE" => Health::Online,
            "DEGRADED" => Health::Degraded,
            "OFFLINE" => Health::Offline,
            other => Health::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Health::Online => "ONLINE",
            Health::Degraded => "DEGRADED",
            Health::Offline => "OFFLINE",
            Health::Other(label) => label,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Health::Online => Severity::Ok,
            Health::Degraded | Health::Offline => Severity::Warning,
            Health::Other(_) => Severity::Critical,
        }
    }

    pub fn needs_attention(&self) -> bool {
        !matches!(self, Health::Online)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrimStatus {
    Unsupported,
    /// Not running; unix timestamp of the last completed trim.
    Complete { last_trimmed: i64 },
    Active { trimmed: u64, to_trim: u64 },
    /// UNTRIMMED, SUSPENDED, CANCELED, ...
    Other(String),
}

impl TrimStatus {
    pub fn percent(&self) -> Option<f64> {
        match self {
            TrimStatus::Active { to_trim: 0, .. } => Some(0.0),
            TrimStatus::Active { trimmed, to_trim } => {
                Some((100.0 * *trimmed as f64 / *to_trim as f64).clamp(0.0, 100.0))
            }
            _ => None,
        }
    }
}

/// One node of a pool's vdev tree: a physical device or a grouping
/// (root, mirror, raidz) of other nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceNode {
    pub name: String,
    /// Position in the tree, 0 for the nodes listed directly under the pool.
    pub depth: usize,
    pub health: Health,
    /// `devid`, falling back to `path`; empty when neither is reported.
    pub device: String,
    /// Bytes; 0 when the node reports no capacity of its own.
    pub capacity: u64,
    pub read_errors: u64,
    pub write_errors: u64,
    pub checksum_errors: u64,
    pub trim: Option<TrimStatus>,
    pub children: Vec<DeviceNode>,
}

impl DeviceNode {
    /// Decode an ordered `vdevs` map, assigning `depth` to every entry and
    /// one more to each level below it.
    pub fn parse_tree(pool: &str, vdevs: &Map<String, Value>, depth: usize) -> Result<Vec<DeviceNode>, FormatError> {
        vdevs
            .iter()
            .map(|(key, value)| DeviceNode::parse(pool, key, value, depth))
            .collect()
    }

    fn parse(pool: &str, key: &str, value: &Value, depth: usize) -> Result<DeviceNode, FormatError> {
        let raw = RawVdev::deserialize(value).map_err(|err| FormatError::Record {
            pool: pool.to_string(),
            reason: format!("vdev {key}: {err}"),
        })?;
        let name = raw.name.clone().unwrap_or_else(|| key.to_string());

        let counter = |field: &Numeric, label: &str| {
            field.as_count().ok_or_else(|| FormatError::Record {
                pool: pool.to_string(),
                reason: format!("vdev {name}: {label} is not a count"),
            })
        };
        let read_errors = counter(&raw.read_errors, "read_errors")?;
        let write_errors = counter(&raw.write_errors, "write_errors")?;
        let checksum_errors = counter(&raw.checksum_errors, "checksum_errors")?;

        let capacity = raw
            .phys_space
            .as_ref()
            .or(raw.def_space.as_ref())
            .and_then(Numeric::as_bytes)
            .unwrap_or(0);
        let device = raw.devid.clone().or_else(|| raw.path.clone()).unwrap_or_default();
        let trim = parse_trim(pool, &name, &raw)?;
        let children = DeviceNode::parse_tree(pool, &raw.vdevs, depth + 1)?;

        Ok(DeviceNode {
            health: Health::parse(&raw.state),
            name,
            depth,
            device,
            capacity,
            read_errors,
            write_errors,
            checksum_errors,
            trim,
            children,
        })
    }

    pub fn has_errors(&self) -> bool {
        self.read_errors > 0 || self.write_errors > 0 || self.checksum_errors > 0
    }
}

/// Depth-first, parents before children, siblings in reported order.
pub fn flatten(nodes: &[DeviceNode]) -> Vec<&DeviceNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&DeviceNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.children.iter().rev());
    }
    out
}

fn parse_trim(pool: &str, device: &str, raw: &RawVdev) -> Result<Option<TrimStatus>, FormatError> {
    let Some(flag) = raw.trim_notsup.as_ref() else {
        return Ok(None);
    };

    let supported = match flag {
        Value::Number(n) if n.as_u64() == Some(0) => true,
        Value::Number(n) if n.as_u64() == Some(1) => false,
        Value::String(s) if s == "0" => true,
        Value::String(s) if s == "1" => false,
        other => {
            return Err(FormatError::TrimSupport {
                device: device.to_string(),
                value: other.to_string(),
            })
        }
    };
    if !supported {
        return Ok(Some(TrimStatus::Unsupported));
    }

    let missing = |field: &str| FormatError::Record {
        pool: pool.to_string(),
        reason: format!("vdev {device}: trim {field} missing"),
    };

    let status = match raw.trim_state.as_deref() {
        Some("COMPLETE") => TrimStatus::Complete {
            last_trimmed: raw
                .trim_time
                .as_ref()
                .and_then(Numeric::as_timestamp)
                .ok_or_else(|| missing("trim_time"))?,
        },
        Some("ACTIVE") => TrimStatus::Active {
            trimmed: raw.trimmed.as_ref().and_then(Numeric::as_bytes).ok_or_else(|| missing("trimmed"))?,
            to_trim: raw.to_trim.as_ref().and_then(Numeric::as_bytes).ok_or_else(|| missing("to_trim"))?,
        },
        Some(other) => TrimStatus::Other(other.to_string()),
        None => return Err(missing("trim_state")),
    };

    Ok(Some(status))
}
