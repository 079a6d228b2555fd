use serde::Deserialize;
use serde_json::Value;

use crate::raw::{Numeric, RawScan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanKind {
    Scrub,
    Resilver,
    /// Raw `function` value, carried through unmodified.
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanPhase {
    Finished {
        start_time: i64,
        end_time: i64,
        /// Only scrubs report this.
        examined: Option<u64>,
        processed: u64,
        errors: u64,
    },
    Scanning {
        start_time: i64,
        pass_start: i64,
        examined: u64,
        to_examine: u64,
        skipped: u64,
        issued: u64,
        processed: u64,
    },
    Unknown {
        raw_state: String,
        raw_payload: Value,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub kind: ScanKind,
    pub phase: ScanPhase,
}

/// Derived metrics for a scan that is still running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanProgress {
    pub remaining_to_scan: u64,
    /// 0..=100
    pub scan_pct: f64,
    /// 0..=100
    pub issue_pct: f64,
    pub elapsed_secs: u64,
    /// Bytes per second, never below 1.
    pub issue_rate: f64,
    pub eta_secs: u64,
}

impl ScanResult {
    /// Classify a `scan_stats` record. Never fails: anything that can't be
    /// understood lands in [`ScanPhase::Unknown`] with the payload intact.
    pub fn parse(payload: &Value) -> ScanResult {
        let raw = match RawScan::deserialize(payload) {
            Ok(raw) => raw,
            Err(_) => {
                return ScanResult {
                    kind: ScanKind::Other(field_text(payload, "function")),
                    phase: unknown(payload),
                }
            }
        };

        let kind = match raw.function.as_deref() {
            Some("SCRUB") => ScanKind::Scrub,
            Some("RESILVER") => ScanKind::Resilver,
            other => ScanKind::Other(other.unwrap_or_default().to_string()),
        };

        let phase = match (&kind, raw.state.as_deref()) {
            (ScanKind::Other(_), _) => None,
            (_, Some("FINISHED")) => finished(&raw, kind == ScanKind::Scrub),
            (_, Some("SCANNING")) => scanning(&raw),
            _ => None,
        }
        .unwrap_or_else(|| unknown(payload));

        ScanResult { kind, phase }
    }

    /// Progress as of `now` (unix seconds); `None` unless the scan is running.
    pub fn progress(&self, now: i64) -> Option<ScanProgress> {
        let ScanPhase::Scanning {
            pass_start,
            examined,
            to_examine,
            skipped,
            issued,
            ..
        } = self.phase
        else {
            return None;
        };

        let remaining_to_scan = to_examine.saturating_sub(skipped);
        let percent = |part: u64| {
            if remaining_to_scan == 0 {
                0.0
            } else {
                (100.0 * part as f64 / remaining_to_scan as f64).clamp(0.0, 100.0)
            }
        };

        let elapsed_secs = now.saturating_sub(pass_start).max(1) as u64;
        let issue_rate = (issued as f64 / elapsed_secs as f64).max(1.0);
        let eta = ((remaining_to_scan as f64 - issued as f64) / issue_rate).round();

        Some(ScanProgress {
            remaining_to_scan,
            scan_pct: percent(examined),
            issue_pct: percent(issued),
            elapsed_secs,
            issue_rate,
            eta_secs: eta.max(0.0) as u64,
        })
    }

    /// Wall-clock seconds a finished scan took.
    pub fn duration(&self) -> Option<u64> {
        match self.phase {
            ScanPhase::Finished { start_time, end_time, .. } => Some(end_time.saturating_sub(start_time).max(0) as u64),
            _ => None,
        }
    }
}

fn finished(raw: &RawScan, scrub: bool) -> Option<ScanPhase> {
    Some(ScanPhase::Finished {
        start_time: timestamp(&raw.start_time)?,
        end_time: timestamp(&raw.end_time)?,
        examined: if scrub { Some(bytes(&raw.examined)?) } else { None },
        processed: bytes(&raw.processed)?,
        errors: raw.errors.as_ref().and_then(Numeric::as_count)?,
    })
}

fn scanning(raw: &RawScan) -> Option<ScanPhase> {
    Some(ScanPhase::Scanning {
        start_time: timestamp(&raw.start_time)?,
        pass_start: timestamp(&raw.pass_start)?,
        examined: bytes(&raw.examined)?,
        to_examine: bytes(&raw.to_examine)?,
        skipped: bytes(&raw.skipped)?,
        issued: bytes(&raw.issued)?,
        processed: bytes(&raw.processed)?,
    })
}

fn unknown(payload: &Value) -> ScanPhase {
    ScanPhase::Unknown {
        raw_state: field_text(payload, "state"),
        raw_payload: payload.clone(),
    }
}

fn bytes(field: &Option<Numeric>) -> Option<u64> {
    field.as_ref().and_then(Numeric::as_bytes)
}

fn timestamp(field: &Option<Numeric>) -> Option<i64> {
    field.as_ref().and_then(Numeric::as_timestamp)
}

fn field_text(payload: &Value, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
