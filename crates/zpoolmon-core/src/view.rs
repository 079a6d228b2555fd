//! Presentation-neutral rows for a pool: what to show, in which order, and
//! how loudly. Glyphs, colours and layout belong to the renderer.

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::error::FormatError;
use crate::pool::Pool;
use crate::scan::{ScanKind, ScanPhase, ScanResult};
use crate::units::{format_duration, human_bytes, to_human};
use crate::vdev::{DeviceNode, Severity, TrimStatus};

pub const WARNING_MARKER: &str = "⚠️ ";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolView {
    pub name: String,
    pub summary: Vec<SummaryRow>,
    pub devices: Vec<DeviceRow>,
    pub scan: Option<ScanSection>,
}

/// Which fact a summary row carries. Status and Action are zpool's own
/// explanatory text and get their own glyphs from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SummaryField {
    State,
    Status,
    Action,
    Errors,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub field: SummaryField,
    pub label: &'static str,
    pub value: String,
    pub severity: Severity,
}

impl SummaryRow {
    fn new(field: SummaryField, label: &'static str, value: String, severity: Severity) -> Self {
        Self {
            field,
            label,
            value,
            severity,
        }
    }

    /// The value as it should read on screen. Unhealthy state and error rows
    /// carry the warning marker.
    pub fn display_value(&self) -> String {
        match (self.field, self.severity) {
            (_, Severity::Ok) | (SummaryField::Status | SummaryField::Action, _) => self.value.clone(),
            _ => format!("{WARNING_MARKER}{}", self.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRow {
    pub depth: usize,
    pub name: String,
    pub state: String,
    pub severity: Severity,
    /// Humanised capacity, empty when the node has none.
    pub size: String,
    pub device: String,
    pub read_errors: u64,
    pub write_errors: u64,
    pub checksum_errors: u64,
    pub trim: TrimCell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TrimCell {
    Empty,
    LastTrimmed(String),
    InProgress { trimmed: String, total: String, percent: f64 },
    State(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanTone {
    Scrub,
    Resilver,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSection {
    pub tone: ScanTone,
    pub title: String,
    pub rows: Vec<ScanRow>,
}

/// Which fact a scan row carries, so the renderer can pick a glyph for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanField {
    Finished,
    Started,
    Scanned,
    Issued,
    Duration,
    Repaired,
    Resilvered,
    UnknownFunction,
    UnknownState,
    DebugData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRow {
    pub field: ScanField,
    pub label: &'static str,
    pub value: String,
    pub progress: Option<ProgressCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressCell {
    /// 0..=100
    pub percent: f64,
    pub caption: String,
}

impl PoolView {
    /// Build the rows for `pool`; `now` (unix seconds) drives scan rates and ETA.
    pub fn build(pool: &Pool, now: i64) -> Self {
        Self {
            name: pool.name.clone(),
            summary: summary_rows(pool),
            devices: pool.devices().into_iter().map(device_row).collect(),
            scan: pool.scan.as_ref().map(|scan| scan_section(scan, now)),
        }
    }

    /// Stand-in for a pool whose status record could not be parsed.
    pub fn failed(name: &str, error: &FormatError) -> Self {
        Self {
            name: name.to_string(),
            summary: vec![
                SummaryRow::new(SummaryField::State, "State", "UNKNOWN".to_string(), Severity::Critical),
                SummaryRow::new(SummaryField::Error, "Error", error.to_string(), Severity::Critical),
            ],
            devices: Vec::new(),
            scan: None,
        }
    }

    pub fn severity(&self) -> Severity {
        self.summary
            .iter()
            .map(|row| row.severity)
            .chain(self.devices.iter().map(|row| row.severity))
            .max()
            .unwrap_or(Severity::Ok)
    }
}

fn summary_rows(pool: &Pool) -> Vec<SummaryRow> {
    let mut rows = vec![SummaryRow::new(
        SummaryField::State,
        "State",
        pool.health.label().to_string(),
        pool.health.severity(),
    )];

    if let Some(status) = &pool.status {
        rows.push(SummaryRow::new(SummaryField::Status, "Status", status.clone(), Severity::Warning));
    }
    if let Some(action) = &pool.action {
        rows.push(SummaryRow::new(SummaryField::Action, "Action", action.clone(), Severity::Warning));
    }

    rows.push(match pool.error_count {
        0 => SummaryRow::new(SummaryField::Errors, "Errors", "No known data errors".to_string(), Severity::Ok),
        n => SummaryRow::new(
            SummaryField::Errors,
            "Errors",
            format!("Detected {n} data errors"),
            Severity::Critical,
        ),
    });

    rows
}

fn device_row(node: &DeviceNode) -> DeviceRow {
    let severity = match node.health.severity() {
        Severity::Ok if node.has_errors() => Severity::Warning,
        other => other,
    };

    DeviceRow {
        depth: node.depth,
        name: node.name.clone(),
        state: node.health.label().to_string(),
        severity,
        size: if node.capacity > 0 { human_bytes(node.capacity) } else { String::new() },
        device: node.device.clone(),
        read_errors: node.read_errors,
        write_errors: node.write_errors,
        checksum_errors: node.checksum_errors,
        trim: trim_cell(node.trim.as_ref()),
    }
}

fn trim_cell(trim: Option<&TrimStatus>) -> TrimCell {
    match trim {
        None | Some(TrimStatus::Unsupported) => TrimCell::Empty,
        Some(TrimStatus::Complete { last_trimmed }) => TrimCell::LastTrimmed(local_time(*last_trimmed)),
        Some(TrimStatus::Active { trimmed, to_trim }) => TrimCell::InProgress {
            trimmed: human_bytes(*trimmed),
            total: human_bytes(*to_trim),
            percent: trim.and_then(TrimStatus::percent).unwrap_or(0.0),
        },
        Some(TrimStatus::Other(state)) => TrimCell::State(state.to_lowercase()),
    }
}

fn scan_section(scan: &ScanResult, now: i64) -> ScanSection {
    let (tone, title, finished_label, processed) = match &scan.kind {
        ScanKind::Scrub => (ScanTone::Scrub, "Scrub Status", "Last Scrub Finished", (ScanField::Repaired, "Repaired")),
        ScanKind::Resilver => (
            ScanTone::Resilver,
            "Resilver Status",
            "Last Resilver Finished",
            (ScanField::Resilvered, "Resilvered"),
        ),
        ScanKind::Other(function) => {
            let mut rows = vec![row(ScanField::UnknownFunction, "Unknown Function", function.clone())];
            rows.extend(debug_rows(&scan.phase));
            return ScanSection {
                tone: ScanTone::Unknown,
                title: "Unknown Function Status".to_string(),
                rows,
            };
        }
    };

    let rows = match &scan.phase {
        ScanPhase::Finished {
            end_time,
            examined,
            processed: processed_bytes,
            errors,
            ..
        } => {
            let mut rows = vec![row(ScanField::Finished, finished_label, local_time(*end_time))];
            if let Some(examined) = examined {
                rows.push(row(ScanField::Scanned, "Scanned", human_bytes(*examined)));
            }
            rows.push(row(
                ScanField::Duration,
                "Duration",
                format_duration(scan.duration().unwrap_or(0)),
            ));
            rows.push(row(
                processed.0,
                processed.1,
                format!("{} with {errors} errors", human_bytes(*processed_bytes)),
            ));
            rows
        }
        ScanPhase::Scanning {
            start_time,
            examined,
            to_examine,
            issued,
            processed: processed_bytes,
            ..
        } => match scan.progress(now) {
            Some(progress) => vec![
                row(ScanField::Started, "Started", local_time(*start_time)),
                ScanRow {
                    field: ScanField::Scanned,
                    label: "Scanned",
                    value: format!("{} of {}", human_bytes(*examined), human_bytes(*to_examine)),
                    progress: Some(ProgressCell {
                        percent: progress.scan_pct,
                        caption: String::new(),
                    }),
                },
                ScanRow {
                    field: ScanField::Issued,
                    label: "Issued",
                    value: format!(
                        "{} of {} at {}/s",
                        human_bytes(*issued),
                        human_bytes(*to_examine),
                        to_human(progress.issue_rate)
                    ),
                    progress: Some(ProgressCell {
                        percent: progress.issue_pct,
                        caption: format!("{} remaining", format_duration(progress.eta_secs)),
                    }),
                },
                row(processed.0, processed.1, human_bytes(*processed_bytes)),
            ],
            None => debug_rows(&scan.phase),
        },
        ScanPhase::Unknown { .. } => debug_rows(&scan.phase),
    };

    ScanSection {
        tone,
        title: title.to_string(),
        rows,
    }
}

fn debug_rows(phase: &ScanPhase) -> Vec<ScanRow> {
    match phase {
        ScanPhase::Unknown { raw_state, raw_payload } => vec![
            row(ScanField::UnknownState, "Unknown State", raw_state.clone()),
            row(
                ScanField::DebugData,
                "Debug Data",
                serde_json::to_string_pretty(raw_payload).unwrap_or_else(|_| raw_payload.to_string()),
            ),
        ],
        _ => Vec::new(),
    }
}

fn row(field: ScanField, label: &'static str, value: String) -> ScanRow {
    ScanRow {
        field,
        label,
        value,
        progress: None,
    }
}

/// Unix seconds as local time, in the locale's preferred format.
pub fn local_time(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0).single() {
        Some(time) => time.format("%c").to_string(),
        None => timestamp.to_string(),
    }
}
