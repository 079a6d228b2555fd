use std::fmt::{self, Write};

use zpoolmon_core::{DeviceRow, PoolView, ScanField, ScanSection, ScanTone, SummaryField, SummaryRow, TrimCell};

pub const DEVICE_HEADERS: [&str; 8] = ["Name", "State", "Size", "Device", "Read", "Write", "Cksum", "Trim"];

const BAR_WIDTH: usize = 30;

pub fn scan_title(section: &ScanSection) -> String {
    let icon = match section.tone {
        ScanTone::Scrub => "🧼",
        ScanTone::Resilver => "🥈",
        ScanTone::Unknown => "❌",
    };
    format!("{icon} {}", section.title)
}

pub fn field_icon(field: ScanField) -> &'static str {
    match field {
        ScanField::Finished | ScanField::Started => "🕓 ",
        ScanField::Scanned => "🔍 ",
        ScanField::Issued => "🏁 ",
        ScanField::Duration => "⌛ ",
        ScanField::Repaired => "🪛 ",
        ScanField::Resilvered => "🚧 ",
        ScanField::UnknownFunction | ScanField::UnknownState | ScanField::DebugData => "",
    }
}

pub fn summary_icon(field: SummaryField) -> &'static str {
    match field {
        SummaryField::Status => "🚩 ",
        SummaryField::Action => "📝 ",
        SummaryField::State | SummaryField::Errors | SummaryField::Error => "",
    }
}

/// Summary value with its glyph and marker, as both renderers print it.
pub fn summary_text(row: &SummaryRow) -> String {
    format!("{}{}", summary_icon(row.field), row.display_value())
}

pub fn trim_text(cell: &TrimCell) -> String {
    match cell {
        TrimCell::Empty => String::new(),
        TrimCell::LastTrimmed(when) => when.clone(),
        TrimCell::InProgress { trimmed, total, percent } => format!("✂️ {trimmed} of {total} ({percent:.1}%)"),
        TrimCell::State(state) => state.clone(),
    }
}

/// `percent` as a fixed-width run of filled and empty cells.
pub fn text_bar(percent: f64, width: usize) -> (String, String) {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    ("█".repeat(filled), "░".repeat(width - filled))
}

/// Indented name, as the device table shows it.
pub fn device_label(row: &DeviceRow) -> String {
    format!("{}{}", "  ".repeat(row.depth), row.name)
}

pub fn write_text(out: &mut impl Write, views: &[PoolView]) -> fmt::Result {
    for (idx, view) in views.iter().enumerate() {
        if idx > 0 {
            writeln!(out)?;
        }
        write_pool(out, view)?;
    }
    Ok(())
}

fn write_pool(out: &mut impl Write, view: &PoolView) -> fmt::Result {
    writeln!(out, "── ZPool - {} {}", view.name, "─".repeat(40usize.saturating_sub(view.name.len())))?;

    let width = view.summary.iter().map(|row| row.label.len()).max().unwrap_or(0) + 1;
    for row in &view.summary {
        writeln!(out, "  {:<width$} {}", format!("{}:", row.label), summary_text(row))?;
    }

    if !view.devices.is_empty() {
        writeln!(out)?;
        write_devices(out, &view.devices)?;
    }

    if let Some(scan) = &view.scan {
        writeln!(out)?;
        write_scan(out, scan)?;
    }
    Ok(())
}

fn write_devices(out: &mut impl Write, rows: &[DeviceRow]) -> fmt::Result {
    let cells: Vec<[String; 8]> = rows
        .iter()
        .map(|row| {
            [
                device_label(row),
                row.state.clone(),
                row.size.clone(),
                row.device.clone(),
                row.read_errors.to_string(),
                row.write_errors.to_string(),
                row.checksum_errors.to_string(),
                trim_text(&row.trim),
            ]
        })
        .collect();

    let mut widths = DEVICE_HEADERS.map(str::len);
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = DEVICE_HEADERS
        .iter()
        .zip(widths)
        .map(|(title, width)| format!("{title:<width$}"))
        .collect();
    writeln!(out, "  {}", header.join("  ").trim_end())?;

    for line in &cells {
        let padded: Vec<String> = line
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(col, (cell, width))| {
                // error counters are right-aligned
                if (4..=6).contains(&col) {
                    format!("{cell:>width$}")
                } else {
                    format!("{cell:<width$}")
                }
            })
            .collect();
        writeln!(out, "  {}", padded.join("  ").trim_end())?;
    }
    Ok(())
}

fn write_scan(out: &mut impl Write, scan: &ScanSection) -> fmt::Result {
    writeln!(out, "  {}", scan_title(scan))?;

    let width = scan.rows.iter().map(|row| row.label.len()).max().unwrap_or(0) + 1;
    for row in &scan.rows {
        let label = format!("{}:", row.label);
        let mut lines = row.value.lines();
        let first = lines.next().unwrap_or_default();
        writeln!(out, "    {label:<width$} {}{first}", field_icon(row.field))?;
        for rest in lines {
            writeln!(out, "    {:<width$} {rest}", "")?;
        }

        if let Some(cell) = &row.progress {
            let (filled, empty) = text_bar(cell.percent, BAR_WIDTH);
            let caption = if cell.caption.is_empty() {
                String::new()
            } else {
                format!("  ⏳️ {}", cell.caption)
            };
            writeln!(out, "    {:<width$} {filled}{empty} {:5.1}%{caption}", "", cell.percent)?;
        }
    }
    Ok(())
}
