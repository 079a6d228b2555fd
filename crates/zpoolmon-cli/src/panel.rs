use chrono::Utc;
use ratatui::text::{Line, Span};
use tracing::debug;
use zpoolmon_core::{DeviceRow, Panel, PoolEntry, PoolView, Severity, TrimCell};

use crate::report::{device_label, field_icon, scan_title, summary_text, text_bar, trim_text, DEVICE_HEADERS};
use crate::theme::Theme;

const BAR_WIDTH: usize = 24;
const SCROLL_STEP: u16 = 5;

/// One pool's box on the dashboard. Survives refreshes; only `view` is
/// replaced when new data arrives.
pub struct PoolPanel {
    pub name: String,
    pub view: PoolView,
    pub scroll: u16,
}

impl Panel for PoolPanel {
    fn mount(name: &str, entry: &PoolEntry) -> Self {
        Self {
            name: name.to_string(),
            view: build_view(name, entry),
            scroll: 0,
        }
    }

    fn update(&mut self, entry: &PoolEntry) {
        self.view = build_view(&self.name, entry);
    }

    fn dispose(self) {
        debug!(pool = %self.name, "panel disposed");
    }
}

/// Row count as a terminal height, saturating at `u16::MAX`.
pub fn line_height(lines: usize) -> u16 {
    u16::try_from(lines).unwrap_or(u16::MAX)
}

fn build_view(name: &str, entry: &PoolEntry) -> PoolView {
    match entry {
        Ok(pool) => PoolView::build(pool, Utc::now().timestamp()),
        Err(err) => PoolView::failed(name, err),
    }
}

impl PoolPanel {
    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(SCROLL_STEP);
    }

    pub fn scroll_down(&mut self, content_height: u16) {
        self.scroll = self.scroll.saturating_add(SCROLL_STEP).min(content_height.saturating_sub(1));
    }

    pub fn title(&self) -> String {
        format!(" ZPool - {} ", self.name)
    }

    pub fn severity(&self) -> Severity {
        self.view.severity()
    }

    pub fn lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let width = self.view.summary.iter().map(|row| row.label.len()).max().unwrap_or(0) + 1;
        for row in &self.view.summary {
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<width$} ", format!("{}:", row.label)), theme.label),
                Span::styled(summary_text(row), theme.severity(row.severity)),
            ]));
        }

        if !self.view.devices.is_empty() {
            lines.push(Line::from(""));
            lines.extend(device_lines(&self.view.devices, theme));
        }

        if let Some(scan) = &self.view.scan {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(format!(" {}", scan_title(scan)), theme.scan(scan.tone))));

            let width = scan.rows.iter().map(|row| row.label.len()).max().unwrap_or(0) + 1;
            for row in &scan.rows {
                let label = format!("   {:<width$} ", format!("{}:", row.label));
                let mut values = row.value.lines();
                lines.push(Line::from(vec![
                    Span::styled(label, theme.label),
                    Span::styled(
                        format!("{}{}", field_icon(row.field), values.next().unwrap_or_default()),
                        theme.text,
                    ),
                ]));
                for rest in values {
                    lines.push(Line::from(Span::styled(format!("   {:<width$} {rest}", ""), theme.text_dim)));
                }

                if let Some(cell) = &row.progress {
                    let (filled, empty) = text_bar(cell.percent, BAR_WIDTH);
                    let mut spans = vec![
                        Span::raw(format!("   {:<width$} ", "")),
                        Span::styled(filled, theme.bar_fill),
                        Span::styled(empty, theme.bar_empty),
                        Span::styled(format!(" {:5.1}%", cell.percent), theme.text),
                    ];
                    if !cell.caption.is_empty() {
                        spans.push(Span::styled(format!("  ⏳️ {}", cell.caption), theme.text_dim));
                    }
                    lines.push(Line::from(spans));
                }
            }
        }

        lines
    }
}

fn device_lines(rows: &[DeviceRow], theme: &Theme) -> Vec<Line<'static>> {
    let name_width = rows
        .iter()
        .map(|row| device_label(row).chars().count())
        .chain([DEVICE_HEADERS[0].len()])
        .max()
        .unwrap_or(0);
    let device_width = rows
        .iter()
        .map(|row| row.device.chars().count())
        .chain([DEVICE_HEADERS[3].len()])
        .max()
        .unwrap_or(0);

    let mut lines = vec![Line::from(Span::styled(
        format!(
            " {:<name_width$}  {:<8}  {:>8}  {:<device_width$}  {:>5}  {:>5}  {:>5}  {}",
            DEVICE_HEADERS[0],
            DEVICE_HEADERS[1],
            DEVICE_HEADERS[2],
            DEVICE_HEADERS[3],
            DEVICE_HEADERS[4],
            DEVICE_HEADERS[5],
            DEVICE_HEADERS[6],
            DEVICE_HEADERS[7],
        ),
        theme.label,
    ))];

    for row in rows {
        let count = |n: u64| {
            let style = if n > 0 { theme.warn } else { theme.text };
            Span::styled(format!("  {n:>5}"), style)
        };
        let trim_style = match row.trim {
            TrimCell::InProgress { .. } => theme.bar_fill,
            _ => theme.text_dim,
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {:<name_width$}", device_label(row)), theme.text),
            Span::styled(format!("  {:<8}", row.state), theme.severity(row.severity)),
            Span::styled(format!("  {:>8}", row.size), theme.text),
            Span::styled(format!("  {:<device_width$}", row.device), theme.text_dim),
            count(row.read_errors),
            count(row.write_errors),
            count(row.checksum_errors),
            Span::styled(format!("  {}", trim_text(&row.trim)), trim_style),
        ]));
    }

    lines
}
