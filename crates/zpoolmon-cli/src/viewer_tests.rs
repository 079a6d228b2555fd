use chrono::Utc;
use serde_json::json;
use zpoolmon_core::{FetchError, PoolSnapshot, StatusDocument};

use crate::panel::line_height;
use crate::theme::Theme;
use crate::viewer::Dashboard;

fn snapshot(names: &[&str]) -> PoolSnapshot {
    let pools = names
        .iter()
        .map(|name| {
            let record = json!({
                "state": "ONLINE",
                "error_count": 0,
                "vdevs": {
                    "sda": {
                        "state": "ONLINE",
                        "read_errors": 0,
                        "write_errors": 0,
                        "checksum_errors": 0,
                    },
                },
            });
            (name.to_string(), record)
        })
        .collect();
    PoolSnapshot::from_document(&StatusDocument { pools }, Utc::now())
}

#[test]
fn failed_refresh_keeps_previous_panels() {
    // Arrange
    let mut dashboard = Dashboard::new(Theme::default());
    dashboard.apply(Ok(snapshot(&["tank", "backup"])));
    dashboard.focused_mut().expect("focused panel").scroll = 3;

    // Act
    dashboard.apply(Err(FetchError::Timeout(std::time::Duration::from_secs(30))));

    // Assert
    assert_eq!(dashboard.panels.len(), 2);
    assert!(dashboard.last_error.as_deref().is_some_and(|e| e.contains("timed out")));
    assert_eq!(dashboard.focused_mut().expect("focused panel").scroll, 3);
}

#[test]
fn successful_refresh_clears_the_error() {
    let mut dashboard = Dashboard::new(Theme::default());
    dashboard.apply(Err(FetchError::CommandNotFound("zpool".to_string())));

    dashboard.apply(Ok(snapshot(&["tank"])));

    assert!(dashboard.last_error.is_none());
    assert!(dashboard.last_refresh.is_some());
    assert_eq!(dashboard.panels.names(), ["tank"]);
}

#[test]
fn focus_is_clamped_when_pools_disappear() {
    // Arrange
    let mut dashboard = Dashboard::new(Theme::default());
    dashboard.apply(Ok(snapshot(&["a", "b", "c"])));
    dashboard.focus_next();
    dashboard.focus_next();
    dashboard.focus_next();
    assert_eq!(dashboard.focus, 2);

    // Act
    dashboard.apply(Ok(snapshot(&["a"])));

    // Assert
    assert_eq!(dashboard.focus, 0);
    assert_eq!(dashboard.focused_mut().expect("focused panel").name, "a");
}

#[test]
fn panels_render_summary_and_devices() {
    let mut dashboard = Dashboard::new(Theme::default());
    dashboard.apply(Ok(snapshot(&["tank"])));

    let panel = dashboard.focused_mut().expect("focused panel");
    let text: Vec<String> = panel
        .lines(&Theme::default())
        .iter()
        .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
        .collect();

    assert!(text[0].contains("State:") && text[0].contains("ONLINE"));
    assert!(text.iter().any(|line| line.trim_start().starts_with("sda")));
}

#[test]
fn oversized_panel_height_saturates() {
    assert_eq!(line_height(12), 12);
    assert_eq!(line_height(usize::from(u16::MAX) + 1), u16::MAX);
    assert_eq!(line_height(1_000_000), u16::MAX);
}

#[test]
fn scrolling_stops_at_the_last_line() {
    // Arrange
    let mut dashboard = Dashboard::new(Theme::default());
    dashboard.apply(Ok(snapshot(&["tank"])));
    let panel = dashboard.focused_mut().expect("focused panel");

    // Act
    for _ in 0..10 {
        panel.scroll_down(line_height(7));
    }

    // Assert
    assert_eq!(panel.scroll, 6);
    panel.scroll = u16::MAX - 1;
    panel.scroll_down(line_height(1_000_000));
    assert_eq!(panel.scroll, u16::MAX - 1);
}
