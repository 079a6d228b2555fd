use serde_json::json;
use zpoolmon_core::{FormatError, Pool, PoolView};

use crate::report::{text_bar, write_text};

const NOW: i64 = 1_700_000_000;

fn mirror_pool() -> serde_json::Value {
    let disk = |name: &str| {
        json!({
            "state": "ONLINE",
            "path": format!("/dev/{name}"),
            "phys_space": 1_073_741_824_u64,
            "read_errors": 0,
            "write_errors": 0,
            "checksum_errors": 0,
        })
    };
    json!({
        "state": "ONLINE",
        "error_count": 0,
        "vdevs": {
            "mirror-0": {
                "state": "ONLINE",
                "read_errors": 0,
                "write_errors": 0,
                "checksum_errors": 0,
                "vdevs": { "sda": disk("sda"), "sdb": disk("sdb") },
            },
        },
        "scan_stats": {
            "function": "SCRUB",
            "state": "SCANNING",
            "start_time": NOW - 60,
            "pass_start": NOW - 60,
            "to_examine": 100,
            "examined": 50,
            "skipped": 0,
            "issued": 60,
            "processed": 0,
            "errors": 0,
        },
    })
}

fn render(views: &[PoolView]) -> String {
    let mut out = String::new();
    write_text(&mut out, views).expect("write to string");
    out
}

#[test]
fn report_lists_summary_devices_and_scan() {
    // Arrange
    let pool = Pool::parse("tank", &mirror_pool()).expect("valid pool");
    let view = PoolView::build(&pool, NOW);

    // Act
    let text = render(&[view]);

    // Assert
    assert!(text.starts_with("── ZPool - tank "));
    assert!(text.contains("State:  ONLINE"));
    assert!(text.contains("Errors: No known data errors"));
    assert!(text.contains("\n  mirror-0 "));
    assert!(text.contains("\n    sda "));
    assert!(text.contains("/dev/sdb"));
    assert!(text.contains("1.00G"));
    assert!(text.contains("🧼 Scrub Status"));
    assert!(text.contains("🏁 60.00B of 100.00B at 1.00B/s"));
    assert!(text.contains("⏳️ 0:00:40 remaining"));
}

#[test]
fn status_and_action_carry_their_own_glyphs() {
    // Arrange
    let mut record = mirror_pool();
    record["status"] = json!("One or more devices has experienced an error.");
    record["action"] = json!("Determine if the device needs to be replaced.");
    let pool = Pool::parse("tank", &record).expect("valid pool");

    // Act
    let text = render(&[PoolView::build(&pool, NOW)]);

    // Assert
    assert!(text.contains("Status: 🚩 One or more devices has experienced an error."));
    assert!(text.contains("Action: 📝 Determine if the device needs to be replaced."));
    assert!(!text.contains("🚩 ⚠️"));
    assert!(!text.contains("📝 ⚠️"));
}

#[test]
fn failed_pool_is_reported_with_its_error() {
    let err = FormatError::Record {
        pool: "broken".to_string(),
        reason: "missing field `state`".to_string(),
    };

    let text = render(&[PoolView::failed("broken", &err)]);

    assert!(text.contains("ZPool - broken"));
    assert!(text.contains("⚠️ UNKNOWN"));
    assert!(text.contains("missing field `state`"));
}

#[test]
fn bar_width_is_fixed() {
    let (filled, empty) = text_bar(50.0, 10);
    assert_eq!((filled.chars().count(), empty.chars().count()), (5, 5));

    let (filled, empty) = text_bar(140.0, 10);
    assert_eq!((filled.chars().count(), empty.chars().count()), (10, 0));
}
