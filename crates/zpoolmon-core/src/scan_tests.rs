use serde_json::json;

use crate::scan::{ScanKind, ScanPhase, ScanResult};

const NOW: i64 = 1_700_000_000;

fn scanning(to_examine: u64, skipped: u64, examined: u64, issued: u64, pass_start: i64) -> ScanResult {
    ScanResult::parse(&json!({
        "function": "SCRUB",
        "state": "SCANNING",
        "start_time": pass_start,
        "end_time": 0,
        "pass_start": pass_start,
        "to_examine": to_examine,
        "examined": examined,
        "skipped": skipped,
        "issued": issued,
        "processed": 0,
        "errors": 0,
    }))
}

#[test]
fn running_scan_metrics() {
    // Arrange
    let scan = scanning(100, 0, 50, 60, NOW - 60);

    // Act
    let progress = scan.progress(NOW).expect("scanning phase has progress");

    // Assert
    assert_eq!(progress.remaining_to_scan, 100);
    assert_eq!(progress.scan_pct, 50.0);
    assert_eq!(progress.issue_pct, 60.0);
    assert_eq!(progress.elapsed_secs, 60);
    assert_eq!(progress.issue_rate, 1.0);
    assert_eq!(progress.eta_secs, 40);
}

#[test]
fn skipped_bytes_shrink_the_denominator() {
    let scan = scanning(200, 100, 50, 25, NOW - 10);

    let progress = scan.progress(NOW).expect("progress");

    assert_eq!(progress.remaining_to_scan, 100);
    assert_eq!(progress.scan_pct, 50.0);
    assert_eq!(progress.issue_pct, 25.0);
}

#[test]
fn overshooting_counters_are_clamped_and_eta_never_negative() {
    // Arrange
    let scan = scanning(100, 0, 150, 130, NOW - 10);

    // Act
    let progress = scan.progress(NOW).expect("progress");

    // Assert
    assert_eq!(progress.scan_pct, 100.0);
    assert_eq!(progress.issue_pct, 100.0);
    assert_eq!(progress.eta_secs, 0);
}

#[test]
fn elapsed_is_floored_at_one_second() {
    // Same second as the pass started, and a clock that went backwards.
    for pass_start in [NOW, NOW + 30] {
        let progress = scanning(1_000, 0, 10, 10, pass_start).progress(NOW).expect("progress");

        assert_eq!(progress.elapsed_secs, 1);
        assert_eq!(progress.issue_rate, 10.0);
    }
}

#[test]
fn idle_issue_rate_is_floored_at_one_byte_per_second() {
    let progress = scanning(100, 0, 0, 0, NOW - 500).progress(NOW).expect("progress");

    assert_eq!(progress.issue_rate, 1.0);
    assert_eq!(progress.eta_secs, 100);
}

#[test]
fn nothing_left_to_scan_reports_zero() {
    let progress = scanning(100, 100, 0, 0, NOW - 5).progress(NOW).expect("progress");

    assert_eq!(progress.remaining_to_scan, 0);
    assert_eq!(progress.scan_pct, 0.0);
    assert_eq!(progress.issue_pct, 0.0);
    assert_eq!(progress.eta_secs, 0);
}

#[test]
fn finished_scrub_reports_examined_and_duration() {
    // Arrange
    let payload = json!({
        "function": "SCRUB",
        "state": "FINISHED",
        "start_time": NOW - 3_600,
        "end_time": NOW,
        "examined": 4096,
        "processed": 0,
        "errors": 0,
    });

    // Act
    let scan = ScanResult::parse(&payload);

    // Assert
    assert_eq!(scan.kind, ScanKind::Scrub);
    assert_eq!(scan.duration(), Some(3_600));
    assert!(matches!(scan.phase, ScanPhase::Finished { examined: Some(4096), .. }));
    assert!(scan.progress(NOW).is_none());
}

#[test]
fn finished_resilver_does_not_report_examined() {
    let scan = ScanResult::parse(&json!({
        "function": "RESILVER",
        "state": "FINISHED",
        "start_time": NOW - 10,
        "end_time": NOW,
        "examined": 4096,
        "processed": 2048,
        "errors": 1,
    }));

    assert_eq!(scan.kind, ScanKind::Resilver);
    assert!(matches!(
        scan.phase,
        ScanPhase::Finished {
            examined: None,
            processed: 2048,
            errors: 1,
            ..
        }
    ));
}

#[test]
fn string_counters_from_plain_json_mode_are_accepted() {
    let scan = ScanResult::parse(&json!({
        "function": "SCRUB",
        "state": "FINISHED",
        "start_time": "1699996400",
        "end_time": "1700000000",
        "examined": "1.50G",
        "processed": "0B",
        "errors": "0",
    }));

    assert!(matches!(
        scan.phase,
        ScanPhase::Finished {
            examined: Some(1_610_612_736),
            processed: 0,
            ..
        }
    ));
}

#[test]
fn unrecognised_state_keeps_the_payload() {
    // Arrange
    let payload = json!({ "function": "SCRUB", "state": "CANCELED", "start_time": NOW });

    // Act
    let scan = ScanResult::parse(&payload);

    // Assert
    assert_eq!(scan.kind, ScanKind::Scrub);
    match scan.phase {
        ScanPhase::Unknown { raw_state, raw_payload } => {
            assert_eq!(raw_state, "CANCELED");
            assert_eq!(raw_payload, payload);
        }
        other => panic!("expected unknown phase, got {other:?}"),
    }
}

#[test]
fn missing_counters_fall_back_to_unknown() {
    let scan = ScanResult::parse(&json!({ "function": "SCRUB", "state": "SCANNING" }));

    assert!(matches!(scan.phase, ScanPhase::Unknown { .. }));
    assert!(scan.progress(NOW).is_none());
}

#[test]
fn other_functions_carry_their_name_through() {
    let scan = ScanResult::parse(&json!({ "function": "ERRORSCRUB", "state": "FINISHED" }));

    assert_eq!(scan.kind, ScanKind::Other("ERRORSCRUB".to_string()));
    assert!(matches!(scan.phase, ScanPhase::Unknown { ref raw_state, .. } if raw_state == "FINISHED"));
}
