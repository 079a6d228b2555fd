use std::time::Duration;

use crate::fetcher::{validate_pools, FetchError, StatusDocument, StatusFetcher, ValidationError, ZpoolCommand};
use crate::fixtures::{document, raidz_pool, FixtureFetcher};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|n| n.to_string()).collect()
}

fn two_pools() -> FixtureFetcher {
    FixtureFetcher::new(document(&[
        ("tank", raidz_pool("tank", &["sda"])),
        ("backup", raidz_pool("backup", &["sdb"])),
    ]))
}

#[tokio::test]
async fn empty_request_means_all_pools() {
    let fetcher = FixtureFetcher::failing(FetchError::CommandNotFound("zpool".to_string()));

    let accepted = validate_pools(&fetcher, &[]).await.expect("no lookup needed");

    assert!(accepted.is_empty());
}

#[tokio::test]
async fn unknown_pool_is_rejected_with_the_known_names() {
    // Act
    let err = validate_pools(&two_pools(), &names(&["tank", "nope"]))
        .await
        .expect_err("nope does not exist");

    // Assert
    match err {
        ValidationError::UnknownPool { name, available } => {
            assert_eq!(name, "nope");
            assert_eq!(available, names(&["tank", "backup"]));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_names_are_collapsed() {
    let accepted = validate_pools(&two_pools(), &names(&["backup", "tank", "backup"]))
        .await
        .expect("all known");

    assert_eq!(accepted, names(&["backup", "tank"]));
}

#[tokio::test]
async fn lookup_failure_is_not_an_empty_pool_list() {
    let fetcher = FixtureFetcher::failing(FetchError::Timeout(Duration::from_secs(1)));

    let err = validate_pools(&fetcher, &names(&["tank"])).await.expect_err("lookup fails");

    assert!(matches!(err, ValidationError::Lookup(FetchError::Timeout(_))));
}

#[test]
fn malformed_document_is_a_fetch_error() {
    let inputs: [&[u8]; 3] = [b"not json", br#"{"output_version": {}}"#, br#"{"pools": []}"#];
    for input in inputs {
        let err = StatusDocument::from_slice(input).expect_err("not a status document");
        assert!(matches!(err, FetchError::Malformed(_)));
    }
}

#[test]
fn document_keeps_command_order() {
    let doc = StatusDocument::from_slice(br#"{"pools": {"zeta": {}, "alpha": {}}}"#).expect("valid");

    assert_eq!(doc.pools.keys().collect::<Vec<_>>(), ["zeta", "alpha"]);
}

#[tokio::test]
async fn missing_binary_is_command_not_found() {
    let command = ZpoolCommand::new("/nonexistent/zpoolmon-test/zpool", Duration::from_secs(5));

    let err = command.fetch_status(&[]).await.expect_err("binary does not exist");

    assert!(matches!(err, FetchError::CommandNotFound(ref bin) if bin.ends_with("zpool")));
}

#[cfg(unix)]
#[tokio::test]
async fn nonzero_exit_is_reported_with_its_code() {
    let command = ZpoolCommand::new("false", Duration::from_secs(5));

    let err = command.list_pools().await.expect_err("false always fails");

    assert!(matches!(err, FetchError::Exit { code: Some(1), .. }));
}
