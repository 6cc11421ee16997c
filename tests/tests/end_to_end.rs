mod utils;
use utils::*;

use mock_store::{MockConfig, MockStore};
use readload::{ConfigError, LatencyPolicy, LoadError, ReadOperation, SetupError};
use clap::Parser;
use readload_runtime::{Cli, HttpStore, ReadloadRuntime, RuntimeError};
use std::collections::HashSet;
use std::future::pending;
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

fn cli(endpoint: &str, key_list: &Path, extra: &[&str]) -> Cli {
    let key_list = key_list.to_str().unwrap();
    let mut args = vec![
        "readload",
        "--endpoint",
        endpoint,
        "--key-list",
        key_list,
        "--scratch-table",
        "scratch",
    ];
    args.extend_from_slice(extra);
    Cli::try_parse_from(args).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(10000)]
async fn reads_for_duration_within_concurrency() {
    init();
    let store = MockStore::spawn(MockConfig {
        delay: Duration::from_millis(5),
        jitter: Some(Duration::from_millis(1)),
        keys: Some(HashSet::from(["a".to_string(), "b".to_string()])),
        ..Default::default()
    })
    .await
    .unwrap();
    let keys = key_file(&["a", "b", "missing"]);

    let report = ReadloadRuntime::new()
        .args(cli(
            &store.endpoint(),
            keys.path(),
            &["--run-for", "300ms", "--req-count", "4"],
        ))
        .run_until(pending())
        .await
        .unwrap();

    assert!(report.attempted > 0);
    // Missing rows are still successful reads.
    assert_eq!(report.succeeded, report.attempted);
    assert_eq!(report.attempted, store.counters().requests());
    assert!(store.counters().max_in_flight() <= 4);
    assert_eq!(
        report.latency.as_ref().map(|l| l.count as u64),
        Some(report.attempted)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(10000)]
async fn budget_caps_the_number_of_reads() {
    init();
    let store = MockStore::spawn(MockConfig::default()).await.unwrap();
    let keys = key_file(&["only"]);

    let report = ReadloadRuntime::new()
        .args(cli(
            &store.endpoint(),
            keys.path(),
            &["--run-for", "0", "--req-count", "3", "--max-ops", "50"],
        ))
        .run_until(pending())
        .await
        .unwrap();

    assert_eq!(report.attempted, 50);
    assert_eq!(store.counters().served(), 50);
    assert!(store.counters().max_in_flight() <= 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(10000)]
async fn throttled_reads_are_failures_not_errors() {
    init();
    let store = MockStore::spawn(MockConfig {
        max_tps: NonZeroU32::new(5),
        ..Default::default()
    })
    .await
    .unwrap();
    let keys = key_file(&["a", "b"]);

    let report = ReadloadRuntime::new()
        .args(cli(
            &store.endpoint(),
            keys.path(),
            &[
                "--run-for",
                "0",
                "--max-ops",
                "40",
                "--req-count",
                "8",
                "--latency-policy",
                "failures",
            ],
        ))
        .run_until(pending())
        .await
        .unwrap();

    assert_eq!(report.attempted, 40);
    assert!(report.failed > 0);
    assert_eq!(report.failed, store.counters().throttled());
    assert_eq!(report.policy, LatencyPolicy::FailuresOnly);
    assert_eq!(
        report.latency.map(|l| l.count as u64),
        Some(report.failed)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(10000)]
async fn stop_signal_ends_an_unbounded_run() {
    init();
    let store = MockStore::spawn(MockConfig {
        delay: Duration::from_millis(2),
        ..Default::default()
    })
    .await
    .unwrap();
    let keys = key_file(&["a"]);

    let report = ReadloadRuntime::new()
        .args(cli(
            &store.endpoint(),
            keys.path(),
            &["--run-for", "0", "--req-count", "2"],
        ))
        .run_until(tokio::time::sleep(Duration::from_millis(200)))
        .await
        .unwrap();

    assert!(report.attempted > 0);
    assert_eq!(report.attempted, store.counters().requests());
}

#[tokio::test]
#[ntest::timeout(10000)]
async fn missing_key_list_is_fatal() {
    init();
    let dir = tempfile::tempdir().unwrap();

    let err = ReadloadRuntime::new()
        .args(cli(
            "http://127.0.0.1:1",
            &dir.path().join("absent.txt"),
            &[],
        ))
        .run_until(pending())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::Load(LoadError::Setup(SetupError::KeyList { .. }))
    ));
}

#[tokio::test]
#[ntest::timeout(10000)]
async fn empty_key_list_is_a_config_error() {
    init();
    let keys = key_file(&[]);

    let err = ReadloadRuntime::new()
        .args(cli("http://127.0.0.1:1", keys.path(), &[]))
        .run_until(pending())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::Load(LoadError::Config(ConfigError::EmptyKeySet))
    ));
}

#[tokio::test]
#[ntest::timeout(10000)]
async fn zero_concurrency_is_rejected_before_dialing() {
    init();
    let keys = key_file(&["a"]);

    let err = ReadloadRuntime::new()
        .args(cli("http://127.0.0.1:1", keys.path(), &["--req-count", "0"]))
        .run_until(pending())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::Load(LoadError::Config(ConfigError::ZeroConcurrency))
    ));
}

#[tokio::test]
#[ntest::timeout(10000)]
async fn unreachable_store_is_fatal() {
    init();
    let keys = key_file(&["a"]);

    let err = ReadloadRuntime::new()
        .args(cli("http://127.0.0.1:1", keys.path(), &[]))
        .run_until(pending())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::Load(LoadError::Setup(SetupError::Connect(_)))
    ));
}

#[tokio::test]
#[ntest::timeout(10000)]
async fn report_serializes_to_json() {
    init();
    let store = MockStore::spawn(MockConfig::default()).await.unwrap();
    let keys = key_file(&["a"]);

    let report = ReadloadRuntime::new()
        .args(cli(
            &store.endpoint(),
            keys.path(),
            &["--run-for", "0", "--max-ops", "5", "--json"],
        ))
        .run_until(pending())
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["attempted"], 5);
    assert_eq!(json["policy"], "all");
    assert_eq!(json["latency"]["count"], 5);
}

#[tokio::test]
#[ntest::timeout(10000)]
async fn missing_rows_keep_the_pooled_connection() {
    init();
    let store = MockStore::spawn(MockConfig {
        keys: Some(HashSet::from(["present".to_string()])),
        ..Default::default()
    })
    .await
    .unwrap();
    let client = HttpStore::connect(&store.endpoint(), "scratch", 1)
        .await
        .unwrap();

    for _ in 0..5 {
        assert!(!client.read("absent").await.unwrap());
    }
    assert!(client.read("present").await.unwrap());

    assert_eq!(store.counters().missed(), 5);
    assert_eq!(store.counters().served(), 1);
    assert_eq!(store.counters().connections(), 1);
}
