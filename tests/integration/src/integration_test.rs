//! End-to-end integration test over the bundled chef repository fixture
//!
//! This test exercises the complete flow: config resolution -> snapshot
//! store -> category registry -> concurrent checklist -> JSON report.

use std::path::PathBuf;
use std::sync::Arc;

use inspector_core::{
    BUILTIN_CATEGORIES, CategoryContext, CategoryRegistry, Checklist, ConfigResolver,
    OutputMode, OutputStyle, ResolvedConfig, Runner, SnapshotStore,
};
use inspector_fs::NormalizedPath;
use inspector_test_utils::repo::ChefRepo;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

fn fixture_root() -> PathBuf {
    // tests/integration -> ../../test-fixtures/chef-repo
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures/chef-repo")
}

fn resolve(root: &std::path::Path) -> ResolvedConfig {
    let global = TempDir::new().unwrap();
    let root = NormalizedPath::canonicalize(root).unwrap();
    ConfigResolver::with_global_config_dir(root, global.path().to_path_buf())
        .resolve()
        .unwrap()
}

fn registry(config: &ResolvedConfig) -> CategoryRegistry {
    let remote = Arc::new(SnapshotStore::new(config.snapshot.clone()));
    CategoryRegistry::with_builtins(&CategoryContext::new(remote, config.paths.clone()))
}

/// Run one category in JSON mode; returns (passed, records).
async fn run_category(config: &ResolvedConfig, category: &str, workers: usize) -> (bool, Value) {
    let validator = registry(config).get(category).unwrap();
    let checklist = Checklist::new(validator, Runner::new(workers), OutputMode::Json);
    let mut out = Vec::new();
    let passed = checklist.run(&mut out).await.unwrap();
    (passed, serde_json::from_slice(&out).unwrap())
}

/// Names of failing records mapped to their errors.
fn failures(records: &Value) -> Vec<(String, Value)> {
    records
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| !r["errors"].as_array().unwrap().is_empty())
        .map(|r| (r["name"].as_str().unwrap().to_string(), r["errors"].clone()))
        .collect()
}

#[test]
fn fixture_config_is_resolved() {
    let config = resolve(&fixture_root());
    assert_eq!(config.workers, 4);
    assert_eq!(config.timeout, Some(std::time::Duration::from_secs(30)));
    assert!(config.snapshot.as_str().ends_with(".inspector/server"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn roles_drift() {
    let config = resolve(&fixture_root());
    let (passed, records) = run_category(&config, "roles", config.workers).await;
    assert!(!passed);

    assert_eq!(
        failures(&records),
        vec![
            (
                "db".to_string(),
                json!([{"default_attributes": {"postgres": {"max_connections": {"server": 100, "local": 200}}}}])
            ),
            ("legacy".to_string(), json!(["exists on server but not locally"])),
            ("monitoring".to_string(), json!(["exists locally but not on server"])),
        ]
    );
    assert_eq!(records.as_array().unwrap().len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn environments_drift() {
    let config = resolve(&fixture_root());
    let (passed, records) = run_category(&config, "environments", config.workers).await;
    assert!(!passed);
    assert_eq!(
        failures(&records),
        vec![(
            "staging".to_string(),
            json!([{"cookbook_versions": {"nginx": {"server": "= 2.1.0", "local": "= 2.2.0"}}}])
        )]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn data_bags_drift() {
    let config = resolve(&fixture_root());

    let (_, bags) = run_category(&config, "data-bags", config.workers).await;
    assert_eq!(
        failures(&bags),
        vec![("secrets".to_string(), json!(["exists on server but not locally"]))]
    );

    let (_, items) = run_category(&config, "data-bag-items", config.workers).await;
    assert_eq!(
        failures(&items),
        vec![
            ("secrets/token".to_string(), json!(["exists on server but not locally"])),
            (
                "users/bob".to_string(),
                json!([{"shell": {"server": "/bin/bash", "local": "/bin/zsh"}}])
            ),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cookbooks_drift() {
    let config = resolve(&fixture_root());
    let (_, records) = run_category(&config, "cookbooks", config.workers).await;
    assert_eq!(
        failures(&records),
        vec![(
            "postgres".to_string(),
            json!(["server has 1.4.0 but local version is 1.3.0"])
        )]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_count_does_not_change_results() {
    let config = resolve(&fixture_root());
    for category in BUILTIN_CATEGORIES {
        let (serial_passed, serial) = run_category(&config, category, 1).await;
        let (parallel_passed, parallel) = run_category(&config, category, 8).await;
        assert_eq!(serial_passed, parallel_passed, "{category}");
        assert_eq!(serial, parallel, "{category}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn human_report_streams_every_item() {
    let config = resolve(&fixture_root());
    let validator = registry(&config).get("roles").unwrap();
    let checklist = Checklist::new(
        validator,
        Runner::new(4),
        OutputMode::Human(OutputStyle::plain()),
    );

    let mut out = Vec::new();
    let passed = checklist.run(&mut out).await.unwrap();
    assert!(!passed);

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Roles\n-----\n"));
    for line in [
        "[PASS] web\n",
        "[FAIL] legacy\n    exists on server but not locally\n",
        "[FAIL] monitoring\n    exists locally but not on server\n",
        "[FAIL] db\n    - default_attributes\n      - postgres\n        - max_connections\n          server value = 100\n          local value  = 200\n",
    ] {
        assert!(text.contains(line), "missing {line:?} in:\n{text}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn empty_repository_passes_every_category() {
    let repo = ChefRepo::new();
    let config = resolve(repo.root());
    for category in BUILTIN_CATEGORIES {
        let (passed, records) = run_category(&config, category, 2).await;
        assert!(passed, "{category}");
        assert_eq!(records, json!([]));
    }
}
