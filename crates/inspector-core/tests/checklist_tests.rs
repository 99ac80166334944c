//! End-to-end checklist runs over an on-disk repository and server snapshot

use std::sync::Arc;

use inspector_core::{
    CategoryContext, CategoryRegistry, Checklist, ConfigResolver, Error, OutputMode, OutputStyle,
    ResolvedConfig, Runner, SnapshotStore,
};
use inspector_fs::{NormalizedPath, checksum::content_checksum};
use inspector_test_utils::repo::ChefRepo;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

fn resolve(repo: &ChefRepo) -> (TempDir, ResolvedConfig) {
    let global = TempDir::new().unwrap();
    let resolver = ConfigResolver::with_global_config_dir(
        NormalizedPath::new(repo.root()),
        global.path().to_path_buf(),
    );
    let config = resolver.resolve().unwrap();
    (global, config)
}

fn registry(config: &ResolvedConfig) -> CategoryRegistry {
    let remote = Arc::new(SnapshotStore::new(config.snapshot.clone()));
    let context = CategoryContext::new(remote, config.paths.clone());
    CategoryRegistry::with_builtins(&context)
}

async fn run_json(repo: &ChefRepo, category: &str) -> (bool, Value) {
    let (_global, config) = resolve(repo);
    let validator = registry(&config).get(category).unwrap();
    let checklist = Checklist::new(validator, Runner::new(config.workers), OutputMode::Json);

    let mut out = Vec::new();
    let passed = checklist.run(&mut out).await.unwrap();
    (passed, serde_json::from_slice(&out).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn matching_roles_pass() {
    let repo = ChefRepo::new();
    repo.server_role("web", json!({"name": "web", "run_list": ["recipe[nginx]"]}));
    repo.local_json("roles/web.json", &json!({"name": "web", "run_list": ["recipe[nginx]"]}));

    let (passed, document) = run_json(&repo, "roles").await;
    assert!(passed);
    assert_eq!(document.as_array().unwrap().len(), 1);
    assert_eq!(document[0]["errors"], json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn role_drift_is_reported_in_name_order() {
    let repo = ChefRepo::new();
    repo.server_role("db", json!({"name": "db"}));
    repo.server_role(
        "web",
        json!({"name": "web", "override_attributes": {"nginx": {"workers": 4}}}),
    );
    repo.local_json(
        "roles/web.json",
        &json!({"name": "web", "override_attributes": {"nginx": {"workers": 8}}}),
    );
    repo.local_file("roles/cache.yaml", "name: cache\n");

    let (passed, document) = run_json(&repo, "roles").await;
    assert!(!passed);

    let records = document.as_array().unwrap();
    let names: Vec<&str> = records.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["cache", "db", "web"]);
    assert_eq!(records[0]["errors"], json!(["exists locally but not on server"]));
    assert_eq!(records[1]["errors"], json!(["exists on server but not locally"]));
    assert_eq!(
        records[2]["errors"],
        json!([{"override_attributes": {"nginx": {"workers": {"server": 4, "local": 8}}}}])
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn environments_ignore_server_default() {
    let repo = ChefRepo::new();
    repo.server_environment("_default", json!({"name": "_default"}));
    repo.server_environment(
        "production",
        json!({"name": "production", "cookbook_versions": {"nginx": "= 2.1.0"}}),
    );
    repo.local_json(
        "environments/production.json",
        &json!({"name": "production", "cookbook_versions": {"nginx": "= 2.1.0"}}),
    );

    let (passed, document) = run_json(&repo, "environments").await;
    assert!(passed, "unexpected drift: {document:#}");
    assert_eq!(document.as_array().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn data_bags_and_items() {
    let repo = ChefRepo::new();
    repo.server_data_bag("users");
    repo.server_data_bag_item("users", "alice", json!({"id": "alice", "uid": 1001}));
    repo.local_data_bag("users");
    repo.local_json("data_bags/users/alice.json", &json!({"id": "alice", "uid": 1001}));
    repo.local_data_bag("apps");

    let (passed, bags) = run_json(&repo, "data-bags").await;
    assert!(!passed);
    assert_eq!(bags[0]["name"], "apps");
    assert_eq!(bags[0]["errors"], json!(["exists locally but not on server"]));
    assert_eq!(bags[1]["errors"], json!([]));

    let (passed, items) = run_json(&repo, "data-bag-items").await;
    assert!(passed);
    assert_eq!(items[0]["name"], "users/alice");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cookbook_checksums_are_verified() {
    let repo = ChefRepo::new();
    let recipe = content_checksum(b"package 'nginx'\n");
    repo.server_cookbook("nginx", "2.1.0", &[("recipes/default.rb", recipe.as_str())]);
    repo.local_cookbook("nginx", "2.1.0");
    repo.local_file("cookbooks/nginx/recipes/default.rb", "package 'nginx'\n");

    let (passed, document) = run_json(&repo, "cookbooks").await;
    assert!(passed, "unexpected drift: {document:#}");
    assert_eq!(document[0]["server"], json!({"version": "2.1.0"}));

    repo.local_file("cookbooks/nginx/recipes/default.rb", "package 'apache2'\n");
    let (passed, document) = run_json(&repo, "cookbooks").await;
    assert!(!passed);
    assert_eq!(
        document[0]["errors"],
        json!(["recipes/default.rb does not match the server"])
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn configured_paths_are_honoured() {
    let repo = ChefRepo::new();
    repo.config("[paths]\nroles = \"chef/roles\"\n\n[run]\nworkers = 2\n");
    repo.server_role("web", json!({"name": "web"}));
    repo.local_json("chef/roles/web.json", &json!({"name": "web"}));

    let (_global, config) = resolve(&repo);
    assert_eq!(config.workers, 2);

    let (passed, _) = run_json(&repo, "roles").await;
    assert!(passed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_snapshot_is_fatal() {
    let repo = ChefRepo::new();
    std::fs::remove_dir_all(repo.snapshot()).unwrap();
    repo.local_json("roles/web.json", &json!({"name": "web"}));

    let (_global, config) = resolve(&repo);
    let validator = registry(&config).get("roles").unwrap();
    let checklist = Checklist::new(
        validator,
        Runner::new(2),
        OutputMode::Human(OutputStyle::plain()),
    );

    let mut out = Vec::new();
    let err = checklist.run(&mut out).await.unwrap_err();
    assert!(matches!(err, Error::RemoteUnavailable { .. }), "got {err}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn corrupt_server_document_is_fatal() {
    let repo = ChefRepo::new();
    repo.local_file(".inspector/server/roles/web.json", "{ not json");
    repo.local_json("roles/web.json", &json!({"name": "web"}));

    let (_global, config) = resolve(&repo);
    let validator = registry(&config).get("roles").unwrap();
    let checklist = Checklist::new(validator, Runner::new(2), OutputMode::Json);

    let mut out = Vec::new();
    let err = checklist.run(&mut out).await.unwrap_err();
    assert!(matches!(err, Error::RemoteDocument { .. }), "got {err}");
    assert!(out.is_empty());
}
