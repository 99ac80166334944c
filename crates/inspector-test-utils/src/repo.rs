//! [`ChefRepo`] builder for checklist test scenarios.
//!
//! Builds a local chef repository and a server snapshot side by side in
//! one temporary directory, so tests can describe both sides of a
//! comparison in a few lines.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use crate::snapshot;

/// Default snapshot location, relative to the repository root.
pub const SNAPSHOT_DIR: &str = ".inspector/server";

/// A temporary chef repository with a server snapshot.
///
/// # Example
///
/// ```rust,no_run
/// use inspector_test_utils::repo::ChefRepo;
/// use serde_json::json;
///
/// let repo = ChefRepo::new();
/// repo.server_role("web", json!({"name": "web", "run_list": ["recipe[nginx]"]}));
/// repo.local_file("roles/web.json", r#"{"name": "web", "run_list": ["recipe[nginx]"]}"#);
/// repo.assert_file_exists("roles/web.json");
/// ```
pub struct ChefRepo {
    temp_dir: TempDir,
}

impl Default for ChefRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl ChefRepo {
    /// Create an empty repository with an empty snapshot directory.
    pub fn new() -> Self {
        let repo = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(repo.snapshot()).unwrap();
        repo
    }

    /// Return the repository root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Return the server snapshot directory.
    pub fn snapshot(&self) -> PathBuf {
        self.root().join(SNAPSHOT_DIR)
    }

    /// Write `content` to `path` (relative to root), creating parents.
    pub fn local_file(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }

    /// Write a JSON document to `path` (relative to root).
    pub fn local_json(&self, path: &str, document: &Value) {
        self.local_file(path, &serde_json::to_string_pretty(document).unwrap());
    }

    /// Create a local cookbook with a `metadata.json` declaring `version`.
    pub fn local_cookbook(&self, name: &str, version: &str) {
        self.local_file(
            &format!("cookbooks/{name}/metadata.json"),
            &format!(r#"{{"name": "{name}", "version": "{version}"}}"#),
        );
    }

    /// Create an empty local data bag.
    pub fn local_data_bag(&self, bag: &str) {
        fs::create_dir_all(self.root().join("data_bags").join(bag)).unwrap();
    }

    pub fn server_role(&self, name: &str, document: Value) {
        snapshot::write_document(&self.snapshot(), "roles", name, &document);
    }

    pub fn server_environment(&self, name: &str, document: Value) {
        snapshot::write_document(&self.snapshot(), "environments", name, &document);
    }

    pub fn server_data_bag_item(&self, bag: &str, item: &str, document: Value) {
        snapshot::write_data_bag_item(&self.snapshot(), bag, item, &document);
    }

    pub fn server_data_bag(&self, bag: &str) {
        snapshot::create_data_bag(&self.snapshot(), bag);
    }

    pub fn server_cookbook(&self, name: &str, version: &str, checksums: &[(&str, &str)]) {
        snapshot::write_cookbook(&self.snapshot(), name, version, checksums);
    }

    /// Write `.inspector/config.toml` with the given TOML content.
    pub fn config(&self, content: &str) {
        self.local_file(".inspector/config.toml", content);
    }

    /// Assert that `path` (relative to the repo root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }
}
