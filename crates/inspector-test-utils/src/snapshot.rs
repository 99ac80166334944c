//! Server snapshot writers.
//!
//! A snapshot is a directory laid out like a server export:
//! `<collection>/<name>.json`, with data bag items nested one level
//! deeper under `data_bags/<bag>/`.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value, json};

/// Write `document` as `<root>/<collection>/<name>.json`.
///
/// Realism level: **REAL**, the same layout `SnapshotStore` reads.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn write_document(root: &Path, collection: &str, name: &str, document: &Value) {
    let dir = root.join(collection);
    fs::create_dir_all(&dir)
        .unwrap_or_else(|e| panic!("write_document: failed to create {}: {e}", dir.display()));
    let path = dir.join(format!("{name}.json"));
    let content = serde_json::to_string_pretty(document)
        .unwrap_or_else(|e| panic!("write_document: failed to encode {name}: {e}"));
    fs::write(&path, content)
        .unwrap_or_else(|e| panic!("write_document: failed to write {}: {e}", path.display()));
}

/// Write a cookbook record with a version and optional file checksums.
///
/// `checksums` pairs a cookbook-relative path with a `sha256:<hex>` digest.
pub fn write_cookbook(root: &Path, name: &str, version: &str, checksums: &[(&str, &str)]) {
    let mut document = json!({ "version": version });
    if !checksums.is_empty() {
        let files: Map<String, Value> = checksums
            .iter()
            .map(|(file, digest)| (file.to_string(), Value::from(*digest)))
            .collect();
        document["checksums"] = Value::Object(files);
    }
    write_document(root, "cookbooks", name, &document);
}

/// Create an empty data bag so it exists even without items.
///
/// # Panics
/// Panics if the directory cannot be created.
pub fn create_data_bag(root: &Path, bag: &str) {
    let dir = root.join("data_bags").join(bag);
    fs::create_dir_all(&dir)
        .unwrap_or_else(|e| panic!("create_data_bag: failed to create {}: {e}", dir.display()));
}

/// Write a data bag item as `<root>/data_bags/<bag>/<item>.json`.
pub fn write_data_bag_item(root: &Path, bag: &str, item: &str, document: &Value) {
    write_document(root, &format!("data_bags/{bag}"), item, document);
}
