//! Cookbook version and file checksum comparison
//!
//! Server snapshots record one document per cookbook:
//!
//! ```json
//! { "version": "1.2.0", "checksums": { "recipes/default.rb": "sha256:..." } }
//! ```
//!
//! A `versions` array may replace `version`; the highest entry is used.

use std::collections::BTreeSet;
use std::path::{Component, Path};
use std::sync::LazyLock;

use inspector_fs::{DefinitionLoader, NormalizedPath, checksum, subdirectories};
use regex::Regex;
use semver::Version;
use serde_json::{Value, json};

use super::CategoryContext;
use crate::validator::{Cancellation, Validator};
use crate::{Item, Result};

const COLLECTION: &str = "cookbooks";

static METADATA_RB_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*version\s+['"]([^'"]+)['"]"#).expect("Invalid metadata version regex")
});

pub struct CookbookValidator {
    context: CategoryContext,
    metadata: DefinitionLoader,
}

impl CookbookValidator {
    pub fn new(context: CategoryContext) -> Self {
        Self {
            context,
            metadata: DefinitionLoader::with_extensions(["json"]),
        }
    }

    fn local_version(&self, dir: &NormalizedPath) -> Option<String> {
        if let Some(version) = self
            .metadata
            .load(dir, "metadata")
            .and_then(|doc| doc.get("version").and_then(Value::as_str).map(str::to_string))
        {
            return Some(version);
        }

        let path = dir.join("metadata.rb");
        let content = std::fs::read_to_string(path.to_native()).ok()?;
        METADATA_RB_VERSION
            .captures(&content)
            .map(|caps| caps[1].to_string())
    }

    fn check_files(
        &self,
        item: &mut Item,
        dir: &NormalizedPath,
        checksums: &serde_json::Map<String, Value>,
        cancel: &Cancellation,
    ) -> Result<()> {
        let mut files: Vec<_> = checksums.iter().collect();
        files.sort_by(|a, b| a.0.cmp(b.0));

        for (file, recorded) in files {
            cancel.check(&item.name)?;
            let Some(recorded) = recorded.as_str() else {
                continue;
            };
            if !is_cookbook_relative(file) {
                item.push_message(format!("{file} is not a cookbook path"));
                continue;
            }
            let path = dir.join(file);
            if !path.is_file() {
                item.push_message(format!("{file} is missing locally"));
                continue;
            }
            match checksum::file_checksum(&path) {
                Ok(computed) if checksum::checksums_match(recorded, &computed) => {}
                Ok(_) => item.push_message(format!("{file} does not match the server")),
                Err(e) => {
                    tracing::warn!(%path, error = %e, "Treating unreadable cookbook file as missing");
                    item.push_message(format!("{file} is missing locally"));
                }
            }
        }
        Ok(())
    }
}

impl Validator for CookbookValidator {
    fn title(&self) -> &str {
        "Cookbooks"
    }

    fn remote_names(&self) -> Result<BTreeSet<String>> {
        self.context.remote.documents(COLLECTION)
    }

    fn local_names(&self) -> Result<BTreeSet<String>> {
        Ok(subdirectories(&self.context.paths.cookbooks)?)
    }

    fn validate_cancellable(&self, name: &str, cancel: &Cancellation) -> Result<Item> {
        let server_doc = self.context.remote.document(COLLECTION, name)?;
        cancel.check(name)?;
        let dir = self.context.paths.cookbooks.join(name);
        let local_present = dir.is_dir();

        let server_version = server_doc.as_ref().and_then(server_version);
        let local_version = local_present.then(|| self.local_version(&dir)).flatten();

        let server = server_doc.as_ref().map(|_| json!({ "version": server_version }));
        let local = local_present.then(|| json!({ "version": local_version }));
        let mut item = Item::new(name, server, local);

        match (&server_doc, local_present) {
            (None, _) => item.push_message(crate::item::MISSING_ON_SERVER),
            (Some(_), false) => item.push_message(crate::item::MISSING_LOCALLY),
            (Some(doc), true) => {
                if !versions_match(server_version.as_deref(), local_version.as_deref()) {
                    item.push_message(format!(
                        "server has {} but local version is {}",
                        server_version.as_deref().unwrap_or("unknown"),
                        local_version.as_deref().unwrap_or("unknown"),
                    ));
                }
                if let Some(checksums) = doc.get("checksums").and_then(Value::as_object) {
                    self.check_files(&mut item, &dir, checksums, cancel)?;
                }
            }
        }

        Ok(item)
    }
}

/// Checksum keys must stay inside the cookbook directory.
fn is_cookbook_relative(file: &str) -> bool {
    let path = Path::new(file);
    !file.starts_with(['/', '\\'])
        && !path.is_absolute()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

fn server_version(doc: &Value) -> Option<String> {
    if let Some(version) = doc.get("version").and_then(Value::as_str) {
        return Some(version.to_string());
    }
    doc.get("versions")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .max_by(|a, b| match (parse_version(a), parse_version(b)) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => a.cmp(b),
        })
        .map(str::to_string)
}

/// Parse a cookbook version, padding short forms like `1.2` to `1.2.0`.
fn parse_version(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    let padded = match raw.split('.').count() {
        1 => format!("{raw}.0.0"),
        2 => format!("{raw}.0"),
        _ => raw.to_string(),
    };
    Version::parse(&padded).ok()
}

fn versions_match(server: Option<&str>, local: Option<&str>) -> bool {
    match (server, local) {
        (Some(server), Some(local)) => match (parse_version(server), parse_version(local)) {
            (Some(server), Some(local)) => server == local,
            _ => server.trim() == local.trim(),
        },
        _ => false,
    }
}
