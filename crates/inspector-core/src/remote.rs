//! Access to the server side of a comparison
//!
//! The server is read through [`RemoteStore`]. [`SnapshotStore`] reads a
//! server export laid out as `<collection>/<name>.json`, with nested
//! collections such as `data_bags/<bag>/<item>.json`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use inspector_fs::{DefinitionLoader, NormalizedPath, subdirectories};
use serde_json::Value;

use crate::{Error, Result};

/// Read-only view of the documents stored on the server.
///
/// Unlike local definitions, failures here are never downgraded: an
/// unreachable server or a corrupt document aborts the run.
pub trait RemoteStore: Send + Sync {
    /// Names of the documents in a collection (empty if it does not exist).
    fn documents(&self, collection: &str) -> Result<BTreeSet<String>>;

    /// Names of the collections nested directly under `parent`.
    fn collections(&self, parent: &str) -> Result<BTreeSet<String>>;

    /// A single document, or `None` when it is not stored on the server.
    fn document(&self, collection: &str, name: &str) -> Result<Option<Value>>;
}

/// A server export on disk.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: NormalizedPath,
    loader: DefinitionLoader,
}

impl SnapshotStore {
    pub fn new(root: NormalizedPath) -> Self {
        Self {
            root,
            loader: DefinitionLoader::with_extensions(["json"]),
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn ensure_available(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(Error::remote_unavailable(
                self.root.as_str(),
                "snapshot directory does not exist",
            ))
        }
    }
}

impl RemoteStore for SnapshotStore {
    fn documents(&self, collection: &str) -> Result<BTreeSet<String>> {
        self.ensure_available()?;
        self.loader
            .names(&self.root.join(collection))
            .map_err(|e| Error::remote_unavailable(self.root.as_str(), e.to_string()))
    }

    fn collections(&self, parent: &str) -> Result<BTreeSet<String>> {
        self.ensure_available()?;
        subdirectories(&self.root.join(parent))
            .map_err(|e| Error::remote_unavailable(self.root.as_str(), e.to_string()))
    }

    fn document(&self, collection: &str, name: &str) -> Result<Option<Value>> {
        self.ensure_available()?;
        let path = self.root.join(collection).join(&format!("{name}.json"));
        if !path.is_file() {
            return Ok(None);
        }
        tracing::debug!(%path, "Reading server document");
        self.loader
            .parse_file(&path)
            .map(Some)
            .map_err(|e| Error::remote_document(collection, name, e.to_string()))
    }
}

/// In-memory server contents, keyed by collection path then name.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document, creating its collection as needed.
    pub fn insert(&self, collection: &str, name: &str, document: Value) {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(name.to_string(), document);
    }

    /// Create an empty collection.
    pub fn insert_collection(&self, collection: &str) {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections.entry(collection.to_string()).or_default();
    }

    pub fn with_document(self, collection: &str, name: &str, document: Value) -> Self {
        self.insert(collection, name, document);
        self
    }
}

impl RemoteStore for MemoryStore {
    fn documents(&self, collection: &str) -> Result<BTreeSet<String>> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(collections
            .get(collection)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn collections(&self, parent: &str) -> Result<BTreeSet<String>> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let prefix = format!("{}/", parent.trim_end_matches('/'));
        Ok(collections
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn document(&self, collection: &str, name: &str) -> Result<Option<Value>> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(name))
            .cloned())
    }
}
