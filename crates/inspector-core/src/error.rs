//! Error types for inspector-core
//!
//! Every variant here is fatal to a checklist run. Absence of an item
//! on one side and field mismatches are data carried by
//! [`crate::Item`], never errors.

use std::path::PathBuf;
use std::time::Duration;

/// Result type for inspector-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a checklist run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server snapshot cannot be reached at all
    #[error("Server unavailable at {location}: {reason}")]
    RemoteUnavailable { location: String, reason: String },

    /// A server document exists but cannot be read or decoded
    #[error("Failed to read server document {collection}/{name}: {reason}")]
    RemoteDocument {
        collection: String,
        name: String,
        reason: String,
    },

    /// No checklist is registered under the requested name
    #[error("Unknown category: {name} (available: {available})")]
    UnknownCategory { name: String, available: String },

    /// Configuration file could not be loaded
    #[error("Invalid configuration at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A single validation exceeded its time budget
    #[error("Validation of {name} timed out after {elapsed:?}")]
    ValidationTimeout { name: String, elapsed: Duration },

    /// The run was aborted while this validation was in flight
    #[error("Validation of {name} was cancelled")]
    Cancelled { name: String },

    /// A validation worker panicked or was torn down
    #[error("Validation worker for {name} failed: {reason}")]
    WorkerFailed { name: String, reason: String },

    /// The report sink rejected output
    #[error("Failed to write report: {0}")]
    Output(#[source] std::io::Error),

    /// Filesystem error from inspector-fs
    #[error(transparent)]
    Fs(#[from] inspector_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub fn remote_unavailable(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn remote_document(
        collection: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::RemoteDocument {
            collection: collection.into(),
            name: name.into(),
            reason: reason.into(),
        }
    }
}
