//! Error types for inspector-fs

use std::path::PathBuf;

/// Result type for inspector-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in inspector-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} definition at {path}: {message}")]
    DefinitionParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported definition format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
