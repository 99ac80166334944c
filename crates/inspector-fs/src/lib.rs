//! Filesystem layer for Inspector
//!
//! Discovers and loads the local definitions that checklists compare
//! against the server, and computes file checksums for cookbook checks.

pub mod checksum;
pub mod definition;
pub mod error;
pub mod path;

pub use definition::{
    DEFAULT_EXTENSIONS, DefinitionFormat, DefinitionLoader, RUBY_EXTENSION, subdirectories,
};
pub use error::{Error, Result};
pub use path::NormalizedPath;
