//! SHA-256 checksum utilities
//!
//! Checksums use the canonical format `sha256:<hex>`, which is also the
//! format recorded for cookbook files in server snapshots.

use sha2::{Digest, Sha256};

use crate::{Error, NormalizedPath, Result};

const PREFIX: &str = "sha256:";

/// Compute the checksum of in-memory content.
pub fn content_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the checksum of a file's contents.
pub fn file_checksum(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    let content = std::fs::read(&native).map_err(|e| Error::io(&native, e))?;
    Ok(content_checksum(&content))
}

/// Compare a recorded checksum with a computed one.
///
/// Recorded values may omit the `sha256:` prefix and use upper-case hex.
pub fn checksums_match(recorded: &str, computed: &str) -> bool {
    let strip = |s: &str| s.strip_prefix(PREFIX).unwrap_or(s).to_ascii_lowercase();
    strip(recorded) == strip(computed)
}
