//! Manifest parsing for `.inspector/config.toml` files
//!
//! Every field is optional so that a layer only overrides what it sets.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How a checklist run reports its results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Streaming pass/fail lines with indented diffs
    #[default]
    Human,
    /// One pretty-printed JSON document at the end of the run
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}' (expected human or json)")),
        }
    }
}

/// Where the server side is read from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSection {
    /// Server snapshot directory, relative to the repository root
    #[serde(default)]
    pub snapshot: Option<String>,
}

/// Checklist execution settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSection {
    /// Worker pool size; defaults to the host's available parallelism
    #[serde(default)]
    pub workers: Option<usize>,

    /// Per-validation timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub format: Option<OutputFormat>,
}

/// Local folders per category, relative to the repository root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsSection {
    #[serde(default)]
    pub roles: Option<String>,
    #[serde(default)]
    pub environments: Option<String>,
    #[serde(default)]
    pub data_bags: Option<String>,
    #[serde(default)]
    pub cookbooks: Option<String>,
}

/// One configuration layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub paths: PathsSection,
}

impl Manifest {
    /// Parse a manifest from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use inspector_core::config::{Manifest, OutputFormat};
    ///
    /// let manifest = Manifest::parse(r#"
    /// [run]
    /// workers = 4
    /// format = "json"
    /// "#).unwrap();
    ///
    /// assert_eq!(manifest.run.workers, Some(4));
    /// assert_eq!(manifest.run.format, Some(OutputFormat::Json));
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Merge another manifest into this one; values set in `other` win.
    pub fn merge(&mut self, other: &Manifest) {
        overlay(&mut self.server.snapshot, &other.server.snapshot);

        overlay(&mut self.run.workers, &other.run.workers);
        overlay(&mut self.run.timeout_secs, &other.run.timeout_secs);
        overlay(&mut self.run.format, &other.run.format);

        overlay(&mut self.paths.roles, &other.paths.roles);
        overlay(&mut self.paths.environments, &other.paths.environments);
        overlay(&mut self.paths.data_bags, &other.paths.data_bags);
        overlay(&mut self.paths.cookbooks, &other.paths.cookbooks);
    }
}

fn overlay<T: Clone>(base: &mut Option<T>, other: &Option<T>) {
    if other.is_some() {
        base.clone_from(other);
    }
}
