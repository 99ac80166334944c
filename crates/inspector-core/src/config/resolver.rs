//! Configuration resolution with hierarchical merge

use std::path::PathBuf;
use std::time::Duration;

use inspector_fs::NormalizedPath;

use super::manifest::{Manifest, OutputFormat};
use crate::Result;
use crate::runner::default_workers;

const CONFIG_DIR: &str = ".inspector";
const DEFAULT_SNAPSHOT: &str = ".inspector/server";

/// Resolved local folder of every category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPaths {
    pub roles: NormalizedPath,
    pub environments: NormalizedPath,
    pub data_bags: NormalizedPath,
    pub cookbooks: NormalizedPath,
}

impl CategoryPaths {
    /// Conventional layout: one folder per category at the repo root.
    pub fn conventional(root: &NormalizedPath) -> Self {
        Self {
            roles: root.join("roles"),
            environments: root.join("environments"),
            data_bags: root.join("data_bags"),
            cookbooks: root.join("cookbooks"),
        }
    }
}

/// The effective configuration after merging all layers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub root: NormalizedPath,
    pub snapshot: NormalizedPath,
    pub workers: usize,
    pub timeout: Option<Duration>,
    pub format: OutputFormat,
    pub paths: CategoryPaths,
}

impl ResolvedConfig {
    fn from_manifest(root: &NormalizedPath, manifest: Manifest) -> Self {
        let folder = |configured: Option<String>, default: &str| {
            root.join(configured.as_deref().unwrap_or(default))
        };

        Self {
            root: root.clone(),
            snapshot: folder(manifest.server.snapshot, DEFAULT_SNAPSHOT),
            workers: manifest.run.workers.unwrap_or_else(default_workers).max(1),
            timeout: manifest
                .run
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            format: manifest.run.format.unwrap_or_default(),
            paths: CategoryPaths {
                roles: folder(manifest.paths.roles, "roles"),
                environments: folder(manifest.paths.environments, "environments"),
                data_bags: folder(manifest.paths.data_bags, "data_bags"),
                cookbooks: folder(manifest.paths.cookbooks, "cookbooks"),
            },
        }
    }
}

/// Resolves configuration by merging global, repository, local and
/// command-line layers.
pub struct ConfigResolver {
    root: NormalizedPath,

    /// Override for the global config directory (used for testing).
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(root: NormalizedPath) -> Self {
        Self {
            root,
            global_config_dir_override: None,
        }
    }

    /// Create a resolver with a custom global config directory.
    pub fn with_global_config_dir(root: NormalizedPath, global_config_dir: PathBuf) -> Self {
        Self {
            root,
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("inspector"))
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn has_config(&self) -> bool {
        self.root.join(CONFIG_DIR).join("config.toml").is_file()
    }

    /// Resolve the file layers only.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.resolve_with(&Manifest::default())
    }

    /// Resolve all file layers, then apply `overrides` on top.
    ///
    /// Missing layers are skipped. Invalid TOML in any layer is an error.
    pub fn resolve_with(&self, overrides: &Manifest) -> Result<ResolvedConfig> {
        let mut manifest = Manifest::default();

        let mut layers = Vec::new();
        if let Some(global_dir) = self.global_config_dir() {
            layers.push(("global", global_dir.join("config.toml")));
        }
        let config_dir = self.root.join(CONFIG_DIR);
        layers.push(("repository", config_dir.join("config.toml").to_native()));
        layers.push(("local", config_dir.join("config.local.toml").to_native()));

        for (layer, path) in layers {
            if path.is_file() {
                tracing::debug!(layer, ?path, "Loading config layer");
                manifest.merge(&Manifest::load(&path)?);
            } else {
                tracing::debug!(layer, ?path, "No config found - skipping");
            }
        }

        manifest.merge(overrides);
        Ok(ResolvedConfig::from_manifest(&self.root, manifest))
    }
}
