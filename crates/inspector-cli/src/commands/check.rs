//! Checklist command implementation
//!
//! Resolves configuration for the repository, builds the category
//! registry over the server snapshot and runs one or every checklist.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use inspector_core::config::{Manifest, OutputFormat};
use inspector_core::{
    CategoryContext, CategoryRegistry, Checklist, ConfigResolver, OutputMode, ResolvedConfig,
    Runner, SnapshotStore, write_json,
};
use inspector_fs::NormalizedPath;
use serde_json::{Map, Value};

use crate::error::Result;

/// Command-line settings layered over the configuration files
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub json: bool,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub server: Option<PathBuf>,
}

impl CheckOptions {
    fn overrides(&self) -> Result<Manifest> {
        let mut manifest = Manifest::default();
        if self.json {
            manifest.run.format = Some(OutputFormat::Json);
        }
        manifest.run.workers = self.workers;
        manifest.run.timeout_secs = self.timeout_secs;
        if let Some(server) = &self.server {
            let server = if server.is_absolute() {
                server.clone()
            } else {
                std::env::current_dir()?.join(server)
            };
            manifest.server.snapshot = Some(server.to_string_lossy().into_owned());
        }
        Ok(manifest)
    }
}

/// Resolve configuration for `root` with the command-line layer on top.
pub fn resolve_config(root: &Path, options: &CheckOptions) -> Result<ResolvedConfig> {
    let root = NormalizedPath::canonicalize(root)?;
    let resolver = ConfigResolver::new(root);
    Ok(resolver.resolve_with(&options.overrides()?)?)
}

/// Build the registry of built-in checklists for a resolved configuration.
pub fn build_registry(config: &ResolvedConfig) -> CategoryRegistry {
    let remote = Arc::new(SnapshotStore::new(config.snapshot.clone()));
    let context = CategoryContext::new(remote, config.paths.clone());
    CategoryRegistry::with_builtins(&context)
}

fn build_runner(config: &ResolvedConfig) -> Runner {
    let runner = Runner::new(config.workers);
    match config.timeout {
        Some(timeout) => runner.with_timeout(timeout),
        None => runner,
    }
}

/// Run the checklist for `category`, or every checklist when `None`.
///
/// Returns whether every item passed.
pub async fn run_check<W: Write>(
    root: &Path,
    category: Option<&str>,
    options: &CheckOptions,
    out: &mut W,
) -> Result<bool> {
    let config = resolve_config(root, options)?;
    tracing::debug!(
        root = %config.root,
        snapshot = %config.snapshot,
        workers = config.workers,
        "Resolved configuration"
    );

    let registry = build_registry(&config);
    let mode = OutputMode::detect(config.format);

    match category {
        Some(name) => {
            let checklist = Checklist::new(registry.get(name)?, build_runner(&config), mode);
            Ok(checklist.run(out).await?)
        }
        None => run_every(&registry, &config, mode, out).await,
    }
}

async fn run_every<W: Write>(
    registry: &CategoryRegistry,
    config: &ResolvedConfig,
    mode: OutputMode,
    out: &mut W,
) -> Result<bool> {
    let mut all_passed = true;
    let mut documents = Map::new();

    for (index, name) in registry.names().iter().enumerate() {
        if !mode.is_json() && index > 0 {
            writeln!(out)?;
        }
        let checklist = Checklist::new(registry.get(name)?, build_runner(config), mode);
        let result = checklist.execute(out).await?;
        all_passed &= result.all_passed;
        if mode.is_json() {
            let items = serde_json::to_value(&result.items).map_err(inspector_core::Error::from)?;
            documents.insert(name.clone(), items);
        }
    }

    if mode.is_json() {
        write_json(out, &Value::Object(documents))?;
    }
    Ok(all_passed)
}
