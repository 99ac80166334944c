//! Layered configuration
//!
//! Configuration is merged from these sources (later sources override earlier):
//!
//! 1. **Global defaults** - `<config_dir>/inspector/config.toml`
//! 2. **Repository config** - `.inspector/config.toml`
//! 3. **Local overrides** - `.inspector/config.local.toml` (git-ignored)
//! 4. **Command-line overrides** - passed to [`ConfigResolver::resolve_with`]

mod manifest;
mod resolver;

pub use manifest::{Manifest, OutputFormat, PathsSection, RunSection, ServerSection};
pub use resolver::{CategoryPaths, ConfigResolver, ResolvedConfig};
