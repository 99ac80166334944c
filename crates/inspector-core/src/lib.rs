//! Reconciliation engine for Inspector
//!
//! This crate compares the objects recorded on a configuration server with
//! their definitions in a local repository, implementing:
//!
//! - **Reconciliation**: the sorted union of names known to either side
//! - **Validators**: one per item category, producing an [`Item`] per name
//! - **Runner**: bounded parallel validation with completion callbacks
//! - **Reporting**: streamed human output or a single JSON document
//! - **Configuration resolution**: hierarchical merge of global, repository and local configs
//!
//! # Architecture
//!
//! `inspector-core` sits between the filesystem layer and the CLI:
//!
//! ```text
//!                 inspector-cli
//!                       |
//!                 inspector-core
//!                       |
//!      +-----------+----+------+------------+
//!      |           |           |            |
//!  Checklist    Runner     Reporter    CategoryRegistry
//!                                           |
//!                              RemoteStore + inspector-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use inspector_core::{CategoryContext, CategoryRegistry, Checklist, OutputMode, Runner};
//!
//! async fn roles(context: CategoryContext) -> inspector_core::Result<bool> {
//!     let registry = CategoryRegistry::with_builtins(&context);
//!     let checklist = Checklist::new(registry.get("roles")?, Runner::default(), OutputMode::Json);
//!     checklist.run(&mut std::io::stdout()).await
//! }
//! ```

pub mod categories;
pub mod checklist;
pub mod config;
pub mod diff;
pub mod error;
pub mod item;
pub mod reconcile;
pub mod remote;
pub mod report;
pub mod runner;
pub mod validator;

pub use categories::{BUILTIN_CATEGORIES, CategoryContext, CategoryRegistry};
pub use checklist::{Checklist, Phase, RunResult};
pub use config::{CategoryPaths, ConfigResolver, Manifest, OutputFormat, ResolvedConfig};
pub use diff::{DiffMap, DiffTree, diff_values};
pub use error::{Error, Result};
pub use item::{DEFINED_IN_RUBY, Discrepancy, Item, MISSING_LOCALLY, MISSING_ON_SERVER};
pub use reconcile::reconcile;
pub use remote::{MemoryStore, RemoteStore, SnapshotStore};
pub use report::{HumanReporter, OutputMode, OutputStyle, write_json};
pub use runner::{Runner, default_workers};
pub use validator::{Cancellation, Validator};
