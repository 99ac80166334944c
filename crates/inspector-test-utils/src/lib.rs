//! Shared test utilities for the inspector workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not
//! each hand-roll chef repositories and server snapshots. It is a
//! dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`repo`]: [`ChefRepo`](repo::ChefRepo) builder for a local repository plus server snapshot
//! - [`snapshot`]: writers for server snapshot documents

pub mod repo;
pub mod snapshot;
