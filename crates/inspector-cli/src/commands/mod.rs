//! Command implementations for inspector-cli

pub mod check;
pub mod list;

pub use check::{CheckOptions, run_check};
pub use list::run_list;
