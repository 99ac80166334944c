//! List the registered checklist categories

use std::io::Write;
use std::path::Path;

use colored::Colorize;

use super::check::{CheckOptions, build_registry, resolve_config};
use crate::error::Result;

/// Print every category name with its checklist title, in run order.
pub fn run_list<W: Write>(root: &Path, options: &CheckOptions, out: &mut W) -> Result<()> {
    let config = resolve_config(root, options)?;
    let registry = build_registry(&config);

    writeln!(out, "{}", "Available categories".bold())?;
    writeln!(out)?;
    for name in registry.names() {
        let validator = registry.get(name)?;
        writeln!(out, "  {:<16} {}", name.green(), validator.title())?;
    }
    Ok(())
}
