//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

/// Inspector - Compare a configuration server with the local repository
#[derive(Parser, Debug)]
#[command(name = "inspector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output a JSON document instead of the human-readable checklist
    #[arg(long)]
    pub json: bool,

    /// Number of concurrent validations (default: available parallelism)
    #[arg(short, long, env = "INSPECTOR_WORKERS")]
    pub workers: Option<usize>,

    /// Fail when a single validation takes longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Repository root (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Server snapshot directory (default: .inspector/server)
    #[arg(long, value_name = "DIR", env = "INSPECTOR_SERVER")]
    pub server: Option<PathBuf>,

    /// Category to check, `all` for every category, or `list`
    ///
    /// Examples:
    ///   inspector                 # Check every category
    ///   inspector roles           # Check roles only
    ///   inspector --json cookbooks
    ///   inspector list            # Show available categories
    #[arg(value_name = "CATEGORY", default_value = "all")]
    pub target: String,
}

/// What the positional argument selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    List,
    Category(String),
}

impl Cli {
    pub fn target(&self) -> Target {
        match self.target.as_str() {
            "all" => Target::All,
            "list" => Target::List,
            other => Target::Category(other.to_string()),
        }
    }
}
