//! Inspector CLI
//!
//! Compares the objects recorded on a configuration server with the
//! definitions in the local repository and reports every difference.
//!
//! Exit status is 0 when every checked item matches, 1 when any item
//! differs or the run fails.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Target};
use commands::CheckOptions;
use error::Result;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = match &cli.repo {
        Some(repo) => repo.clone(),
        None => std::env::current_dir()?,
    };
    let options = CheckOptions {
        json: cli.json,
        workers: cli.workers,
        timeout_secs: cli.timeout,
        server: cli.server.clone(),
    };

    let mut stdout = std::io::stdout();
    match cli.target() {
        Target::List => {
            commands::run_list(&root, &options, &mut stdout)?;
            Ok(true)
        }
        Target::All => commands::run_check(&root, None, &options, &mut stdout).await,
        Target::Category(name) => {
            commands::run_check(&root, Some(name.as_str()), &options, &mut stdout).await
        }
    }
}

/// Logs go to stderr; stdout carries the checklist or JSON document.
fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).map_err(|e| e.to_string())
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| e.to_string())
    };

    match result {
        Ok(()) if verbose => tracing::debug!("Verbose mode enabled"),
        Ok(()) => {}
        Err(e) => eprintln!("{}: failed to set up logging: {}", "warning".yellow().bold(), e),
    }
}
