//! reposync CLI
//!
//! Scans repository directories, checks artifact existence and syncs a
//! target repository with its sources.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("Failed to set up logging: {}", e)))?;
    tracing::debug!("Verbose mode enabled");

    execute_command(cli.command)
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Scan { dir, strict, json } => commands::run_scan(&dir, strict, json),
        Commands::Check {
            coordinates,
            repositories,
            check_local,
            offline,
        } => commands::run_check(&coordinates, &repositories, check_local.as_deref(), offline),
        Commands::Sync {
            config,
            sources,
            target,
            mode,
            artifacts,
            dry_run,
            json,
        } => {
            let cwd = std::env::current_dir()?;
            let args = commands::SyncArgs {
                config,
                sources,
                target,
                mode: mode.map(Into::into),
                artifacts,
                dry_run,
                json,
            };
            commands::run_sync(&cwd, args)
        }
    }
}
