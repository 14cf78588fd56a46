//! Sync command implementation

use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::debug;

use reposync_core::{CONFIG_FILE_NAME, SyncBackend, SyncConfig, SyncEngine, SyncMode, SyncReport};
use reposync_fs::{FileLocalCache, FileRepositoryConnector, FileTransfer, FileVersionResolver};

use crate::error::{CliError, Result};

/// Command-line values for a sync, overriding the configuration file
#[derive(Debug, Clone, Default)]
pub struct SyncArgs {
    pub config: Option<PathBuf>,
    pub sources: Vec<String>,
    pub target: Option<String>,
    pub mode: Option<SyncMode>,
    pub artifacts: Vec<String>,
    pub dry_run: bool,
    pub json: bool,
}

/// Build the effective configuration.
///
/// An explicit `--config` must exist. Without one, `reposync.toml` in `cwd`
/// is used when present, and `--target` is required otherwise.
pub fn resolve_config(cwd: &Path, args: &SyncArgs) -> Result<SyncConfig> {
    let path = args
        .config
        .clone()
        .unwrap_or_else(|| cwd.join(CONFIG_FILE_NAME));

    let mut config = if args.config.is_some() || path.is_file() {
        SyncConfig::load(&path)?
    } else {
        debug!("No {} in {}", CONFIG_FILE_NAME, cwd.display());
        let target = args.target.clone().ok_or_else(|| {
            CliError::user(format!(
                "No {} found and no --target given",
                CONFIG_FILE_NAME
            ))
        })?;
        SyncConfig::new(target)
    };

    if !args.sources.is_empty() {
        config.source_repositories = args.sources.clone();
    }
    if let Some(target) = &args.target {
        config.target_repository = target.clone();
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if !args.artifacts.is_empty() {
        config.artifacts = args.artifacts.clone();
    }
    config.dry_run |= args.dry_run;

    // No descriptor reader ships with the binary
    if matches!(config.mode, SyncMode::Single | SyncMode::List) && config.transitive {
        debug!("Collecting {} sync non-transitively", config.mode);
        config.transitive = false;
    }
    Ok(config)
}

/// Run the sync command against `file:` repositories.
pub fn run_sync(cwd: &Path, args: SyncArgs) -> Result<()> {
    let config = resolve_config(cwd, &args)?;
    let options = config.options()?;
    let source = config.sync_source()?;

    let versions = FileVersionResolver::new();
    let connector = FileRepositoryConnector::new();
    let transfer = FileTransfer::new();
    let cache = config.local_repository().map(FileLocalCache::new);

    let mut backend = SyncBackend::new(&versions, &connector, &transfer, &transfer);
    if let Some(cache) = &cache {
        backend = backend.with_local_cache(cache);
    }

    if !args.json {
        println!(
            "{} Syncing {} into {}",
            "=>".blue().bold(),
            config.mode,
            options.target.id
        );
    }
    let engine = SyncEngine::new(options, backend);
    let report = engine.run(&source)?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    if report.dry_run && !report.nothing_to_sync() {
        println!("{}", "Would deploy:".bold());
        for artifact in &report.missing {
            println!("   {}", artifact);
        }
    }
    for artifact in &report.deployed {
        println!("{} {}", "DEPLOYED".green().bold(), artifact);
    }
    println!("{} {}", "OK".green().bold(), report.summary());
}
