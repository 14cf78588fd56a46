//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use reposync_core::SyncMode;

/// reposync - Copy what a target Maven repository is missing from its sources
#[derive(Parser, Debug)]
#[command(name = "reposync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List the artifacts stored in a repository directory
    ///
    /// Coordinates are rebuilt from the `group/artifact/version/file`
    /// layout alone.
    Scan {
        /// Repository root directory
        dir: PathBuf,

        /// Fail on the first malformed file instead of skipping it
        #[arg(long)]
        strict: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Check whether artifacts exist in repositories
    ///
    /// Examples:
    ///   reposync check com.acme:widget:1.0 -r central::default::file:///srv/m2
    ///   reposync check com.acme:widget:LATEST -r file:///srv/m2 --offline
    Check {
        /// Coordinates as groupId:artifactId:version[:extension[:classifier]]
        #[arg(required = true)]
        coordinates: Vec<String>,

        /// Repositories as id::layout::url or a bare URL, in priority order
        #[arg(short, long = "repo", required = true)]
        repositories: Vec<String>,

        /// Local repository consulted before the remote ones
        #[arg(long, value_name = "DIR")]
        check_local: Option<PathBuf>,

        /// Only consult repositories reachable without network access
        #[arg(long)]
        offline: bool,
    },

    /// Deploy to the target repository what it is missing
    ///
    /// Settings are read from reposync.toml in the current directory
    /// unless --config points elsewhere. Flags override file values.
    Sync {
        /// Configuration file
        #[arg(short, long, env = "REPOSYNC_CONFIG")]
        config: Option<PathBuf>,

        /// Source repositories as id::layout::url or a bare URL
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// Target repository as id::layout::url or a bare URL
        #[arg(short, long)]
        target: Option<String>,

        /// How the artifacts to sync are chosen
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Artifacts for single and list modes
        #[arg(short, long = "artifact")]
        artifacts: Vec<String>,

        /// Stop after computing what is missing
        #[arg(long)]
        dry_run: bool,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Sync modes available from the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Everything stored in the file source repositories
    Local,
    /// One artifact
    Single,
    /// Several artifacts
    List,
}

impl From<ModeArg> for SyncMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Local => SyncMode::Local,
            ModeArg::Single => SyncMode::Single,
            ModeArg::List => SyncMode::List,
        }
    }
}
