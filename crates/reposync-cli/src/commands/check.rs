//! Check command implementation

use std::path::Path;

use colored::Colorize;

use reposync_fs::{FileLocalCache, FileRepositoryConnector, FileVersionResolver};
use reposync_model::{ArtifactCoordinate, RemoteRepositoryRef};
use reposync_resolve::{RepositoryChecker, ResolutionOutcome, ResolutionRequest};

use crate::error::{CliError, Result};

/// Run the check command
///
/// Prints one line per coordinate and fails when any of them is not found.
pub fn run_check(
    coordinates: &[String],
    repositories: &[String],
    check_local: Option<&Path>,
    offline: bool,
) -> Result<()> {
    let artifacts = coordinates
        .iter()
        .map(|c| c.parse())
        .collect::<std::result::Result<Vec<ArtifactCoordinate>, _>>()?;
    let repositories = repositories
        .iter()
        .map(|r| r.parse())
        .collect::<std::result::Result<Vec<RemoteRepositoryRef>, _>>()?;

    let versions = FileVersionResolver::new();
    let connector = FileRepositoryConnector::new();
    let cache = check_local.map(FileLocalCache::new);
    let mut checker = RepositoryChecker::new(&versions, &connector).offline(offline);
    if let Some(cache) = &cache {
        checker = checker.with_local_cache(cache);
    }

    let requests = ResolutionRequest::for_all(&artifacts, &repositories);
    let outcomes = checker.check_existence(&requests, cache.is_some())?;

    let mut absent = 0;
    for (request, outcome) in requests.iter().zip(&outcomes) {
        match outcome {
            ResolutionOutcome::Found {
                artifact,
                repository,
            } => {
                println!("{} {} in {}", "FOUND".green().bold(), artifact, repository);
            }
            ResolutionOutcome::Failed { causes } => {
                absent += 1;
                let label = if outcome.is_missing() {
                    "MISSING".yellow().bold()
                } else {
                    "FAILED".red().bold()
                };
                println!("{} {}", label, request.artifact);
                for cause in causes {
                    println!("   {}", cause);
                }
            }
        }
    }

    if absent > 0 {
        return Err(CliError::user(format!(
            "{} of {} artifacts not found",
            absent,
            outcomes.len()
        )));
    }
    Ok(())
}
