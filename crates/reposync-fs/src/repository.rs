//! `file:` repositories as existence connector and version resolver

use std::cmp::Ordering;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, trace};

use reposync_model::{ArtifactCoordinate, ArtifactRepository, RemoteRepositoryRef};
use reposync_resolve::{
    ConnectorError, ExistenceProbe, FailureCause, RepositoryConnector, VersionError,
    VersionResolution, VersionResolver,
};

use crate::layout;
use crate::version::compare_versions;

/// Meta-version for the highest version, snapshots included
pub const LATEST: &str = "LATEST";
/// Meta-version for the highest non-snapshot version
pub const RELEASE: &str = "RELEASE";

fn root_of(repository: &RemoteRepositoryRef) -> Result<PathBuf, ConnectorError> {
    repository
        .file_path()
        .ok_or_else(|| ConnectorError::Unavailable {
            repository: repository.id.clone(),
            message: format!(
                "no transport for protocol '{}', only file repositories are supported",
                repository.protocol()
            ),
        })
}

/// Probes `file:` repositories by testing for the artifact file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRepositoryConnector;

impl FileRepositoryConnector {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryConnector for FileRepositoryConnector {
    fn probe_existence(
        &self,
        repository: &RemoteRepositoryRef,
        probes: &mut [ExistenceProbe],
    ) -> Result<(), ConnectorError> {
        let root = root_of(repository)?;
        for probe in probes.iter_mut() {
            let path = layout::locate(&root, &probe.artifact);
            if path.is_file() {
                trace!("{} exists", path.display());
            } else {
                probe.error = Some(FailureCause::not_found(&probe.artifact, repository));
            }
        }
        Ok(())
    }
}

/// Resolves `LATEST` and `RELEASE` by listing version directories.
///
/// Literal versions pass through untouched. Repositories that are not
/// `file:` are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileVersionResolver;

impl FileVersionResolver {
    pub fn new() -> Self {
        Self
    }

    /// Versions of `artifact` present in `repository`.
    fn versions_in(
        artifact: &ArtifactCoordinate,
        repository: &RemoteRepositoryRef,
    ) -> Vec<String> {
        let Some(root) = repository.file_path() else {
            return Vec::new();
        };
        let dir = root.join(layout::artifact_dir(&artifact.group_id, &artifact.artifact_id));
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|version| layout::locate(&root, &artifact.with_version(version.as_str())).is_file())
            .collect()
    }
}

impl VersionResolver for FileVersionResolver {
    fn resolve_version(
        &self,
        artifact: &ArtifactCoordinate,
        repositories: &[RemoteRepositoryRef],
    ) -> Result<VersionResolution, VersionError> {
        let releases_only = match artifact.version.as_str() {
            LATEST => false,
            RELEASE => true,
            _ => return Ok(VersionResolution::literal(artifact.version.clone())),
        };

        let mut best: Option<(String, &RemoteRepositoryRef)> = None;
        for repository in repositories {
            for version in Self::versions_in(artifact, repository) {
                if releases_only && artifact.with_version(version.as_str()).is_snapshot() {
                    continue;
                }
                let newer = best
                    .as_ref()
                    .is_none_or(|(current, _)| compare_versions(&version, current) == Ordering::Greater);
                if newer {
                    best = Some((version, repository));
                }
            }
        }

        match best {
            Some((version, repository)) => {
                debug!("Resolved {} to {} from {}", artifact, version, repository.id);
                Ok(VersionResolution {
                    version,
                    repository: Some(ArtifactRepository::Remote(repository.clone())),
                })
            }
            None => Err(VersionError {
                artifact: artifact.clone(),
                message: format!(
                    "no {} found in {} repositories",
                    if releases_only { "release version" } else { "version" },
                    repositories.len()
                ),
            }),
        }
    }
}
