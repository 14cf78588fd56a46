//! Content transfer between `file:` repositories

use tracing::{debug, info};

use reposync_model::{ArtifactCoordinate, RemoteRepositoryRef};
use reposync_resolve::{ArtifactDeployer, ArtifactFetcher, FetchedArtifact, TransferError};

use crate::{checksum, io, layout};

/// Fetches from and deploys into `file:` repositories.
///
/// Fetching hands out the source file in place. Deploying copies each file
/// into the target layout atomically and writes its `.sha256` sidecar.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransfer;

impl FileTransfer {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactFetcher for FileTransfer {
    fn fetch(
        &self,
        artifacts: &[ArtifactCoordinate],
        repositories: &[RemoteRepositoryRef],
    ) -> Result<Vec<FetchedArtifact>, TransferError> {
        let roots: Vec<_> = repositories
            .iter()
            .filter_map(RemoteRepositoryRef::file_path)
            .collect();

        artifacts
            .iter()
            .map(|artifact| {
                roots
                    .iter()
                    .map(|root| layout::locate(root, artifact))
                    .find(|path| path.is_file())
                    .map(|file| {
                        debug!("Fetched {} from {}", artifact, file.display());
                        FetchedArtifact {
                            artifact: artifact.clone(),
                            file,
                        }
                    })
                    .ok_or_else(|| TransferError::NotFound {
                        artifact: artifact.clone(),
                    })
            })
            .collect()
    }
}

impl ArtifactDeployer for FileTransfer {
    fn deploy(
        &self,
        artifacts: &[FetchedArtifact],
        target: &RemoteRepositoryRef,
    ) -> Result<(), TransferError> {
        let root = target
            .file_path()
            .ok_or_else(|| TransferError::UnsupportedRepository {
                repository: target.id.clone(),
                message: format!("protocol '{}' is not supported", target.protocol()),
            })?;

        for fetched in artifacts {
            let failed = |message: String| TransferError::Failed {
                artifact: fetched.artifact.clone(),
                message,
            };
            let destination = layout::locate(&root, &fetched.artifact);
            io::copy_atomic(&fetched.file, &destination).map_err(|e| failed(e.to_string()))?;

            let digest = checksum::compute_file_checksum(&destination)
                .map_err(|e| failed(e.to_string()))?;
            io::write_atomic(&checksum::sidecar_path(&destination), digest.as_bytes())
                .map_err(|e| failed(e.to_string()))?;
            debug!("Deployed {} to {}", fetched.artifact, destination.display());
        }

        info!("Deployed {} artifacts to {}", artifacts.len(), target.id);
        Ok(())
    }
}
