//! Local cache over a repository directory
//!
//! Origins of downloaded files are tracked in a `_remote.repositories` file
//! per version directory, one `fileName>repositoryId=` line per origin. An
//! empty repository id marks a locally installed file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use reposync_model::{ArtifactCoordinate, LocalRepositoryRef, RemoteRepositoryRef};
use reposync_resolve::{LocalCache, LocalLookup};

use crate::layout;

/// Name of the per-version origin record
pub const TRACKING_FILE: &str = "_remote.repositories";

/// A local cache rooted at a directory, e.g. `~/.m2/repository`.
#[derive(Debug, Clone)]
pub struct FileLocalCache {
    basedir: PathBuf,
}

impl FileLocalCache {
    pub fn new(basedir: impl Into<PathBuf>) -> Self {
        Self {
            basedir: basedir.into(),
        }
    }

    /// The user's default cache, `~/.m2/repository`.
    pub fn user_default() -> Option<Self> {
        dirs::home_dir().map(|home| Self::new(home.join(".m2").join("repository")))
    }

    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    /// Repository ids recorded for `file_name` in `version_dir`.
    fn origins(version_dir: &Path, file_name: &str) -> Vec<String> {
        let Ok(content) = fs::read_to_string(version_dir.join(TRACKING_FILE)) else {
            return Vec::new();
        };
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#'))
            .filter_map(|line| line.strip_suffix('='))
            .filter_map(|entry| entry.split_once('>'))
            .filter(|(name, _)| *name == file_name)
            .map(|(_, id)| id.to_string())
            .collect()
    }
}

impl LocalCache for FileLocalCache {
    fn find(
        &self,
        artifact: &ArtifactCoordinate,
        repositories: &[RemoteRepositoryRef],
    ) -> LocalLookup {
        let file = layout::locate(&self.basedir, artifact);
        if !file.is_file() {
            return LocalLookup::default();
        }

        let file_name = layout::file_name(artifact);
        let origins = file
            .parent()
            .map(|dir| Self::origins(dir, &file_name))
            .unwrap_or_default();

        // Locally installed files are available to every request
        if origins.iter().any(String::is_empty) {
            return LocalLookup {
                available: true,
                file: Some(file),
                repository: None,
            };
        }
        let origin = repositories
            .iter()
            .find(|repository| origins.contains(&repository.id))
            .cloned();
        LocalLookup {
            available: origin.is_some(),
            file: Some(file),
            repository: origin,
        }
    }

    fn register(&self, artifact: &ArtifactCoordinate) {
        let file = layout::locate(&self.basedir, artifact);
        let Some(dir) = file.parent() else {
            return;
        };
        let tracking = dir.join(TRACKING_FILE);
        let line = format!("{}>=\n", layout::file_name(artifact));
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&tracking)
            .and_then(|mut f| f.write_all(line.as_bytes()));
        match written {
            Ok(()) => debug!("Registered {} as locally installed", artifact),
            Err(e) => warn!("Cannot register {} in {}: {}", artifact, tracking.display(), e),
        }
    }

    fn repository(&self) -> LocalRepositoryRef {
        LocalRepositoryRef::new(self.basedir.clone())
    }
}
