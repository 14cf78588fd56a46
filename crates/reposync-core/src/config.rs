//! Sync configuration parsed from `reposync.toml`
//!
//! Every key except `target_repository` is optional. Repository specs are
//! `id::layout::url` or a bare URL, and an entry may hold several specs
//! separated by commas.
//!
//! ```toml
//! source_repositories = ["central::default::file:///srv/m2"]
//! target_repository = "corp::default::file:///srv/corp"
//! mode = "single"
//! artifacts = ["com.acme:widget:1.0"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use reposync_model::{
    ArtifactCoordinate, DEFAULT_SCOPE_THRESHOLD, RemoteRepositoryRef, RepositoryPolicy,
};

use crate::engine::{SyncOptions, SyncSource};
use crate::{Error, Result};

/// File name looked up when no configuration path is given
pub const CONFIG_FILE_NAME: &str = "reposync.toml";

/// Id of the source repository used when local sync names none
pub const LOCAL_REPOSITORY_ID: &str = "local";

/// How the set of artifacts to sync is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Everything stored in `file:` source repositories
    #[default]
    Local,
    /// One artifact and its dependencies
    Single,
    /// A BOM and its managed dependencies
    Bom,
    /// Several artifacts, each handled like `single`
    List,
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncMode::Local => "local",
            SyncMode::Single => "single",
            SyncMode::Bom => "bom",
            SyncMode::List => "list",
        };
        f.write_str(name)
    }
}

fn default_scope() -> String {
    DEFAULT_SCOPE_THRESHOLD.to_string()
}

fn default_transitive() -> bool {
    true
}

/// Parsed `reposync.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    #[serde(default)]
    pub source_repositories: Vec<String>,

    pub target_repository: String,

    #[serde(default)]
    pub mode: SyncMode,

    /// Coordinates as `groupId:artifactId:version[:extension[:classifier]]`
    #[serde(default)]
    pub artifacts: Vec<String>,

    /// Scope threshold, e.g. `compile+runtime` or `compile,runtime`
    #[serde(default = "default_scope")]
    pub scope: String,

    #[serde(default)]
    pub depth: u32,

    #[serde(default = "default_transitive")]
    pub transitive: bool,

    #[serde(default)]
    pub sync_sources: bool,

    #[serde(default)]
    pub sync_javadoc: bool,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub check_local: bool,

    #[serde(default)]
    pub offline: bool,

    /// Abort local scans on the first malformed file
    #[serde(default)]
    pub fail_on_bad_artifact: bool,

    /// Local cache directory, `~/.m2/repository` when unset
    #[serde(default)]
    pub local_repository: Option<PathBuf>,
}

impl SyncConfig {
    /// A configuration with every optional key at its default.
    pub fn new(target_repository: impl Into<String>) -> Self {
        Self {
            source_repositories: Vec::new(),
            target_repository: target_repository.into(),
            mode: SyncMode::default(),
            artifacts: Vec::new(),
            scope: default_scope(),
            depth: 0,
            transitive: true,
            sync_sources: false,
            sync_javadoc: false,
            dry_run: false,
            check_local: false,
            offline: false,
            fail_on_bad_artifact: false,
            local_repository: None,
        }
    }

    /// Parse TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let config: SyncConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        debug!("Loading configuration from {}", path.display());
        Self::parse(&fs::read_to_string(path)?)
    }

    /// The local cache directory.
    pub fn local_repository(&self) -> Option<PathBuf> {
        self.local_repository
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".m2").join("repository")))
    }

    /// Configured source repositories.
    ///
    /// Local sync without sources reads the local cache directory. Other
    /// modes require at least one source.
    pub fn source_repositories(&self) -> Result<Vec<RemoteRepositoryRef>> {
        let mut repositories = self
            .source_repositories
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|spec| !spec.is_empty())
            .map(|spec| RemoteRepositoryRef::parse_spec(spec, RepositoryPolicy::update_always()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if repositories.is_empty() && self.mode == SyncMode::Local {
            let basedir = self.local_repository().ok_or(Error::NoSourceRepositories)?;
            let url = Url::from_directory_path(&basedir).map_err(|_| Error::InvalidConfig {
                message: format!("local repository {} is not absolute", basedir.display()),
            })?;
            repositories.push(
                RemoteRepositoryRef::new(LOCAL_REPOSITORY_ID, url.to_string())
                    .with_policy(RepositoryPolicy::update_always()),
            );
        }
        if repositories.is_empty() {
            return Err(Error::NoSourceRepositories);
        }
        Ok(repositories)
    }

    pub fn target_repository(&self) -> Result<RemoteRepositoryRef> {
        Ok(RemoteRepositoryRef::parse_spec(
            self.target_repository.trim(),
            RepositoryPolicy::update_always(),
        )?)
    }

    pub fn artifacts(&self) -> Result<Vec<ArtifactCoordinate>> {
        Ok(self
            .artifacts
            .iter()
            .map(|a| a.parse())
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Where the artifacts to sync come from, per `mode`.
    pub fn sync_source(&self) -> Result<SyncSource> {
        let mut artifacts = self.artifacts()?;
        let single = |artifacts: &mut Vec<ArtifactCoordinate>| match artifacts.len() {
            1 => Ok(artifacts.remove(0)),
            n => Err(Error::InvalidConfig {
                message: format!("{} sync needs exactly one artifact, got {}", self.mode, n),
            }),
        };

        Ok(match self.mode {
            SyncMode::Local => SyncSource::Local,
            SyncMode::Single => SyncSource::Single {
                artifact: single(&mut artifacts)?,
                transitive: self.transitive,
            },
            SyncMode::Bom => SyncSource::Bom {
                artifact: single(&mut artifacts)?,
                transitive: self.transitive,
            },
            SyncMode::List => {
                if artifacts.is_empty() {
                    return Err(Error::InvalidConfig {
                        message: "list sync needs at least one artifact".to_string(),
                    });
                }
                SyncSource::List {
                    artifacts,
                    transitive: self.transitive,
                }
            }
        })
    }

    /// Engine options with repositories parsed.
    pub fn options(&self) -> Result<SyncOptions> {
        Ok(SyncOptions {
            sources: self.source_repositories()?,
            target: self.target_repository()?,
            scope: self.scope.clone(),
            depth: self.depth,
            sync_sources: self.sync_sources,
            sync_javadoc: self.sync_javadoc,
            dry_run: self.dry_run,
            check_local: self.check_local,
            offline: self.offline,
            strict: self.fail_on_bad_artifact,
        })
    }
}
