//! Repository references and policies
//!
//! A [`RemoteRepositoryRef`] is what every check and transfer targets.
//! Several references may point at one physical repository (for example two
//! ids mirrored to the same URL); [`RemoteRepositoryRef::same_physical`]
//! decides when probes can share a batch.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// The only repository layout reposync understands
pub const DEFAULT_LAYOUT: &str = "default";

/// Id given to repositories declared by bare URL
pub const TEMP_REPOSITORY_ID: &str = "temp";

static REPOSITORY_SPEC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.+)::(.*)::(.+)$").unwrap());

/// How often cached metadata is refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    #[default]
    Daily,
    Always,
    Never,
}

/// What to do with a checksum mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    Fail,
    #[default]
    Warn,
    Ignore,
}

/// Release or snapshot policy of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryPolicy {
    pub enabled: bool,
    pub update: UpdatePolicy,
    pub checksum: ChecksumPolicy,
}

impl Default for RepositoryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            update: UpdatePolicy::Daily,
            checksum: ChecksumPolicy::Warn,
        }
    }
}

impl RepositoryPolicy {
    /// Enabled, refreshed on every access, warning on checksum mismatch.
    pub fn update_always() -> Self {
        Self {
            enabled: true,
            update: UpdatePolicy::Always,
            checksum: ChecksumPolicy::Warn,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// A remote repository as seen by the checker and the transfer layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteRepositoryRef {
    pub id: String,
    pub url: String,
    /// Content type, i.e. the repository layout
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default)]
    pub release_policy: RepositoryPolicy,
    #[serde(default)]
    pub snapshot_policy: RepositoryPolicy,
    #[serde(default)]
    pub repository_manager: bool,
    /// Repositories this one mirrors
    #[serde(default)]
    pub mirrored_repositories: Vec<RemoteRepositoryRef>,
}

fn default_layout() -> String {
    DEFAULT_LAYOUT.to_string()
}

impl RemoteRepositoryRef {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            layout: default_layout(),
            release_policy: RepositoryPolicy::default(),
            snapshot_policy: RepositoryPolicy::default(),
            repository_manager: false,
            mirrored_repositories: Vec::new(),
        }
    }

    /// Set both release and snapshot policy.
    pub fn with_policy(mut self, policy: RepositoryPolicy) -> Self {
        self.release_policy = policy;
        self.snapshot_policy = policy;
        self
    }

    pub fn with_release_policy(mut self, policy: RepositoryPolicy) -> Self {
        self.release_policy = policy;
        self
    }

    pub fn with_snapshot_policy(mut self, policy: RepositoryPolicy) -> Self {
        self.snapshot_policy = policy;
        self
    }

    pub fn with_repository_manager(mut self, repository_manager: bool) -> Self {
        self.repository_manager = repository_manager;
        self
    }

    pub fn with_mirrored(mut self, mirrored: Vec<RemoteRepositoryRef>) -> Self {
        self.mirrored_repositories = mirrored;
        self
    }

    /// The policy that applies to an artifact of the given snapshot-ness.
    pub fn policy(&self, snapshot: bool) -> &RepositoryPolicy {
        if snapshot {
            &self.snapshot_policy
        } else {
            &self.release_policy
        }
    }

    /// Two references batch together iff url, layout and manager flag match.
    pub fn same_physical(&self, other: &RemoteRepositoryRef) -> bool {
        self.url == other.url
            && self.layout == other.layout
            && self.repository_manager == other.repository_manager
    }

    /// URL scheme, lower-cased, or empty if the URL does not parse.
    pub fn protocol(&self) -> String {
        Url::parse(&self.url)
            .map(|url| url.scheme().to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Local directory of a `file:` repository.
    pub fn file_path(&self) -> Option<PathBuf> {
        let url = Url::parse(&self.url).ok()?;
        if url.scheme() != "file" {
            return None;
        }
        url.to_file_path().ok()
    }

    /// Parse `id::layout::url` or a bare URL.
    ///
    /// Bare URLs get the id `temp`; an empty layout means `default`.
    pub fn parse_spec(spec: &str, policy: RepositoryPolicy) -> Result<Self> {
        let (id, layout, url) = if spec.contains("::") {
            let caps = REPOSITORY_SPEC
                .captures(spec)
                .ok_or_else(|| Error::InvalidRepositorySpec {
                    input: spec.to_string(),
                })?;
            let layout = caps[2].trim();
            (
                caps[1].trim().to_string(),
                if layout.is_empty() { DEFAULT_LAYOUT } else { layout }.to_string(),
                caps[3].trim().to_string(),
            )
        } else {
            (
                TEMP_REPOSITORY_ID.to_string(),
                default_layout(),
                spec.trim().to_string(),
            )
        };

        if layout != DEFAULT_LAYOUT {
            return Err(Error::UnknownLayout { layout });
        }
        Url::parse(&url).map_err(|source| Error::InvalidUrl {
            url: url.clone(),
            source,
        })?;

        Ok(Self {
            layout,
            ..Self::new(id, url).with_policy(policy)
        })
    }
}

impl FromStr for RemoteRepositoryRef {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse_spec(s, RepositoryPolicy::update_always())
    }
}

impl fmt::Display for RemoteRepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.id, self.url, self.layout)
    }
}

/// A local artifact store, such as the user's cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalRepositoryRef {
    pub basedir: PathBuf,
}

impl LocalRepositoryRef {
    pub fn new(basedir: impl Into<PathBuf>) -> Self {
        Self {
            basedir: basedir.into(),
        }
    }
}

/// Where an artifact was found or a version was resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArtifactRepository {
    Remote(RemoteRepositoryRef),
    Local(LocalRepositoryRef),
}

impl ArtifactRepository {
    pub fn as_remote(&self) -> Option<&RemoteRepositoryRef> {
        match self {
            ArtifactRepository::Remote(remote) => Some(remote),
            ArtifactRepository::Local(_) => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ArtifactRepository::Local(_))
    }
}

impl fmt::Display for ArtifactRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactRepository::Remote(remote) => write!(f, "{}", remote),
            ArtifactRepository::Local(local) => write!(f, "local ({})", local.basedir.display()),
        }
    }
}
