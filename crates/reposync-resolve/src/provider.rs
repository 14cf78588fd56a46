//! Collaborator traits consumed by the engine
//!
//! The engine owns no transport and no descriptor format. Callers plug in:
//!
//! - a [`DependencyGraphProvider`] that expands a dependency graph
//! - a [`VersionResolver`] for literal and meta versions
//! - a [`RepositoryConnector`] that probes existence in batches
//! - a [`LocalCache`] lookup for the local short-circuit
//! - a [`DescriptorReader`] exposing the project model of a POM
//! - an [`ArtifactFetcher`] and an [`ArtifactDeployer`] moving content

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use reposync_model::scope::IMPORT;
use reposync_model::{
    ArtifactCoordinate, ArtifactRepository, ChecksumPolicy, DependencyEdge, LocalRepositoryRef,
    RemoteRepositoryRef,
};

use crate::collector::{CollectRequest, DependencyNode};
use crate::error::{
    ConnectorError, DescriptorError, OfflineError, Result, TransferError, VersionError,
};
use crate::outcome::FailureCause;
use crate::selector::DependencySelector;

/// How descriptor failures of a single artifact are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Every descriptor failure is returned to the caller
    #[default]
    Strict,
    /// Failures concerning one artifact are logged and the node is skipped
    IgnorePerNode,
}

/// Expands a dependency graph under the control of a selector.
///
/// Implementations derive a child selector for the root (with the root edge
/// as context, if any) before selecting the root's direct dependencies, and
/// derive again for every kept edge before descending into it.
pub trait DependencyGraphProvider {
    fn collect(
        &self,
        request: &CollectRequest,
        selector: &DependencySelector,
        policy: ErrorPolicy,
    ) -> Result<DependencyNode>;
}

/// A resolved version and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionResolution {
    pub version: String,
    /// Repository that produced the version, `None` when unknown
    pub repository: Option<ArtifactRepository>,
}

impl VersionResolution {
    /// A version taken as-is, with no repository attached.
    pub fn literal(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            repository: None,
        }
    }
}

/// Resolves version expressions such as `LATEST` or `RELEASE`.
pub trait VersionResolver {
    fn resolve_version(
        &self,
        artifact: &ArtifactCoordinate,
        repositories: &[RemoteRepositoryRef],
    ) -> std::result::Result<VersionResolution, VersionError>;
}

/// One item of a batched existence probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistenceProbe {
    pub artifact: ArtifactCoordinate,
    pub checksum_policy: ChecksumPolicy,
    /// Repositories mirrored by the probed repository
    pub mirrored: Vec<RemoteRepositoryRef>,
    /// Set by the connector when the artifact is absent or the probe failed
    pub error: Option<FailureCause>,
}

impl ExistenceProbe {
    pub fn new(artifact: ArtifactCoordinate, checksum_policy: ChecksumPolicy) -> Self {
        Self {
            artifact,
            checksum_policy,
            mirrored: Vec::new(),
            error: None,
        }
    }
}

/// Probes a repository without transferring content.
pub trait RepositoryConnector {
    /// Probe every item of `probes` against `repository`, recording a
    /// per-item error for absent artifacts.
    ///
    /// An `Err(ConnectorError::Unavailable)` applies to the whole batch.
    fn probe_existence(
        &self,
        repository: &RemoteRepositoryRef,
        probes: &mut [ExistenceProbe],
    ) -> std::result::Result<(), ConnectorError>;

    /// Whether `repository` may be used while offline.
    ///
    /// Only `file` repositories are reachable offline by default.
    fn check_offline(
        &self,
        repository: &RemoteRepositoryRef,
    ) -> std::result::Result<(), OfflineError> {
        if repository.protocol() == "file" {
            Ok(())
        } else {
            Err(OfflineError {
                repository: repository.id.clone(),
            })
        }
    }
}

/// Result of a local cache lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalLookup {
    /// The artifact is recorded as available for the given repositories
    pub available: bool,
    /// The artifact file, if present on disk
    pub file: Option<PathBuf>,
    /// Remote repository the cached copy came from
    pub repository: Option<RemoteRepositoryRef>,
}

/// The local artifact cache.
pub trait LocalCache {
    fn find(
        &self,
        artifact: &ArtifactCoordinate,
        repositories: &[RemoteRepositoryRef],
    ) -> LocalLookup;

    /// Record an artifact found on disk but not yet registered as available.
    fn register(&self, _artifact: &ArtifactCoordinate) {}

    /// The store itself, used when a hit names no remote repository.
    fn repository(&self) -> LocalRepositoryRef;
}

/// Coordinates of a declared parent project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ParentRef {
    pub fn pom(&self) -> ArtifactCoordinate {
        ArtifactCoordinate::pom(&self.group_id, &self.artifact_id, &self.version)
    }
}

/// A dependency as written in a project model, before interpolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Packaging type, `jar` when not declared
    #[serde(rename = "type", default = "default_type")]
    pub packaging: String,
    #[serde(default)]
    pub classifier: String,
    #[serde(default)]
    pub scope: String,
}

fn default_type() -> String {
    "jar".to_string()
}

impl ModelDependency {
    /// A managed entry importing a BOM.
    pub fn import(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            packaging: "pom".to_string(),
            classifier: String::new(),
            scope: IMPORT.to_string(),
        }
    }

    pub fn is_bom_import(&self) -> bool {
        self.scope == IMPORT && self.packaging == "pom"
    }

    pub fn pom(&self) -> ArtifactCoordinate {
        ArtifactCoordinate::pom(&self.group_id, &self.artifact_id, &self.version)
    }
}

/// The raw project model of a POM: just what ancestry needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectModel {
    #[serde(default)]
    pub parent: Option<ParentRef>,
    #[serde(default)]
    pub dependency_management: Vec<ModelDependency>,
}

/// A read descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// The artifact as resolved by the reader
    pub artifact: ArtifactCoordinate,
    pub dependencies: Vec<DependencyEdge>,
    /// Effective managed dependencies, imports already applied
    pub managed_dependencies: Vec<DependencyEdge>,
    /// Raw model, `None` when the reader could not attach one
    pub model: Option<ProjectModel>,
}

impl ArtifactDescriptor {
    pub fn new(artifact: ArtifactCoordinate) -> Self {
        Self {
            artifact,
            dependencies: Vec::new(),
            managed_dependencies: Vec::new(),
            model: None,
        }
    }
}

/// Reads project descriptors.
pub trait DescriptorReader {
    fn read(
        &self,
        artifact: &ArtifactCoordinate,
        repositories: &[RemoteRepositoryRef],
    ) -> std::result::Result<ArtifactDescriptor, DescriptorError>;

    /// Read under an explicit error policy.
    ///
    /// With [`ErrorPolicy::IgnorePerNode`] a per-artifact failure yields
    /// `Ok(None)`; subsystem failures always propagate.
    fn read_descriptor(
        &self,
        artifact: &ArtifactCoordinate,
        repositories: &[RemoteRepositoryRef],
        policy: ErrorPolicy,
    ) -> std::result::Result<Option<ArtifactDescriptor>, DescriptorError> {
        match self.read(artifact, repositories) {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(e) if policy == ErrorPolicy::IgnorePerNode && e.is_per_artifact() => {
                warn!("Ignoring descriptor of {}: {}", artifact, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// An artifact whose content is available as a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    pub artifact: ArtifactCoordinate,
    pub file: PathBuf,
}

/// Retrieves artifact content from source repositories.
pub trait ArtifactFetcher {
    /// Fetch every artifact; any single failure fails the call.
    fn fetch(
        &self,
        artifacts: &[ArtifactCoordinate],
        repositories: &[RemoteRepositoryRef],
    ) -> std::result::Result<Vec<FetchedArtifact>, TransferError>;
}

/// Publishes fetched artifacts into a target repository.
pub trait ArtifactDeployer {
    fn deploy(
        &self,
        artifacts: &[FetchedArtifact],
        target: &RemoteRepositoryRef,
    ) -> std::result::Result<(), TransferError>;
}
