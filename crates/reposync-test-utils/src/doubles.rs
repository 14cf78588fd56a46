//! In-memory collaborators for engine tests.
//!
//! Every double records how it was called so tests can assert on batching
//! and short-circuit behaviour, not only on results.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use reposync_model::{
    ArtifactCoordinate, ArtifactRepository, DependencyEdge, IdentityKey, KindKey,
    LocalRepositoryRef, RemoteRepositoryRef,
};
use reposync_resolve::{
    ArtifactDeployer, ArtifactDescriptor, ArtifactFetcher, ConnectorError, DescriptorError,
    DescriptorReader, ExistenceProbe, FailureCause, FetchedArtifact, LocalCache, LocalLookup,
    OfflineError, ProjectModel, RepositoryConnector, TransferError, VersionError,
    VersionResolution, VersionResolver,
};

/// A connector over in-memory repository contents, keyed by repository URL.
///
/// # Example
///
/// ```rust,no_run
/// use reposync_model::{ArtifactCoordinate, RemoteRepositoryRef};
/// use reposync_test_utils::doubles::InMemoryConnector;
///
/// let central = RemoteRepositoryRef::new("central", "https://repo.example.com");
/// let widget = ArtifactCoordinate::new("com.acme", "widget", "", "jar", "1.0");
/// let connector = InMemoryConnector::new().with_artifact(&central, &widget);
/// assert_eq!(connector.batches(&central), 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryConnector {
    contents: HashMap<String, HashSet<IdentityKey>>,
    unavailable: HashSet<String>,
    reachable_offline: HashSet<String>,
    broken: bool,
    batches: RefCell<HashMap<String, usize>>,
    probed: RefCell<Vec<(String, ArtifactCoordinate)>>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `artifact` in `repository`.
    pub fn with_artifact(mut self, repository: &RemoteRepositoryRef, artifact: &ArtifactCoordinate) -> Self {
        self.contents
            .entry(repository.url.clone())
            .or_default()
            .insert(artifact.identity());
        self
    }

    /// Fail every batch against `repository` as having no transport.
    pub fn unavailable(mut self, repository: &RemoteRepositoryRef) -> Self {
        self.unavailable.insert(repository.url.clone());
        self
    }

    /// Allow `repository` while offline even though it is not `file:`.
    pub fn reachable_offline(mut self, repository: &RemoteRepositoryRef) -> Self {
        self.reachable_offline.insert(repository.url.clone());
        self
    }

    /// Fail every batch with a subsystem error.
    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    /// Number of batches issued against the physical repository of `repository`.
    pub fn batches(&self, repository: &RemoteRepositoryRef) -> usize {
        self.batches
            .borrow()
            .get(&repository.url)
            .copied()
            .unwrap_or_default()
    }

    /// Every artifact probed in `repository`, in probe order.
    pub fn probed_in(&self, repository: &RemoteRepositoryRef) -> Vec<ArtifactCoordinate> {
        self.probed
            .borrow()
            .iter()
            .filter(|(url, _)| *url == repository.url)
            .map(|(_, artifact)| artifact.clone())
            .collect()
    }

    /// Total number of probed items over all repositories.
    pub fn total_probes(&self) -> usize {
        self.probed.borrow().len()
    }
}

impl RepositoryConnector for InMemoryConnector {
    fn probe_existence(
        &self,
        repository: &RemoteRepositoryRef,
        probes: &mut [ExistenceProbe],
    ) -> Result<(), ConnectorError> {
        *self
            .batches
            .borrow_mut()
            .entry(repository.url.clone())
            .or_default() += 1;
        self.probed.borrow_mut().extend(
            probes
                .iter()
                .map(|probe| (repository.url.clone(), probe.artifact.clone())),
        );

        if self.broken {
            return Err(ConnectorError::Subsystem {
                message: "connector registry unavailable".to_string(),
            });
        }
        if self.unavailable.contains(&repository.url) {
            return Err(ConnectorError::Unavailable {
                repository: repository.id.clone(),
                message: format!("no transporter for {}", repository.url),
            });
        }

        let stored = self.contents.get(&repository.url);
        for probe in probes.iter_mut() {
            let present = stored.is_some_and(|s| s.contains(&probe.artifact.identity()));
            if !present {
                probe.error = Some(FailureCause::not_found(&probe.artifact, repository));
            }
        }
        Ok(())
    }

    fn check_offline(&self, repository: &RemoteRepositoryRef) -> Result<(), OfflineError> {
        if repository.protocol() == "file" || self.reachable_offline.contains(&repository.url) {
            Ok(())
        } else {
            Err(OfflineError {
                repository: repository.id.clone(),
            })
        }
    }
}

/// Resolves versions from a fixed table; unknown artifacts keep their version.
#[derive(Debug, Default)]
pub struct StaticVersionResolver {
    resolutions: HashMap<KindKey, VersionResolution>,
    failures: HashSet<KindKey>,
    calls: RefCell<usize>,
}

impl StaticVersionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve any version of `artifact`'s kind to `version` from `repository`.
    pub fn with_resolution(
        mut self,
        artifact: &ArtifactCoordinate,
        version: &str,
        repository: Option<ArtifactRepository>,
    ) -> Self {
        self.resolutions.insert(
            artifact.kind(),
            VersionResolution {
                version: version.to_string(),
                repository,
            },
        );
        self
    }

    /// Fail to resolve any version of `artifact`'s kind.
    pub fn failing(mut self, artifact: &ArtifactCoordinate) -> Self {
        self.failures.insert(artifact.kind());
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.borrow()
    }
}

impl VersionResolver for StaticVersionResolver {
    fn resolve_version(
        &self,
        artifact: &ArtifactCoordinate,
        _repositories: &[RemoteRepositoryRef],
    ) -> Result<VersionResolution, VersionError> {
        *self.calls.borrow_mut() += 1;
        let kind = artifact.kind();
        if self.failures.contains(&kind) {
            return Err(VersionError {
                artifact: artifact.clone(),
                message: format!("no versions available for {}", artifact),
            });
        }
        Ok(self
            .resolutions
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| VersionResolution::literal(artifact.version.clone())))
    }
}

/// Descriptors held in memory, keyed by artifact identity.
#[derive(Debug, Default)]
pub struct InMemoryDescriptorReader {
    descriptors: HashMap<IdentityKey, ArtifactDescriptor>,
    invalid: HashSet<IdentityKey>,
    broken: HashSet<IdentityKey>,
    reads: RefCell<Vec<ArtifactCoordinate>>,
}

impl InMemoryDescriptorReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_descriptor(mut self, descriptor: ArtifactDescriptor) -> Self {
        self.descriptors
            .insert(descriptor.artifact.identity(), descriptor);
        self
    }

    /// A descriptor declaring `dependencies` and nothing else.
    pub fn with_dependencies(
        self,
        artifact: &ArtifactCoordinate,
        dependencies: Vec<DependencyEdge>,
    ) -> Self {
        let mut descriptor = ArtifactDescriptor::new(artifact.clone());
        descriptor.dependencies = dependencies;
        self.with_descriptor(descriptor)
    }

    /// A POM descriptor carrying `model`.
    pub fn with_model(self, pom: &ArtifactCoordinate, model: ProjectModel) -> Self {
        let mut descriptor = ArtifactDescriptor::new(pom.clone());
        descriptor.model = Some(model);
        self.with_descriptor(descriptor)
    }

    /// Report `artifact`'s descriptor as unreadable.
    pub fn invalid(mut self, artifact: &ArtifactCoordinate) -> Self {
        self.invalid.insert(artifact.identity());
        self
    }

    /// Fail with a subsystem error when `artifact` is read.
    pub fn broken_at(mut self, artifact: &ArtifactCoordinate) -> Self {
        self.broken.insert(artifact.identity());
        self
    }

    /// Every artifact read so far, in order.
    pub fn reads(&self) -> Vec<ArtifactCoordinate> {
        self.reads.borrow().clone()
    }
}

impl DescriptorReader for InMemoryDescriptorReader {
    fn read(
        &self,
        artifact: &ArtifactCoordinate,
        _repositories: &[RemoteRepositoryRef],
    ) -> Result<ArtifactDescriptor, DescriptorError> {
        self.reads.borrow_mut().push(artifact.clone());
        let key = artifact.identity();
        if self.broken.contains(&key) {
            return Err(DescriptorError::Subsystem {
                reason: format!("model builder failed on {}", artifact),
            });
        }
        if self.invalid.contains(&key) {
            return Err(DescriptorError::Invalid {
                artifact: artifact.clone(),
                reason: "malformed descriptor".to_string(),
            });
        }
        self.descriptors
            .get(&key)
            .cloned()
            .ok_or_else(|| DescriptorError::Missing {
                artifact: artifact.clone(),
            })
    }
}

/// A local cache with scripted lookups.
#[derive(Debug)]
pub struct InMemoryLocalCache {
    basedir: PathBuf,
    entries: HashMap<IdentityKey, LocalLookup>,
    registered: RefCell<Vec<ArtifactCoordinate>>,
}

impl Default for InMemoryLocalCache {
    fn default() -> Self {
        Self::new("/home/user/.m2/repository")
    }
}

impl InMemoryLocalCache {
    pub fn new(basedir: impl Into<PathBuf>) -> Self {
        Self {
            basedir: basedir.into(),
            entries: HashMap::new(),
            registered: RefCell::new(Vec::new()),
        }
    }

    /// Record `artifact` as available, optionally downloaded from `origin`.
    pub fn with_available(
        mut self,
        artifact: &ArtifactCoordinate,
        origin: Option<&RemoteRepositoryRef>,
    ) -> Self {
        let file = self.file_of(artifact);
        self.entries.insert(
            artifact.identity(),
            LocalLookup {
                available: true,
                file: Some(file),
                repository: origin.cloned(),
            },
        );
        self
    }

    /// Put `artifact` on disk without recording where it came from.
    pub fn with_file(mut self, artifact: &ArtifactCoordinate) -> Self {
        let file = self.file_of(artifact);
        self.entries.insert(
            artifact.identity(),
            LocalLookup {
                available: false,
                file: Some(file),
                repository: None,
            },
        );
        self
    }

    /// Artifacts registered by the checker after a bare file hit.
    pub fn registered(&self) -> Vec<ArtifactCoordinate> {
        self.registered.borrow().clone()
    }

    fn file_of(&self, artifact: &ArtifactCoordinate) -> PathBuf {
        self.basedir
            .join(&artifact.artifact_id)
            .join(format!("{}-{}.{}", artifact.artifact_id, artifact.version, artifact.extension))
    }
}

impl LocalCache for InMemoryLocalCache {
    fn find(
        &self,
        artifact: &ArtifactCoordinate,
        _repositories: &[RemoteRepositoryRef],
    ) -> LocalLookup {
        self.entries
            .get(&artifact.identity())
            .cloned()
            .unwrap_or_default()
    }

    fn register(&self, artifact: &ArtifactCoordinate) {
        self.registered.borrow_mut().push(artifact.clone());
    }

    fn repository(&self) -> LocalRepositoryRef {
        LocalRepositoryRef::new(self.basedir.clone())
    }
}

/// Fetcher and deployer that move nothing and remember every call.
#[derive(Debug, Default)]
pub struct RecordingTransfer {
    unfetchable: HashSet<IdentityKey>,
    fetched: RefCell<Vec<ArtifactCoordinate>>,
    deployed: RefCell<Vec<(String, ArtifactCoordinate)>>,
}

impl RecordingTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any fetch that includes `artifact`.
    pub fn unfetchable(mut self, artifact: &ArtifactCoordinate) -> Self {
        self.unfetchable.insert(artifact.identity());
        self
    }

    pub fn fetched(&self) -> Vec<ArtifactCoordinate> {
        self.fetched.borrow().clone()
    }

    /// Artifacts deployed into the repository with id `repository_id`.
    pub fn deployed_to(&self, repository_id: &str) -> Vec<ArtifactCoordinate> {
        self.deployed
            .borrow()
            .iter()
            .filter(|(id, _)| id == repository_id)
            .map(|(_, artifact)| artifact.clone())
            .collect()
    }

    pub fn deploy_count(&self) -> usize {
        self.deployed.borrow().len()
    }
}

impl ArtifactFetcher for RecordingTransfer {
    fn fetch(
        &self,
        artifacts: &[ArtifactCoordinate],
        _repositories: &[RemoteRepositoryRef],
    ) -> Result<Vec<FetchedArtifact>, TransferError> {
        if let Some(artifact) = artifacts
            .iter()
            .find(|a| self.unfetchable.contains(&a.identity()))
        {
            return Err(TransferError::NotFound {
                artifact: artifact.clone(),
            });
        }
        self.fetched.borrow_mut().extend(artifacts.iter().cloned());
        Ok(artifacts
            .iter()
            .map(|artifact| FetchedArtifact {
                artifact: artifact.clone(),
                file: PathBuf::from("/fetched").join(artifact.to_string()),
            })
            .collect())
    }
}

impl ArtifactDeployer for RecordingTransfer {
    fn deploy(
        &self,
        artifacts: &[FetchedArtifact],
        target: &RemoteRepositoryRef,
    ) -> Result<(), TransferError> {
        self.deployed.borrow_mut().extend(
            artifacts
                .iter()
                .map(|fetched| (target.id.clone(), fetched.artifact.clone())),
        );
        Ok(())
    }
}
