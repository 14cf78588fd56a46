//! SyncEngine implementation
//!
//! A sync runs in four steps: discover the artifacts that exist in the
//! source repositories, diff them against the target, fetch the missing ones
//! from the sources and deploy them to the target.
//!
//! How candidates are produced depends on the [`SyncSource`]. Every mode but
//! `local` expands its candidates with companion artifacts and then confirms
//! them against the sources: non-POMs with the existence checker, POMs with
//! the ancestry walker so that parents and imported BOMs come along.

use std::collections::HashSet;

use tracing::{debug, info};

use reposync_fs::{ScanReport, scan_local_repository};
use reposync_model::{
    ArtifactCoordinate, DependencyEdge, IdentityKey, RemoteRepositoryRef, dedup_by_identity,
    negate,
};
use reposync_resolve::{
    AncestryWalker, ArtifactDeployer, ArtifactFetcher, CollectRequest, DescriptorGraphProvider,
    DescriptorReader, ErrorPolicy, GraphCollector, GraphRequest, LocalCache, RepositoryChecker,
    RepositoryConnector, ResolutionOutcome, ResolutionRequest, VersionResolver,
};

use crate::expand::{Companions, expand_companions};
use crate::report::SyncReport;
use crate::{Error, Result};

/// Options for a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub sources: Vec<RemoteRepositoryRef>,
    pub target: RemoteRepositoryRef,
    /// Scope threshold for collection and for filtering declared dependencies
    pub scope: String,
    /// Starting depth of collections rooted at a single artifact
    pub depth: u32,
    pub sync_sources: bool,
    pub sync_javadoc: bool,
    /// Stop after computing what is missing
    pub dry_run: bool,
    /// Consult the local cache while confirming source artifacts
    pub check_local: bool,
    pub offline: bool,
    /// Abort local scans on the first malformed file
    pub strict: bool,
}

impl SyncOptions {
    pub fn new(sources: Vec<RemoteRepositoryRef>, target: RemoteRepositoryRef) -> Self {
        Self {
            sources,
            target,
            scope: reposync_model::DEFAULT_SCOPE_THRESHOLD.to_string(),
            depth: 0,
            sync_sources: false,
            sync_javadoc: false,
            dry_run: false,
            check_local: false,
            offline: false,
            strict: false,
        }
    }

    fn companions(&self) -> Companions {
        Companions {
            sources: self.sync_sources,
            javadoc: self.sync_javadoc,
        }
    }
}

/// A project being built, as seen by reactor sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactorProject {
    pub artifact: ArtifactCoordinate,
    pub dependencies: Vec<DependencyEdge>,
    /// Effective managed dependencies
    pub managed_dependencies: Vec<DependencyEdge>,
    /// Import-scope POM entries of the project's own dependency management
    pub imports: Vec<DependencyEdge>,
}

impl ReactorProject {
    pub fn new(artifact: ArtifactCoordinate) -> Self {
        Self {
            artifact,
            dependencies: Vec::new(),
            managed_dependencies: Vec::new(),
            imports: Vec::new(),
        }
    }
}

/// Where the artifacts to sync come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncSource {
    /// Every artifact stored in the `file:` source repositories
    Local,
    Single {
        artifact: ArtifactCoordinate,
        transitive: bool,
    },
    List {
        artifacts: Vec<ArtifactCoordinate>,
        transitive: bool,
    },
    /// A POM whose managed dependencies are synced
    Bom {
        artifact: ArtifactCoordinate,
        transitive: bool,
    },
    /// The dependencies of a set of projects, without the projects
    Reactor { projects: Vec<ReactorProject> },
}

impl SyncSource {
    fn name(&self) -> &'static str {
        match self {
            SyncSource::Local => "local",
            SyncSource::Single { .. } => "single",
            SyncSource::List { .. } => "list",
            SyncSource::Bom { .. } => "bom",
            SyncSource::Reactor { .. } => "reactor",
        }
    }
}

/// The collaborators a sync talks to.
pub struct SyncBackend<'a> {
    versions: &'a dyn VersionResolver,
    connector: &'a dyn RepositoryConnector,
    fetcher: &'a dyn ArtifactFetcher,
    deployer: &'a dyn ArtifactDeployer,
    descriptors: Option<&'a dyn DescriptorReader>,
    local_cache: Option<&'a dyn LocalCache>,
}

impl<'a> SyncBackend<'a> {
    pub fn new(
        versions: &'a dyn VersionResolver,
        connector: &'a dyn RepositoryConnector,
        fetcher: &'a dyn ArtifactFetcher,
        deployer: &'a dyn ArtifactDeployer,
    ) -> Self {
        Self {
            versions,
            connector,
            fetcher,
            deployer,
            descriptors: None,
            local_cache: None,
        }
    }

    /// Reader for project models. Without one, POMs are checked like any
    /// other artifact and the `bom`, transitive and `reactor` modes fail.
    pub fn with_descriptors(mut self, reader: &'a dyn DescriptorReader) -> Self {
        self.descriptors = Some(reader);
        self
    }

    pub fn with_local_cache(mut self, cache: &'a dyn LocalCache) -> Self {
        self.local_cache = Some(cache);
        self
    }
}

/// Engine for synchronizing a target repository with its sources
pub struct SyncEngine<'a> {
    options: SyncOptions,
    backend: SyncBackend<'a>,
}

impl<'a> SyncEngine<'a> {
    pub fn new(options: SyncOptions, backend: SyncBackend<'a>) -> Self {
        Self { options, backend }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Run a full sync.
    ///
    /// Ends early with "nothing to sync" when discovery or the diff comes
    /// back empty, and after the diff on a dry run.
    ///
    /// # Errors
    ///
    /// Fails if any artifact fails for a reason other than being absent,
    /// if a fetch fails, or if the deployment fails.
    pub fn run(&self, source: &SyncSource) -> Result<SyncReport> {
        if self.options.sources.is_empty() {
            return Err(Error::NoSourceRepositories);
        }
        info!(
            "Source repositories: {}",
            self.options
                .sources
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        info!("Target repository: {}", self.options.target);

        let mut report = SyncReport::new(self.options.dry_run);
        report.discovered = self.discover(source)?;
        info!("Discovered {} artifacts", report.discovered.len());
        for artifact in &report.discovered {
            debug!("\t{}", artifact);
        }
        if report.discovered.is_empty() {
            info!("Nothing to sync, exiting");
            return Ok(report);
        }

        report.missing = self.missing_artifacts(&report.discovered)?;
        info!("Found {} missing artifacts", report.missing.len());
        for artifact in &report.missing {
            debug!("\t{}", artifact);
        }
        if report.missing.is_empty() {
            info!("Nothing to sync, exiting");
            return Ok(report);
        }
        if self.options.dry_run {
            info!("Dry run, exiting");
            return Ok(report);
        }

        info!("Downloading missing artifacts");
        let fetched = self
            .backend
            .fetcher
            .fetch(&report.missing, &self.options.sources)?;
        info!("Deploying missing artifacts");
        self.backend.deployer.deploy(&fetched, &self.options.target)?;
        report.deployed = fetched.into_iter().map(|f| f.artifact).collect();
        Ok(report)
    }

    /// Artifacts of `source` that exist in the source repositories, sorted
    /// by display string.
    pub fn discover(&self, source: &SyncSource) -> Result<Vec<ArtifactCoordinate>> {
        debug!("Discovering artifacts for {} sync", source.name());
        if matches!(source, SyncSource::Local) {
            return self.scan_sources();
        }
        let candidates = self.candidates(source)?;
        self.existing_artifacts(&expand_companions(&candidates, self.options.companions()))
    }

    /// Candidate artifacts of a non-local source, before companions are added.
    pub fn candidates(&self, source: &SyncSource) -> Result<Vec<ArtifactCoordinate>> {
        match source {
            SyncSource::Local => Ok(Vec::new()),
            SyncSource::Single {
                artifact,
                transitive,
            } => self.collect_root(artifact, *transitive, source),
            SyncSource::List {
                artifacts,
                transitive,
            } => {
                let mut candidates = Vec::new();
                for artifact in artifacts {
                    candidates.extend(self.collect_root(artifact, *transitive, source)?);
                }
                Ok(dedup_by_identity(candidates))
            }
            SyncSource::Bom {
                artifact,
                transitive,
            } => self.bom_candidates(artifact, *transitive),
            SyncSource::Reactor { projects } => self.reactor_candidates(projects),
        }
    }

    /// Confirm `artifacts` against the sources.
    ///
    /// Absent non-POMs are dropped. POMs are expanded with their parents and
    /// imported BOMs when a descriptor reader is available.
    pub fn existing_artifacts(
        &self,
        artifacts: &[ArtifactCoordinate],
    ) -> Result<Vec<ArtifactCoordinate>> {
        let (poms, others): (Vec<_>, Vec<_>) = match self.backend.descriptors {
            Some(_) => artifacts.iter().cloned().partition(ArtifactCoordinate::is_pom),
            None => (Vec::new(), artifacts.to_vec()),
        };

        let requests = ResolutionRequest::for_all(&others, &self.options.sources);
        let outcomes = self
            .checker()
            .check_existence(&requests, self.options.check_local)?;
        let mut discovered = Vec::new();
        for outcome in outcomes {
            reject_unexpected(&outcome, "resolve source artifacts")?;
            if let Some(artifact) = outcome.artifact() {
                discovered.push(artifact.clone());
            }
        }

        if let Some(reader) = self.backend.descriptors {
            let walker = AncestryWalker::new(reader);
            discovered.extend(walker.walk_ancestry(&poms, &self.options.sources)?);
        }
        Ok(sorted(discovered))
    }

    /// The subset of `artifacts` absent from the target, sorted by display
    /// string.
    pub fn missing_artifacts(
        &self,
        artifacts: &[ArtifactCoordinate],
    ) -> Result<Vec<ArtifactCoordinate>> {
        let target = std::slice::from_ref(&self.options.target);
        let requests = ResolutionRequest::for_all(artifacts, target);
        let outcomes = self.checker().check_existence(&requests, false)?;

        let mut missing = Vec::new();
        for (request, outcome) in requests.into_iter().zip(outcomes) {
            reject_unexpected(&outcome, "get missing artifacts")?;
            if !outcome.is_found() {
                missing.push(request.artifact);
            }
        }
        Ok(sorted(missing))
    }

    fn checker(&self) -> RepositoryChecker<'a> {
        let checker = RepositoryChecker::new(self.backend.versions, self.backend.connector)
            .offline(self.options.offline);
        match self.backend.local_cache {
            Some(cache) => checker.with_local_cache(cache),
            None => checker,
        }
    }

    fn reader(&self, source: &SyncSource) -> Result<&'a dyn DescriptorReader> {
        self.backend
            .descriptors
            .ok_or(Error::DescriptorReaderRequired {
                mode: source.name(),
            })
    }

    /// Scan every source repository directory.
    fn scan_sources(&self) -> Result<Vec<ArtifactCoordinate>> {
        let mut found = Vec::new();
        for repository in &self.options.sources {
            let root = repository
                .file_path()
                .ok_or_else(|| Error::UnsupportedProtocol {
                    id: repository.id.clone(),
                    protocol: repository.protocol(),
                })?;
            let ScanReport { artifacts, errors } =
                scan_local_repository(&root, self.options.strict)?;
            if !errors.is_empty() {
                info!(
                    "Skipped {} malformed files in {}",
                    errors.len(),
                    repository.id
                );
            }
            found.extend(artifacts.into_iter().filter(|a| self.needs_sync(a)));
        }
        Ok(sorted(found))
    }

    /// Sources and javadoc jars are only synced when asked for.
    fn needs_sync(&self, artifact: &ArtifactCoordinate) -> bool {
        (!artifact.is_sources() || self.options.sync_sources)
            && (!artifact.is_javadoc() || self.options.sync_javadoc)
    }

    fn collect(
        &self,
        request: CollectRequest,
        depth: u32,
        source: &SyncSource,
    ) -> Result<Vec<ArtifactCoordinate>> {
        let provider = DescriptorGraphProvider::new(self.reader(source)?);
        Ok(GraphCollector::new(&provider).collect_graph(&GraphRequest {
            collect: request,
            depth,
            scope: self.options.scope.clone(),
        })?)
    }

    fn collect_root(
        &self,
        artifact: &ArtifactCoordinate,
        transitive: bool,
        source: &SyncSource,
    ) -> Result<Vec<ArtifactCoordinate>> {
        if !transitive {
            return Ok(vec![artifact.clone()]);
        }
        let request = CollectRequest::for_root(
            DependencyEdge::new(artifact.clone(), ""),
            self.options.sources.clone(),
        );
        self.collect(request, self.options.depth, source)
    }

    /// The BOM plus its managed dependencies, collected one level deep.
    fn bom_candidates(
        &self,
        bom: &ArtifactCoordinate,
        transitive: bool,
    ) -> Result<Vec<ArtifactCoordinate>> {
        if !bom.is_pom() {
            return Err(Error::NotAPom {
                artifact: bom.clone(),
            });
        }
        let source = SyncSource::Bom {
            artifact: bom.clone(),
            transitive,
        };
        let reader = self.reader(&source)?;
        let managed = reader
            .read_descriptor(bom, &self.options.sources, ErrorPolicy::Strict)
            .map_err(reposync_resolve::Error::from)?
            .map(|descriptor| descriptor.managed_dependencies)
            .unwrap_or_default();
        debug!("{} manages {} dependencies", bom, managed.len());

        let mut candidates = vec![bom.clone()];
        if !transitive {
            candidates.extend(managed.iter().map(|edge| edge.artifact.clone()));
            return Ok(dedup_by_identity(candidates));
        }

        let excluded = negate(&self.options.scope);
        for edge in managed.iter().filter(|edge| !excluded.contains(&edge.scope)) {
            let request = CollectRequest::for_root(edge.clone(), self.options.sources.clone())
                .with_managed(managed.clone());
            candidates.extend(self.collect(request, 1, &source)?);
        }
        Ok(dedup_by_identity(candidates))
    }

    /// Dependencies of every project, minus the projects themselves.
    fn reactor_candidates(&self, projects: &[ReactorProject]) -> Result<Vec<ArtifactCoordinate>> {
        let source = SyncSource::Reactor {
            projects: projects.to_vec(),
        };
        let excluded = negate(&self.options.scope);
        let mut candidates = Vec::new();
        for project in projects {
            let dependencies: Vec<DependencyEdge> = project
                .dependencies
                .iter()
                .filter(|edge| !excluded.contains(&edge.scope))
                .chain(&project.imports)
                .cloned()
                .collect();
            let request = CollectRequest::for_root_artifact(
                project.artifact.clone(),
                self.options.sources.clone(),
            )
            .with_dependencies(dependencies)
            .with_managed(project.managed_dependencies.clone());
            candidates.extend(self.collect(request, 0, &source)?);
        }

        let own: HashSet<IdentityKey> = projects.iter().map(|p| p.artifact.identity()).collect();
        Ok(dedup_by_identity(
            candidates
                .into_iter()
                .filter(|artifact| !own.contains(&artifact.identity())),
        ))
    }
}

/// Anything but a plain absence stops the sync.
fn reject_unexpected(outcome: &ResolutionOutcome, stage: &'static str) -> Result<()> {
    match outcome.unexpected_cause() {
        Some(cause) => Err(Error::Resolution {
            stage,
            cause: cause.clone(),
        }),
        None => Ok(()),
    }
}

/// Distinct artifacts ordered by display string.
fn sorted(artifacts: Vec<ArtifactCoordinate>) -> Vec<ArtifactCoordinate> {
    let mut unique = dedup_by_identity(artifacts);
    unique.sort_by_cached_key(ToString::to_string);
    unique
}
