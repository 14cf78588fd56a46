//! Repository existence checking
//!
//! [`RepositoryChecker`] answers "does this artifact exist in one of these
//! repositories" for a batch of requests without transferring content.
//!
//! A pass runs in two phases. Classification resolves each request's version,
//! narrows its candidate repositories, consults the local cache and files one
//! [`ResolutionItem`] per remaining candidate into the [`ResolutionGroup`] of
//! that candidate's physical repository. Probing then issues one batched call
//! per group, in first-seen order. All items of a request share one result
//! handle, so a request confirmed by an earlier group is left out of the
//! batches of later groups.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

use reposync_model::{ArtifactCoordinate, ArtifactRepository, RemoteRepositoryRef};

use crate::error::{ConnectorError, Result};
use crate::outcome::{FailureCause, ResolutionOutcome, ResolutionRequest};
use crate::provider::{
    ExistenceProbe, LocalCache, LocalLookup, RepositoryConnector, VersionResolution,
    VersionResolver,
};

/// Result under construction for one request. Shared by all of its items.
#[derive(Debug, Clone)]
struct PendingResult {
    /// The requested artifact, with its version resolved once known
    artifact: ArtifactCoordinate,
    found: Option<(ArtifactCoordinate, ArtifactRepository)>,
    causes: Vec<FailureCause>,
}

impl PendingResult {
    fn new(artifact: ArtifactCoordinate) -> Self {
        Self {
            artifact,
            found: None,
            causes: Vec::new(),
        }
    }

    fn is_resolved(&self) -> bool {
        self.found.is_some()
    }

    fn into_outcome(self) -> ResolutionOutcome {
        if let Some((artifact, repository)) = self.found {
            return ResolutionOutcome::Found {
                artifact,
                repository,
            };
        }
        let mut causes = self.causes;
        if causes.is_empty() {
            causes.push(FailureCause::NotFound {
                artifact: self.artifact,
                repository: None,
                message: None,
            });
        }
        ResolutionOutcome::Failed { causes }
    }
}

type ResultHandle = Rc<RefCell<PendingResult>>;

/// One request's claim on a group.
#[derive(Debug)]
struct ResolutionItem {
    artifact: ArtifactCoordinate,
    /// The candidate as listed in the request; may differ from the group's
    /// repository in id or mirrors while being the same physical target
    repository: RemoteRepositoryRef,
    result: ResultHandle,
}

/// Pending items that target one physical repository.
#[derive(Debug)]
struct ResolutionGroup {
    repository: RemoteRepositoryRef,
    items: Vec<ResolutionItem>,
}

impl ResolutionGroup {
    fn new(repository: RemoteRepositoryRef) -> Self {
        Self {
            repository,
            items: Vec::new(),
        }
    }
}

/// Checks artifact existence across repositories with batched probes.
pub struct RepositoryChecker<'a> {
    versions: &'a dyn VersionResolver,
    connector: &'a dyn RepositoryConnector,
    local: Option<&'a dyn LocalCache>,
    offline: bool,
}

impl<'a> RepositoryChecker<'a> {
    pub fn new(versions: &'a dyn VersionResolver, connector: &'a dyn RepositoryConnector) -> Self {
        Self {
            versions,
            connector,
            local: None,
            offline: false,
        }
    }

    /// Local cache consulted when a pass asks for the local short-circuit.
    pub fn with_local_cache(mut self, cache: &'a dyn LocalCache) -> Self {
        self.local = Some(cache);
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Check one request.
    pub fn check_one(
        &self,
        request: &ResolutionRequest,
        check_local: bool,
    ) -> Result<ResolutionOutcome> {
        let mut outcomes = self.check_existence(std::slice::from_ref(request), check_local)?;
        Ok(outcomes.remove(0))
    }

    /// Check every request and return one outcome per request, in order.
    ///
    /// Per-artifact failures end up in the outcomes. Only a connector
    /// subsystem failure aborts the pass.
    pub fn check_existence(
        &self,
        requests: &[ResolutionRequest],
        check_local: bool,
    ) -> Result<Vec<ResolutionOutcome>> {
        let mut results: Vec<ResultHandle> = Vec::with_capacity(requests.len());
        let mut groups: Vec<ResolutionGroup> = Vec::new();

        for request in requests {
            let result = Rc::new(RefCell::new(PendingResult::new(request.artifact.clone())));
            results.push(Rc::clone(&result));
            self.classify(request, check_local, &result, &mut groups);
        }

        debug!(
            "Checking {} requests against {} repository groups",
            requests.len(),
            groups.len()
        );
        for group in &groups {
            self.probe_group(group)?;
        }

        // Items hold the other handles; release them so each result is unique.
        drop(groups);
        let outcomes: Vec<ResolutionOutcome> = results
            .into_iter()
            .map(|handle| Rc::unwrap_or_clone(handle).into_inner().into_outcome())
            .collect();

        let found = outcomes.iter().filter(|o| o.is_found()).count();
        info!(
            "Existence check: {} of {} artifacts found",
            found,
            outcomes.len()
        );
        Ok(outcomes)
    }

    /// Resolve, narrow, short-circuit and file one request into groups.
    fn classify(
        &self,
        request: &ResolutionRequest,
        check_local: bool,
        result: &ResultHandle,
        groups: &mut Vec<ResolutionGroup>,
    ) {
        let resolution = match self
            .versions
            .resolve_version(&request.artifact, &request.repositories)
        {
            Ok(resolution) => resolution,
            Err(e) => {
                debug!("Version resolution failed for {}: {}", request.artifact, e);
                result
                    .borrow_mut()
                    .causes
                    .push(FailureCause::VersionResolution {
                        artifact: request.artifact.clone(),
                        message: e.message,
                    });
                return;
            }
        };

        let artifact = request.artifact.with_version(&resolution.version);
        result.borrow_mut().artifact = artifact.clone();

        let repositories = match &resolution.repository {
            Some(ArtifactRepository::Remote(origin)) => vec![origin.clone()],
            Some(ArtifactRepository::Local(_)) => Vec::new(),
            None => request.repositories.clone(),
        };

        if check_local
            && let Some(cache) = self.local
            && let Some(location) = self.find_locally(cache, &artifact, &repositories, &resolution)
        {
            debug!("{} found locally in {}", artifact, location);
            result.borrow_mut().found = Some((artifact, location));
            return;
        }

        let snapshot = artifact.is_snapshot();
        let mut cursor = 0;
        for repository in repositories {
            if !repository.policy(snapshot).enabled {
                debug!("Skipping {} for {}: policy disabled", repository.id, artifact);
                continue;
            }

            if self.offline
                && let Err(e) = self.connector.check_offline(&repository)
            {
                debug!("{}", e);
                result.borrow_mut().causes.push(FailureCause::NotFound {
                    artifact: artifact.clone(),
                    repository: Some(repository.id.clone()),
                    message: Some(format!(
                        "Cannot access {} ({}) in offline mode and the artifact {} has not been downloaded from it before.",
                        repository.id, repository.url, artifact
                    )),
                });
                continue;
            }

            let item = ResolutionItem {
                artifact: artifact.clone(),
                repository: repository.clone(),
                result: Rc::clone(result),
            };

            // Groups before the cursor precede an earlier candidate of this
            // request; matching them would invert its priority order.
            let matched = groups[cursor..]
                .iter()
                .position(|group| group.repository.same_physical(&repository));
            cursor = match matched {
                Some(offset) => {
                    let index = cursor + offset;
                    groups[index].items.push(item);
                    index + 1
                }
                None => {
                    let mut group = ResolutionGroup::new(repository);
                    group.items.push(item);
                    groups.push(group);
                    groups.len()
                }
            };
        }
    }

    /// The location to report when the local cache already holds `artifact`.
    fn find_locally(
        &self,
        cache: &dyn LocalCache,
        artifact: &ArtifactCoordinate,
        repositories: &[RemoteRepositoryRef],
        resolution: &VersionResolution,
    ) -> Option<ArtifactRepository> {
        let lookup = cache.find(artifact, repositories);
        if !is_locally_installed(&lookup, resolution, repositories) {
            return None;
        }
        if !lookup.available {
            cache.register(artifact);
        }
        Some(match lookup.repository {
            Some(remote) => ArtifactRepository::Remote(remote),
            None => ArtifactRepository::Local(cache.repository()),
        })
    }

    /// Probe the still unresolved items of `group` in one batch.
    fn probe_group(&self, group: &ResolutionGroup) -> Result<()> {
        let pending: Vec<&ResolutionItem> = group
            .items
            .iter()
            .filter(|item| !item.result.borrow().is_resolved())
            .collect();
        if pending.is_empty() {
            debug!("Nothing left to probe in {}", group.repository.id);
            return Ok(());
        }

        let mut probes: Vec<ExistenceProbe> = pending
            .iter()
            .map(|item| {
                let policy = group.repository.policy(item.artifact.is_snapshot());
                let mut probe = ExistenceProbe::new(item.artifact.clone(), policy.checksum);
                probe.mirrored = item.repository.mirrored_repositories.clone();
                probe
            })
            .collect();

        debug!(
            "Probing {} artifacts in {}",
            probes.len(),
            group.repository
        );
        match self.connector.probe_existence(&group.repository, &mut probes) {
            Ok(()) => {}
            Err(ConnectorError::Unavailable { message, .. }) => {
                for probe in &mut probes {
                    probe.error = Some(FailureCause::transport(
                        &probe.artifact,
                        &group.repository,
                        message.clone(),
                    ));
                }
            }
            Err(e @ ConnectorError::Subsystem { .. }) => return Err(e.into()),
        }

        for (item, probe) in pending.into_iter().zip(probes) {
            let mut result = item.result.borrow_mut();
            match probe.error {
                None => {
                    if !result.is_resolved() {
                        result.found = Some((
                            probe.artifact,
                            ArtifactRepository::Remote(group.repository.clone()),
                        ));
                    }
                }
                Some(cause) => result.causes.push(cause),
            }
        }
        Ok(())
    }
}

/// Whether a local lookup counts as an installed artifact.
///
/// A recorded hit always counts. A bare file counts when the version came
/// from the local store, or when nothing named a source and no remote
/// repository is left to ask.
fn is_locally_installed(
    lookup: &LocalLookup,
    resolution: &VersionResolution,
    repositories: &[RemoteRepositoryRef],
) -> bool {
    if lookup.available {
        return true;
    }
    if lookup.file.is_none() {
        return false;
    }
    match &resolution.repository {
        Some(ArtifactRepository::Local(_)) => true,
        Some(ArtifactRepository::Remote(_)) => false,
        None => repositories.is_empty(),
    }
}
