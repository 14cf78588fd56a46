//! Existence check requests and outcomes

use serde::{Deserialize, Serialize};

use reposync_model::{ArtifactCoordinate, ArtifactRepository, RemoteRepositoryRef};

/// An artifact and the repositories to look for it in, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub artifact: ArtifactCoordinate,
    pub repositories: Vec<RemoteRepositoryRef>,
}

impl ResolutionRequest {
    pub fn new(artifact: ArtifactCoordinate, repositories: Vec<RemoteRepositoryRef>) -> Self {
        Self {
            artifact,
            repositories,
        }
    }

    /// One request per artifact, all against the same repositories.
    pub fn for_all(
        artifacts: &[ArtifactCoordinate],
        repositories: &[RemoteRepositoryRef],
    ) -> Vec<Self> {
        artifacts
            .iter()
            .map(|artifact| Self::new(artifact.clone(), repositories.to_vec()))
            .collect()
    }
}

/// Why an artifact could not be confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum FailureCause {
    /// Absent from a repository, or from all of them when `repository` is
    /// `None`. Offline refusals are reported here too, with an explanation.
    #[error("Could not find artifact {artifact}{}{}", in_repository(.repository), explain(.message))]
    NotFound {
        artifact: ArtifactCoordinate,
        repository: Option<String>,
        message: Option<String>,
    },

    /// The probe itself failed
    #[error("Could not transfer artifact {artifact} from {repository}: {message}")]
    Transport {
        artifact: ArtifactCoordinate,
        repository: String,
        message: String,
    },

    /// The version expression could not be resolved
    #[error("Failed to resolve version of {artifact}: {message}")]
    VersionResolution {
        artifact: ArtifactCoordinate,
        message: String,
    },
}

fn in_repository(repository: &Option<String>) -> String {
    repository
        .as_ref()
        .map(|r| format!(" in {}", r))
        .unwrap_or_default()
}

fn explain(message: &Option<String>) -> String {
    message
        .as_ref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl FailureCause {
    pub fn not_found(artifact: &ArtifactCoordinate, repository: &RemoteRepositoryRef) -> Self {
        FailureCause::NotFound {
            artifact: artifact.clone(),
            repository: Some(repository.id.clone()),
            message: None,
        }
    }

    pub fn transport(
        artifact: &ArtifactCoordinate,
        repository: &RemoteRepositoryRef,
        message: impl Into<String>,
    ) -> Self {
        FailureCause::Transport {
            artifact: artifact.clone(),
            repository: repository.id.clone(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FailureCause::NotFound { .. })
    }
}

/// The outcome of one request: found somewhere, or a non-empty list of causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Found {
        artifact: ArtifactCoordinate,
        repository: ArtifactRepository,
    },
    Failed { causes: Vec<FailureCause> },
}

impl ResolutionOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, ResolutionOutcome::Found { .. })
    }

    /// The found artifact, with its resolved version.
    pub fn artifact(&self) -> Option<&ArtifactCoordinate> {
        match self {
            ResolutionOutcome::Found { artifact, .. } => Some(artifact),
            ResolutionOutcome::Failed { .. } => None,
        }
    }

    pub fn repository(&self) -> Option<&ArtifactRepository> {
        match self {
            ResolutionOutcome::Found { repository, .. } => Some(repository),
            ResolutionOutcome::Failed { .. } => None,
        }
    }

    pub fn causes(&self) -> &[FailureCause] {
        match self {
            ResolutionOutcome::Found { .. } => &[],
            ResolutionOutcome::Failed { causes } => causes,
        }
    }

    /// Legitimately absent: failed with `NotFound` causes only.
    pub fn is_missing(&self) -> bool {
        match self {
            ResolutionOutcome::Found { .. } => false,
            ResolutionOutcome::Failed { causes } => causes.iter().all(FailureCause::is_not_found),
        }
    }

    /// The first cause that is not a plain absence.
    pub fn unexpected_cause(&self) -> Option<&FailureCause> {
        self.causes().iter().find(|cause| !cause.is_not_found())
    }
}
