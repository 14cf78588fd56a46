//! Error types for reposync-resolve

use reposync_model::ArtifactCoordinate;

/// Result type for reposync-resolve operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pass-level failures that abort a collection, check or walk
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The dependency graph provider could not build the graph at all
    #[error("Failed to collect dependencies: {message}")]
    Collection { message: String },

    /// Descriptor failure that the active error policy does not tolerate
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// Connector infrastructure failure, as opposed to a per-batch failure
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error(transparent)]
    Model(#[from] reposync_model::Error),
}

/// Failure to read a project descriptor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    /// No descriptor exists for the artifact in any repository
    #[error("Descriptor of {artifact} not found")]
    Missing { artifact: ArtifactCoordinate },

    /// The descriptor exists but cannot be read or understood
    #[error("Descriptor of {artifact} is invalid: {reason}")]
    Invalid {
        artifact: ArtifactCoordinate,
        reason: String,
    },

    /// The descriptor subsystem itself is broken
    #[error("Descriptor subsystem failure: {reason}")]
    Subsystem { reason: String },
}

impl DescriptorError {
    /// Whether the failure concerns one artifact only.
    pub fn is_per_artifact(&self) -> bool {
        !matches!(self, DescriptorError::Subsystem { .. })
    }
}

/// Failure of a repository connector
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectorError {
    /// No transport for this repository; reported on every probe of the batch
    #[error("No connector available for repository {repository}: {message}")]
    Unavailable { repository: String, message: String },

    /// The connector infrastructure failed; aborts the checking pass
    #[error("Repository connector failure: {message}")]
    Subsystem { message: String },
}

/// A repository may not be accessed while offline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Repository {repository} is not available in offline mode")]
pub struct OfflineError {
    pub repository: String,
}

/// A version expression could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to resolve version of {artifact}: {message}")]
pub struct VersionError {
    pub artifact: ArtifactCoordinate,
    pub message: String,
}

/// Failure to move artifact content between repositories
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Artifact {artifact} is not available in any source repository")]
    NotFound { artifact: ArtifactCoordinate },

    #[error("Failed to transfer {artifact}: {message}")]
    Failed {
        artifact: ArtifactCoordinate,
        message: String,
    },

    #[error("Repository {repository} cannot be used for transfers: {message}")]
    UnsupportedRepository { repository: String, message: String },
}
