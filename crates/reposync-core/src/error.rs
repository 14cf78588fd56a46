//! Error types for reposync-core

use std::path::PathBuf;

use reposync_model::ArtifactCoordinate;
use reposync_resolve::FailureCause;

/// Result type for reposync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running a sync
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Configuration not found at {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    /// Configuration values that do not fit together
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// No source repository was configured
    #[error("No source repositories set, specify at least one as id::layout::url")]
    NoSourceRepositories,

    /// Local sync only reads `file:` repositories
    #[error(
        "Repository with id '{id}' has unsupported protocol '{protocol}'. All repositories must have 'file' protocol."
    )]
    UnsupportedProtocol { id: String, protocol: String },

    /// BOM sync was given something other than a POM
    #[error("Not a pom artifact: {artifact}")]
    NotAPom { artifact: ArtifactCoordinate },

    /// The mode needs project models and no descriptor reader is plugged in
    #[error("{mode} sync needs a descriptor reader")]
    DescriptorReaderRequired { mode: &'static str },

    /// An artifact failed for a reason other than being absent
    #[error("Failed to {stage}: {cause}")]
    Resolution {
        stage: &'static str,
        cause: FailureCause,
    },

    // Transparent wrappers for underlying crate errors
    /// Coordinate or repository spec error from reposync-model
    #[error(transparent)]
    Model(#[from] reposync_model::Error),

    /// Collection or checking error from reposync-resolve
    #[error(transparent)]
    Resolve(#[from] reposync_resolve::Error),

    /// Fetch or deploy error
    #[error(transparent)]
    Transfer(#[from] reposync_resolve::TransferError),

    /// Scanning or filesystem error from reposync-fs
    #[error(transparent)]
    Fs(#[from] reposync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
