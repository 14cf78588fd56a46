//! Error types for reposync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from reposync-core
    #[error(transparent)]
    Core(#[from] reposync_core::Error),

    /// Error from reposync-fs
    #[error(transparent)]
    Fs(#[from] reposync_fs::Error),

    /// Invalid coordinate or repository spec
    #[error(transparent)]
    Model(#[from] reposync_model::Error),

    /// Existence check failure
    #[error(transparent)]
    Resolve(#[from] reposync_resolve::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
