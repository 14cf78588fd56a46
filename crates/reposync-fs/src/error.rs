//! Error types for reposync-fs

use std::path::PathBuf;

use crate::scanner::ValidationError;

/// Result type for reposync-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in reposync-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A scanned file failed validation while scanning strictly
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Repository {id} is not a file repository: {url}")]
    NotAFileRepository { id: String, url: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
