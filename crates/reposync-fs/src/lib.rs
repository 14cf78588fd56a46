//! Filesystem repositories for reposync
//!
//! Reads and writes the `group/artifact/version/file` layout used by
//! `file:` repositories and local caches.

pub mod checksum;
pub mod error;
pub mod io;
pub mod layout;
pub mod local;
pub mod repository;
pub mod scanner;
pub mod transfer;
pub mod version;

pub use error::{Error, Result};
pub use local::FileLocalCache;
pub use repository::{FileRepositoryConnector, FileVersionResolver};
pub use scanner::{ScanReport, ValidationError, scan_local_repository};
pub use transfer::FileTransfer;
pub use version::compare_versions;
