//! Sync orchestration for reposync
//!
//! This crate composes the engine pieces of `reposync-resolve` and the
//! filesystem backends of `reposync-fs` into a full repository sync:
//!
//! - **Configuration**: `reposync.toml` parsing and repository spec handling
//! - **Companion expansion**: POMs, `classes`, `sources` and `javadoc` jars
//! - **SyncEngine**: discover, diff, fetch and deploy
//! - **Reports**: counts and lists of what a run did, as JSON on request
//!
//! # Architecture
//!
//! ```text
//!                 reposync-cli
//!                      |
//!                reposync-core
//!                      |
//!        +-------------+-------------+
//!        |             |             |
//! reposync-model reposync-resolve reposync-fs
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod expand;
pub mod report;

pub use config::{CONFIG_FILE_NAME, SyncConfig, SyncMode};
pub use engine::{ReactorProject, SyncBackend, SyncEngine, SyncOptions, SyncSource};
pub use error::{Error, Result};
pub use expand::{Companions, expand_companions};
pub use report::SyncReport;
