//! Command implementations for reposync-cli

pub mod check;
pub mod scan;
pub mod sync;

pub use check::run_check;
pub use scan::run_scan;
pub use sync::{SyncArgs, run_sync};
