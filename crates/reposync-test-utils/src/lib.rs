//! Shared test utilities for the reposync workspace.
//!
//! This crate provides in-memory collaborators and on-disk repository
//! fixtures so crate test suites do not each grow their own. It is a
//! dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`doubles`]: in-memory connector, version resolver, descriptor reader,
//!   local cache and a recording transfer, with call counters for assertions
//! - [`layout`]: [`layout::TestLayout`] builder for temporary
//!   `group/artifact/version/file` trees

pub mod doubles;
pub mod layout;
