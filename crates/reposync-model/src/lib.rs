//! Artifact model for reposync.
//!
//! This crate holds the value types shared by every other reposync crate:
//!
//! - [`ArtifactCoordinate`] and its [`IdentityKey`] used for deduplication
//! - [`DependencyEdge`] and [`ExclusionPattern`] describing graph edges
//! - [`RemoteRepositoryRef`] with its policies and the `id::layout::url` syntax
//! - the scope threshold negation table in [`scope`]

pub mod coordinate;
pub mod dependency;
pub mod error;
pub mod repository;
pub mod scope;

pub use coordinate::{ArtifactCoordinate, IdentityKey, KindKey, dedup_by_identity};
pub use dependency::{DependencyEdge, ExclusionPattern};
pub use error::{Error, Result};
pub use repository::{
    ArtifactRepository, ChecksumPolicy, LocalRepositoryRef, RemoteRepositoryRef, RepositoryPolicy,
    UpdatePolicy,
};
pub use scope::{DEFAULT_SCOPE_THRESHOLD, negate, negate_all};
