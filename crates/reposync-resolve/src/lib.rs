//! Artifact graph resolution and repository reconciliation for reposync.
//!
//! This crate provides the engine that decides which artifacts belong
//! together and whether a repository already holds them:
//!
//! - **Selectors**: [`DependencySelector`] prunes graph edges by optionality,
//!   scope and exclusions, rewriting itself per depth
//! - **Graph collection**: [`GraphCollector`] walks a dependency graph through a
//!   [`DependencyGraphProvider`] and flattens it into a deduplicated list
//! - **Existence checks**: [`RepositoryChecker`] batches existence probes per
//!   physical repository and returns one [`ResolutionOutcome`] per request
//! - **Ancestry**: [`AncestryWalker`] expands POMs into the closure of their
//!   parents and imported BOMs
//!
//! Network transport, descriptor parsing, version metadata and content
//! transfer are supplied by the caller through the traits in [`provider`].

pub mod ancestry;
pub mod checker;
pub mod collector;
pub mod error;
pub mod graph;
pub mod outcome;
pub mod provider;
pub mod selector;

pub use ancestry::AncestryWalker;
pub use checker::RepositoryChecker;
pub use collector::{CollectRequest, DependencyNode, GraphCollector, GraphRequest, flatten};
pub use error::{
    ConnectorError, DescriptorError, Error, OfflineError, Result, TransferError, VersionError,
};
pub use graph::DescriptorGraphProvider;
pub use outcome::{FailureCause, ResolutionOutcome, ResolutionRequest};
pub use provider::{
    ArtifactDeployer, ArtifactDescriptor, ArtifactFetcher, DependencyGraphProvider,
    DescriptorReader, ErrorPolicy, ExistenceProbe, FetchedArtifact, LocalCache, LocalLookup,
    ModelDependency, ParentRef, ProjectModel, RepositoryConnector, VersionResolution,
    VersionResolver,
};
pub use selector::{DependencySelector, SelectionContext};
