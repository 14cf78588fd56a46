//! Graph collection
//!
//! [`GraphCollector`] builds the standard selector chain for a depth and a
//! scope threshold, asks a [`DependencyGraphProvider`] for the tree and
//! flattens it into a deduplicated list ordered by first visit.

use std::collections::HashSet;

use tracing::{debug, info};

use reposync_model::{ArtifactCoordinate, DependencyEdge, IdentityKey, RemoteRepositoryRef, negate};

use crate::Result;
use crate::provider::{DependencyGraphProvider, ErrorPolicy};
use crate::selector::DependencySelector;

/// What to expand: a root plus direct and managed dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectRequest {
    /// Root edge; its descriptor contributes further direct dependencies
    pub root: Option<DependencyEdge>,
    /// Root artifact when there is no root edge, e.g. a project being built
    pub root_artifact: Option<ArtifactCoordinate>,
    pub dependencies: Vec<DependencyEdge>,
    /// Version and scope pins applied to transitive dependencies
    pub managed_dependencies: Vec<DependencyEdge>,
    pub repositories: Vec<RemoteRepositoryRef>,
}

impl CollectRequest {
    pub fn for_root(root: DependencyEdge, repositories: Vec<RemoteRepositoryRef>) -> Self {
        Self {
            root: Some(root),
            repositories,
            ..Self::default()
        }
    }

    pub fn for_root_artifact(
        artifact: ArtifactCoordinate,
        repositories: Vec<RemoteRepositoryRef>,
    ) -> Self {
        Self {
            root_artifact: Some(artifact),
            repositories,
            ..Self::default()
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<DependencyEdge>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_managed(mut self, managed: Vec<DependencyEdge>) -> Self {
        self.managed_dependencies = managed;
        self
    }

    /// The root artifact, from the root edge or the explicit artifact.
    pub fn root_coordinate(&self) -> Option<&ArtifactCoordinate> {
        self.root
            .as_ref()
            .map(|edge| &edge.artifact)
            .or(self.root_artifact.as_ref())
    }
}

/// A node of a collected dependency tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    /// The edge leading here, `None` for a root given as an artifact
    pub dependency: Option<DependencyEdge>,
    pub artifact: Option<ArtifactCoordinate>,
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    pub fn root(artifact: Option<ArtifactCoordinate>, dependency: Option<DependencyEdge>) -> Self {
        Self {
            dependency,
            artifact,
            children: Vec::new(),
        }
    }

    pub fn leaf(edge: DependencyEdge) -> Self {
        Self {
            artifact: Some(edge.artifact.clone()),
            dependency: Some(edge),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<DependencyNode>) -> Self {
        self.children = children;
        self
    }
}

/// Input of [`GraphCollector::collect_graph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRequest {
    pub collect: CollectRequest,
    /// Starting depth of the optional and scope selectors
    pub depth: u32,
    /// Scope threshold, e.g. `compile+runtime`
    pub scope: String,
}

/// Collects and flattens dependency graphs.
pub struct GraphCollector<'a> {
    provider: &'a dyn DependencyGraphProvider,
}

impl<'a> GraphCollector<'a> {
    pub fn new(provider: &'a dyn DependencyGraphProvider) -> Self {
        Self { provider }
    }

    /// `Optional(depth) + Scope(depth, excluded = negate(scope)) + Exclusion()`
    pub fn selector(depth: u32, scope: &str) -> DependencySelector {
        DependencySelector::and(vec![
            DependencySelector::optional(depth),
            DependencySelector::scope(depth, Vec::new(), negate(scope)),
            DependencySelector::exclusion(Vec::new()),
        ])
    }

    /// Collect the graph of `request` and return its distinct artifacts.
    ///
    /// Descriptor failures of individual nodes are ignored; only a failure
    /// of the collection itself is returned.
    pub fn collect_graph(&self, request: &GraphRequest) -> Result<Vec<ArtifactCoordinate>> {
        let selector = Self::selector(request.depth, &request.scope);
        debug!(
            "Collecting dependencies of {:?} at depth {} with scope {}",
            request.collect.root_coordinate().map(|a| a.to_string()),
            request.depth,
            request.scope
        );
        let root = self
            .provider
            .collect(&request.collect, &selector, ErrorPolicy::IgnorePerNode)?;
        let artifacts = flatten(&root);
        info!("Collected {} artifacts", artifacts.len());
        Ok(artifacts)
    }
}

/// Flatten a tree into distinct artifacts, in pre-order of first visit.
///
/// A subtree below an already visited artifact is not walked again. The root
/// artifact is appended last unless it was already seen.
pub fn flatten(root: &DependencyNode) -> Vec<ArtifactCoordinate> {
    let mut seen: HashSet<IdentityKey> = HashSet::new();
    let mut artifacts = Vec::new();
    for child in &root.children {
        visit(child, &mut seen, &mut artifacts);
    }
    if let Some(artifact) = &root.artifact
        && seen.insert(artifact.identity())
    {
        artifacts.push(artifact.clone());
    }
    artifacts
}

fn visit(
    node: &DependencyNode,
    seen: &mut HashSet<IdentityKey>,
    artifacts: &mut Vec<ArtifactCoordinate>,
) {
    let Some(artifact) = &node.artifact else {
        return;
    };
    if !seen.insert(artifact.identity()) {
        return;
    }
    artifacts.push(artifact.clone());
    for child in &node.children {
        visit(child, seen, artifacts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn coordinate(artifact_id: &str) -> ArtifactCoordinate {
        ArtifactCoordinate::new("org.example", artifact_id, "", "jar", "1.0")
    }

    fn node(artifact_id: &str, children: Vec<DependencyNode>) -> DependencyNode {
        DependencyNode::leaf(DependencyEdge::new(coordinate(artifact_id), "compile"))
            .with_children(children)
    }

    #[test]
    fn test_flatten_orders_by_first_visit_and_appends_root() {
        let root = DependencyNode::root(Some(coordinate("root")), None).with_children(vec![
            node("a", vec![node("c", vec![])]),
            node("b", vec![node("c", vec![]), node("d", vec![])]),
        ]);
        let ids: Vec<String> = flatten(&root)
            .into_iter()
            .map(|a| a.artifact_id)
            .collect();
        assert_eq!(ids, vec!["a", "c", "b", "d", "root"]);
    }

    #[test]
    fn test_flatten_keeps_root_once_when_revisited() {
        let root = DependencyNode::root(Some(coordinate("root")), None)
            .with_children(vec![node("a", vec![node("root", vec![])])]);
        let ids: Vec<String> = flatten(&root)
            .into_iter()
            .map(|a| a.artifact_id)
            .collect();
        assert_eq!(ids, vec!["a", "root"]);
    }

    #[test]
    fn test_flatten_without_root_artifact() {
        let root = DependencyNode::root(None, None).with_children(vec![node("a", vec![])]);
        assert_eq!(flatten(&root), vec![coordinate("a")]);
    }

    #[test]
    fn test_standard_selector_shape() {
        let selector = GraphCollector::selector(0, "compile+runtime");
        let DependencySelector::And(members) = selector else {
            panic!("expected a conjunction");
        };
        assert_eq!(members.len(), 3);
        assert_eq!(members[0], DependencySelector::optional(0));
        assert_eq!(
            members[1],
            DependencySelector::scope(0, Vec::new(), vec!["test".to_string()])
        );
    }

    #[test]
    fn test_root_coordinate_prefers_edge() {
        let edge = DependencyEdge::new(coordinate("edge"), "");
        let request = CollectRequest {
            root: Some(edge),
            root_artifact: Some(coordinate("artifact")),
            ..CollectRequest::default()
        };
        assert_eq!(request.root_coordinate(), Some(&coordinate("edge")));
    }
}
