//! Descriptor-driven dependency graph expansion
//!
//! [`DescriptorGraphProvider`] implements [`DependencyGraphProvider`] on top
//! of any [`DescriptorReader`]: every kept edge has its descriptor read and
//! its declared dependencies become the children of the node.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use reposync_model::{
    ArtifactCoordinate, DependencyEdge, IdentityKey, KindKey, RemoteRepositoryRef,
};

use crate::collector::{CollectRequest, DependencyNode};
use crate::error::{Error, Result};
use crate::provider::{ArtifactDescriptor, DependencyGraphProvider, DescriptorReader, ErrorPolicy};
use crate::selector::{DependencySelector, SelectionContext};

/// Management applies from this depth on; direct dependencies keep what
/// they declare.
const MANAGED_FROM_DEPTH: u32 = 2;

/// Expands graphs by reading one descriptor per visited artifact.
pub struct DescriptorGraphProvider<'a> {
    reader: &'a dyn DescriptorReader,
}

impl<'a> DescriptorGraphProvider<'a> {
    pub fn new(reader: &'a dyn DescriptorReader) -> Self {
        Self { reader }
    }
}

impl DependencyGraphProvider for DescriptorGraphProvider<'_> {
    fn collect(
        &self,
        request: &CollectRequest,
        selector: &DependencySelector,
        policy: ErrorPolicy,
    ) -> Result<DependencyNode> {
        if let Some(root) = request.root_coordinate() {
            validate_root(root)?;
        }

        let mut walk = Walk {
            reader: self.reader,
            repositories: &request.repositories,
            policy,
            managed: HashMap::new(),
            descriptors: HashMap::new(),
            expanded: HashSet::new(),
            path: Vec::new(),
        };
        walk.manage(&request.managed_dependencies);

        let mut dependencies = request.dependencies.clone();
        let mut root_artifact = request.root_artifact.clone();

        if let Some(edge) = &request.root {
            root_artifact = Some(edge.artifact.clone());
            if let Some(descriptor) = walk.descriptor(&edge.artifact)? {
                root_artifact = Some(descriptor.artifact.clone());
                walk.manage(&descriptor.managed_dependencies);
                merge_dependencies(&mut dependencies, &descriptor.dependencies);
            }
        }

        let mut root = DependencyNode::root(root_artifact.clone(), request.root.clone());
        let Some(child_selector) = selector.derive(&SelectionContext::new(request.root.as_ref()))
        else {
            debug!("Selector rejects every dependency of the root");
            return Ok(root);
        };

        if let Some(artifact) = &root_artifact {
            walk.path.push(artifact.identity());
        }
        root.children = walk.expand(&dependencies, &child_selector, 1)?;
        Ok(root)
    }
}

fn validate_root(root: &ArtifactCoordinate) -> Result<()> {
    if root.group_id.is_empty() || root.artifact_id.is_empty() || root.version.is_empty() {
        return Err(Error::Collection {
            message: format!("Invalid root artifact {}", root),
        });
    }
    Ok(())
}

/// Declared dependencies are added after the explicit ones unless an
/// explicit dependency already covers the same artifact kind.
fn merge_dependencies(dependencies: &mut Vec<DependencyEdge>, declared: &[DependencyEdge]) {
    for edge in declared {
        let kind = edge.artifact.kind();
        if !dependencies.iter().any(|d| d.artifact.kind() == kind) {
            dependencies.push(edge.clone());
        }
    }
}

#[derive(Debug, Clone)]
struct ManagedEntry {
    version: String,
    scope: String,
}

/// State of one collection call.
struct Walk<'a> {
    reader: &'a dyn DescriptorReader,
    repositories: &'a [RemoteRepositoryRef],
    policy: ErrorPolicy,
    managed: HashMap<KindKey, ManagedEntry>,
    /// `None` records a descriptor that was skipped under the policy
    descriptors: HashMap<IdentityKey, Option<ArtifactDescriptor>>,
    /// Subtrees already built, keyed by the selector their children saw.
    /// A second visit yields a leaf; flattening already has its subtree.
    expanded: HashSet<(IdentityKey, DependencySelector)>,
    /// Identities from the root down to the node being expanded
    path: Vec<IdentityKey>,
}

impl Walk<'_> {
    /// Register managed entries; the first entry for a kind wins.
    fn manage(&mut self, managed: &[DependencyEdge]) {
        for edge in managed {
            self.managed
                .entry(edge.artifact.kind())
                .or_insert_with(|| ManagedEntry {
                    version: edge.artifact.version.clone(),
                    scope: edge.scope.clone(),
                });
        }
    }

    fn apply_management(&self, edge: &DependencyEdge, depth: u32) -> DependencyEdge {
        if depth < MANAGED_FROM_DEPTH {
            return edge.clone();
        }
        let Some(entry) = self.managed.get(&edge.artifact.kind()) else {
            return edge.clone();
        };
        let mut managed = if entry.version.is_empty() {
            edge.clone()
        } else {
            edge.with_version(&entry.version)
        };
        if !entry.scope.is_empty() {
            managed.scope = entry.scope.clone();
        }
        managed
    }

    fn descriptor(&mut self, artifact: &ArtifactCoordinate) -> Result<Option<ArtifactDescriptor>> {
        let key = artifact.identity();
        if let Some(cached) = self.descriptors.get(&key) {
            return Ok(cached.clone());
        }
        let descriptor = self
            .reader
            .read_descriptor(artifact, self.repositories, self.policy)?;
        self.descriptors.insert(key, descriptor.clone());
        Ok(descriptor)
    }

    /// Build the nodes for `edges`, which sit at `depth` below the root.
    fn expand(
        &mut self,
        edges: &[DependencyEdge],
        selector: &DependencySelector,
        depth: u32,
    ) -> Result<Vec<DependencyNode>> {
        let mut nodes = Vec::new();
        for declared in edges {
            let edge = self.apply_management(declared, depth);
            if !selector.select(&edge) {
                trace!("Rejected {} ({}) at depth {}", edge.artifact, edge.scope, depth);
                continue;
            }

            let mut node = DependencyNode::leaf(edge.clone());
            let identity = edge.artifact.identity();
            if self.path.contains(&identity) {
                debug!("Cycle at {}, not descending", edge.artifact);
                nodes.push(node);
                continue;
            }

            let Some(child_selector) = selector.derive(&SelectionContext::new(Some(&edge))) else {
                nodes.push(node);
                continue;
            };

            let Some(descriptor) = self.descriptor(&edge.artifact)? else {
                nodes.push(node);
                continue;
            };
            node.artifact = Some(descriptor.artifact.clone());

            if !self.expanded.insert((identity.clone(), child_selector.clone())) {
                trace!("{} already expanded, not descending", edge.artifact);
                nodes.push(node);
                continue;
            }
            self.path.push(identity);
            let children = self.expand(&descriptor.dependencies, &child_selector, depth + 1);
            self.path.pop();
            node.children = children?;
            nodes.push(node);
        }
        Ok(nodes)
    }
}
