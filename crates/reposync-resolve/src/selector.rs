//! Dependency selectors
//!
//! A [`DependencySelector`] answers two questions while a graph is walked:
//! whether an edge is kept ([`DependencySelector::select`]) and which
//! selector applies to the children of that edge
//! ([`DependencySelector::derive`]). Deriving `None` stops the descent.
//!
//! The walk derives once for the root before its direct dependencies are
//! selected, so a selector created at depth 0 sees the root's direct
//! dependencies at depth 1.

use std::collections::BTreeSet;

use reposync_model::scope::NON_TRANSITIVE;
use reposync_model::{DependencyEdge, ExclusionPattern};

/// Context passed to [`DependencySelector::derive`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionContext<'a> {
    /// The edge whose children are about to be selected, `None` for a root
    /// given only as an artifact
    pub dependency: Option<&'a DependencyEdge>,
}

impl<'a> SelectionContext<'a> {
    pub fn new(dependency: Option<&'a DependencyEdge>) -> Self {
        Self { dependency }
    }
}

/// Closed set of selector variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencySelector {
    /// Keeps optional edges while `depth < 2`.
    Optional { depth: u32 },

    /// Keeps an edge iff its scope is in `included` (when non-empty) and not
    /// in `excluded` (when non-empty). The first derivation with an edge
    /// adds the non-transitive scopes to `excluded`.
    Scope {
        depth: u32,
        included: BTreeSet<String>,
        excluded: BTreeSet<String>,
    },

    /// Rejects edges matching any accumulated exclusion.
    Exclusion {
        exclusions: BTreeSet<ExclusionPattern>,
    },

    /// Conjunction of its members.
    And(Vec<DependencySelector>),
}

impl DependencySelector {
    pub fn optional(depth: u32) -> Self {
        DependencySelector::Optional { depth }
    }

    pub fn scope(
        depth: u32,
        included: impl IntoIterator<Item = String>,
        excluded: impl IntoIterator<Item = String>,
    ) -> Self {
        DependencySelector::Scope {
            depth,
            included: included.into_iter().collect(),
            excluded: excluded.into_iter().collect(),
        }
    }

    pub fn exclusion(exclusions: impl IntoIterator<Item = ExclusionPattern>) -> Self {
        DependencySelector::Exclusion {
            exclusions: exclusions.into_iter().collect(),
        }
    }

    /// Conjunction of `selectors`; repeated members are kept once.
    pub fn and(selectors: impl IntoIterator<Item = DependencySelector>) -> Self {
        DependencySelector::And(unique(selectors))
    }

    /// Whether `edge` is kept.
    pub fn select(&self, edge: &DependencyEdge) -> bool {
        match self {
            DependencySelector::Optional { depth } => *depth < 2 || !edge.optional,
            DependencySelector::Scope {
                included, excluded, ..
            } => {
                (included.is_empty() || included.contains(&edge.scope))
                    && (excluded.is_empty() || !excluded.contains(&edge.scope))
            }
            DependencySelector::Exclusion { exclusions } => {
                !exclusions.iter().any(|e| e.matches(&edge.artifact))
            }
            DependencySelector::And(selectors) => selectors.iter().all(|s| s.select(edge)),
        }
    }

    /// The selector for the children of `context.dependency`.
    pub fn derive(&self, context: &SelectionContext<'_>) -> Option<DependencySelector> {
        match self {
            DependencySelector::Optional { depth } => {
                if *depth > 1 {
                    Some(self.clone())
                } else {
                    Some(DependencySelector::Optional { depth: depth + 1 })
                }
            }
            DependencySelector::Scope {
                depth,
                included,
                excluded,
            } => {
                if *depth > 0 || context.dependency.is_none() {
                    return Some(self.clone());
                }
                let mut excluded = excluded.clone();
                excluded.extend(NON_TRANSITIVE.iter().map(|s| s.to_string()));
                Some(DependencySelector::Scope {
                    depth: depth + 1,
                    included: included.clone(),
                    excluded,
                })
            }
            DependencySelector::Exclusion { exclusions } => {
                let added: Vec<&ExclusionPattern> = context
                    .dependency
                    .map(|d| d.exclusions.iter().filter(|e| !exclusions.contains(e)).collect())
                    .unwrap_or_default();
                if added.is_empty() {
                    return Some(self.clone());
                }
                let mut exclusions = exclusions.clone();
                exclusions.extend(added.into_iter().cloned());
                Some(DependencySelector::Exclusion { exclusions })
            }
            DependencySelector::And(selectors) => {
                let mut derived = unique(selectors.iter().filter_map(|s| s.derive(context)));
                match derived.len() {
                    0 => None,
                    1 => derived.pop(),
                    _ => Some(DependencySelector::And(derived)),
                }
            }
        }
    }
}

fn unique(selectors: impl IntoIterator<Item = DependencySelector>) -> Vec<DependencySelector> {
    let mut members: Vec<DependencySelector> = Vec::new();
    for selector in selectors {
        if !members.contains(&selector) {
            members.push(selector);
        }
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reposync_model::ArtifactCoordinate;

    fn edge(artifact_id: &str, scope: &str) -> DependencyEdge {
        DependencyEdge::new(
            ArtifactCoordinate::new("org.example", artifact_id, "", "jar", "1.0"),
            scope,
        )
    }

    fn strings(scopes: &[&str]) -> Vec<String> {
        scopes.iter().map(|s| s.to_string()).collect()
    }

    fn root_context() -> SelectionContext<'static> {
        SelectionContext::default()
    }

    #[test]
    fn test_optional_kept_until_depth_two() {
        let optional = edge("opt", "compile").optional(true);
        let root = DependencySelector::optional(0);
        assert!(root.select(&optional));

        let parent = edge("parent", "compile");
        let ctx = SelectionContext::new(Some(&parent));
        let level1 = root.derive(&ctx).unwrap();
        assert!(level1.select(&optional));

        let level2 = level1.derive(&ctx).unwrap();
        assert!(!level2.select(&optional));
        assert!(level2.select(&parent));
    }

    #[test]
    fn test_optional_depth_is_capped() {
        let parent = edge("parent", "compile");
        let ctx = SelectionContext::new(Some(&parent));
        let deep = DependencySelector::optional(2);
        assert_eq!(deep.derive(&ctx), Some(DependencySelector::optional(2)));
    }

    #[test]
    fn test_scope_included_and_excluded() {
        let selector = DependencySelector::scope(0, strings(&["compile", "runtime"]), strings(&["runtime"]));
        assert!(selector.select(&edge("a", "compile")));
        assert!(!selector.select(&edge("a", "runtime")));
        assert!(!selector.select(&edge("a", "test")));
    }

    #[test]
    fn test_scope_empty_sets_keep_everything() {
        let selector = DependencySelector::scope(0, Vec::new(), Vec::new());
        assert!(selector.select(&edge("a", "test")));
        assert!(selector.select(&edge("a", "")));
    }

    #[test]
    fn test_scope_derivation_adds_non_transitive_once() {
        let selector = DependencySelector::scope(0, Vec::new(), strings(&["system"]));
        let parent = edge("parent", "compile");
        let ctx = SelectionContext::new(Some(&parent));

        let child = selector.derive(&ctx).unwrap();
        assert_eq!(
            child,
            DependencySelector::scope(1, Vec::new(), strings(&["provided", "system", "test"]))
        );
        assert!(!child.select(&edge("a", "test")));
        assert!(!child.select(&edge("a", "provided")));
        assert!(child.select(&edge("a", "runtime")));

        assert_eq!(child.derive(&ctx), Some(child.clone()));
    }

    #[test]
    fn test_scope_derivation_without_edge_is_identity() {
        let selector = DependencySelector::scope(0, Vec::new(), Vec::new());
        assert_eq!(selector.derive(&root_context()), Some(selector.clone()));
    }

    #[test]
    fn test_exclusions_accumulate_downwards() {
        let root = DependencySelector::exclusion(Vec::new());
        let excluded = edge("logging", "compile");
        assert!(root.select(&excluded));

        let parent = edge("parent", "compile")
            .with_exclusion(ExclusionPattern::new("org.example", "logging"));
        let child = root.derive(&SelectionContext::new(Some(&parent))).unwrap();
        assert!(!child.select(&excluded));

        let sibling = edge("sibling", "compile");
        let grandchild = child.derive(&SelectionContext::new(Some(&sibling))).unwrap();
        assert_eq!(grandchild, child);
        assert!(!grandchild.select(&excluded));

        // the root itself never picks up a child's exclusions
        assert!(root.select(&excluded));
    }

    #[test]
    fn test_and_short_circuits_on_rejection() {
        let selector = DependencySelector::and(vec![
            DependencySelector::scope(0, Vec::new(), strings(&["test"])),
            DependencySelector::exclusion(vec![ExclusionPattern::new("*", "banned")]),
        ]);
        assert!(selector.select(&edge("fine", "compile")));
        assert!(!selector.select(&edge("fine", "test")));
        assert!(!selector.select(&edge("banned", "compile")));
    }

    #[test]
    fn test_and_collapses_single_member() {
        let selector = DependencySelector::and(vec![
            DependencySelector::optional(2),
            DependencySelector::optional(2),
        ]);
        assert_eq!(selector, DependencySelector::And(vec![DependencySelector::optional(2)]));
        assert_eq!(
            selector.derive(&root_context()),
            Some(DependencySelector::optional(2))
        );
    }

    #[test]
    fn test_and_of_nothing_rejects_children() {
        let selector = DependencySelector::and(Vec::new());
        assert!(selector.select(&edge("a", "compile")));
        assert_eq!(selector.derive(&root_context()), None);
    }
}
