//! Dependency edges and exclusion patterns

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::coordinate::ArtifactCoordinate;

/// Wildcard accepted by every [`ExclusionPattern`] field
pub const WILDCARD: &str = "*";

/// A pattern removing matching artifacts from a subtree.
///
/// Each field must equal the artifact's field or be `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExclusionPattern {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default = "wildcard")]
    pub classifier: String,
    #[serde(default = "wildcard")]
    pub extension: String,
}

fn wildcard() -> String {
    WILDCARD.to_string()
}

impl ExclusionPattern {
    /// Exclude every classifier and extension of `group_id:artifact_id`.
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            classifier: wildcard(),
            extension: wildcard(),
        }
    }

    pub fn matches(&self, artifact: &ArtifactCoordinate) -> bool {
        field_matches(&self.artifact_id, &artifact.artifact_id)
            && field_matches(&self.group_id, &artifact.group_id)
            && field_matches(&self.extension, &artifact.extension)
            && field_matches(&self.classifier, &artifact.classifier)
    }
}

fn field_matches(pattern: &str, value: &str) -> bool {
    pattern == WILDCARD || pattern == value
}

/// One edge of a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub artifact: ArtifactCoordinate,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub exclusions: BTreeSet<ExclusionPattern>,
}

impl DependencyEdge {
    pub fn new(artifact: ArtifactCoordinate, scope: impl Into<String>) -> Self {
        Self {
            artifact,
            scope: scope.into(),
            optional: false,
            exclusions: BTreeSet::new(),
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_exclusion(mut self, exclusion: ExclusionPattern) -> Self {
        self.exclusions.insert(exclusion);
        self
    }

    /// Return a copy pointing at a different artifact version.
    pub fn with_version(&self, version: &str) -> Self {
        Self {
            artifact: self.artifact.with_version(version),
            ..self.clone()
        }
    }
}
