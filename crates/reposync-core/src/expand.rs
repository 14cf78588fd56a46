//! Companion artifacts that travel with every synced artifact

use std::collections::HashSet;

use reposync_model::{ArtifactCoordinate, IdentityKey};

/// Which classified companions to add besides POMs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Companions {
    pub sources: bool,
    pub javadoc: bool,
}

/// Add each artifact's POM, the `classes` jar of a `war`, and the javadoc
/// and sources jars of non-POM artifacts when asked for.
///
/// Distinct by identity, in first-seen order.
pub fn expand_companions(
    artifacts: &[ArtifactCoordinate],
    companions: Companions,
) -> Vec<ArtifactCoordinate> {
    let mut seen: HashSet<IdentityKey> = HashSet::new();
    let mut expanded = Vec::new();
    let mut add = |artifact: ArtifactCoordinate| {
        if seen.insert(artifact.identity()) {
            expanded.push(artifact);
        }
    };

    for artifact in artifacts {
        add(artifact.clone());
        add(artifact.to_pom());
        if artifact.is_war() {
            add(artifact.to_classes());
        }
        if artifact.is_pom() {
            continue;
        }
        if companions.javadoc {
            add(artifact.to_javadoc());
        }
        if companions.sources {
            add(artifact.to_sources());
        }
    }
    expanded
}
