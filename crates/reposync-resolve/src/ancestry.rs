//! Parent and import-BOM closure of POM artifacts

use std::collections::HashSet;

use tracing::{debug, info};

use reposync_model::{ArtifactCoordinate, IdentityKey, RemoteRepositoryRef};

use crate::Result;
use crate::provider::{DescriptorReader, ErrorPolicy};

/// Expands POMs into the closure of their parents and imported BOMs.
pub struct AncestryWalker<'a> {
    reader: &'a dyn DescriptorReader,
}

impl<'a> AncestryWalker<'a> {
    pub fn new(reader: &'a dyn DescriptorReader) -> Self {
        Self { reader }
    }

    /// Walk level by level from `poms` until no new POM turns up.
    ///
    /// Unreadable POMs and POMs without a model are dropped. A descriptor
    /// subsystem failure aborts the walk.
    pub fn walk_ancestry(
        &self,
        poms: &[ArtifactCoordinate],
        repositories: &[RemoteRepositoryRef],
    ) -> Result<Vec<ArtifactCoordinate>> {
        let mut visited: HashSet<IdentityKey> = HashSet::new();
        let mut recorded: HashSet<IdentityKey> = HashSet::new();
        let mut discovered = Vec::new();
        let mut frontier: Vec<ArtifactCoordinate> = poms.to_vec();

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for artifact in frontier {
                if !visited.insert(artifact.identity()) {
                    continue;
                }
                let Some(descriptor) =
                    self.reader
                        .read_descriptor(&artifact, repositories, ErrorPolicy::IgnorePerNode)?
                else {
                    continue;
                };
                let Some(model) = descriptor.model else {
                    debug!("No model attached to {}, dropping it", artifact);
                    continue;
                };

                if recorded.insert(descriptor.artifact.identity()) {
                    discovered.push(descriptor.artifact);
                }
                if let Some(parent) = &model.parent {
                    next.push(parent.pom());
                }
                next.extend(
                    model
                        .dependency_management
                        .iter()
                        .filter(|managed| managed.is_bom_import())
                        .map(|managed| managed.pom()),
                );
            }
            frontier = next;
        }

        info!(
            "Expanded {} POMs into {} with ancestry",
            poms.len(),
            discovered.len()
        );
        Ok(discovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::error::DescriptorError;
    use crate::provider::{ArtifactDescriptor, ModelDependency, ParentRef, ProjectModel};

    struct Models(HashMap<String, ProjectModel>);

    impl DescriptorReader for Models {
        fn read(
            &self,
            artifact: &ArtifactCoordinate,
            _repositories: &[RemoteRepositoryRef],
        ) -> std::result::Result<ArtifactDescriptor, DescriptorError> {
            if artifact.artifact_id == "broken" {
                return Err(DescriptorError::Subsystem {
                    reason: "model builder unavailable".to_string(),
                });
            }
            let model = self
                .0
                .get(&artifact.artifact_id)
                .cloned()
                .ok_or_else(|| DescriptorError::Missing {
                    artifact: artifact.clone(),
                })?;
            let mut descriptor = ArtifactDescriptor::new(artifact.clone());
            descriptor.model = Some(model);
            Ok(descriptor)
        }
    }

    fn parent(artifact_id: &str) -> Option<ParentRef> {
        Some(ParentRef {
            group_id: "org.example".to_string(),
            artifact_id: artifact_id.to_string(),
            version: "1".to_string(),
        })
    }

    fn pom(artifact_id: &str) -> ArtifactCoordinate {
        ArtifactCoordinate::pom("org.example", artifact_id, "1")
    }

    #[test]
    fn test_self_parent_terminates() {
        let reader = Models(HashMap::from([(
            "loop".to_string(),
            ProjectModel {
                parent: parent("loop"),
                dependency_management: Vec::new(),
            },
        )]));
        let walked = AncestryWalker::new(&reader)
            .walk_ancestry(&[pom("loop")], &[])
            .unwrap();
        assert_eq!(walked, vec![pom("loop")]);
    }

    #[test]
    fn test_missing_parent_is_dropped() {
        let reader = Models(HashMap::from([(
            "child".to_string(),
            ProjectModel {
                parent: parent("absent"),
                dependency_management: vec![ModelDependency::import("org.example", "gone", "1")],
            },
        )]));
        let walked = AncestryWalker::new(&reader)
            .walk_ancestry(&[pom("child")], &[])
            .unwrap();
        assert_eq!(walked, vec![pom("child")]);
    }

    #[test]
    fn test_subsystem_failure_aborts() {
        let reader = Models(HashMap::from([(
            "child".to_string(),
            ProjectModel {
                parent: parent("broken"),
                dependency_management: Vec::new(),
            },
        )]));
        let result = AncestryWalker::new(&reader).walk_ancestry(&[pom("child")], &[]);
        assert!(result.is_err());
    }
}
