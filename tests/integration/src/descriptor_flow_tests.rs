//! Descriptor-driven syncs over `file:` repositories
//!
//! Project models come from an in-memory reader. Existence checks, fetches
//! and deployments go through the filesystem backends.

use pretty_assertions::assert_eq;

use reposync_core::{SyncBackend, SyncEngine, SyncOptions, SyncSource};
use reposync_fs::{FileRepositoryConnector, FileTransfer, FileVersionResolver};
use reposync_model::{ArtifactCoordinate, DependencyEdge};
use reposync_resolve::{ArtifactDescriptor, ParentRef, ProjectModel};
use reposync_test_utils::doubles::InMemoryDescriptorReader;
use reposync_test_utils::layout::TestLayout;

fn jar(artifact_id: &str) -> ArtifactCoordinate {
    ArtifactCoordinate::new("com.acme", artifact_id, "", "jar", "1.0")
}

fn pom(artifact_id: &str) -> ArtifactCoordinate {
    ArtifactCoordinate::pom("com.acme", artifact_id, "1.0")
}

fn dep(artifact_id: &str, scope: &str) -> DependencyEdge {
    DependencyEdge::new(jar(artifact_id), scope)
}

fn names(artifacts: &[ArtifactCoordinate]) -> Vec<String> {
    artifacts.iter().map(ToString::to_string).collect()
}

/// A source layout holding the jar and POM of every module.
fn source_with(modules: &[&str]) -> TestLayout {
    let layout = TestLayout::new();
    for module in modules {
        layout.add(&jar(module));
        layout.add(&pom(module));
    }
    layout
}

#[test]
fn test_single_sync_brings_dependencies_and_parent_poms() {
    let source = source_with(&["widget", "lib", "junit"]);
    source.add(&pom("acme-parent"));
    let target = TestLayout::new();
    let reader = InMemoryDescriptorReader::new()
        .with_dependencies(&jar("widget"), vec![dep("lib", "compile"), dep("junit", "test")])
        .with_dependencies(&jar("lib"), Vec::new())
        .with_model(
            &pom("widget"),
            ProjectModel {
                parent: Some(ParentRef {
                    group_id: "com.acme".to_string(),
                    artifact_id: "acme-parent".to_string(),
                    version: "1.0".to_string(),
                }),
                dependency_management: Vec::new(),
            },
        )
        .with_model(&pom("lib"), ProjectModel::default())
        .with_model(&pom("acme-parent"), ProjectModel::default());

    let versions = FileVersionResolver::new();
    let connector = FileRepositoryConnector::new();
    let transfer = FileTransfer::new();
    let engine = SyncEngine::new(
        SyncOptions::new(vec![source.repository("src")], target.repository("dst")),
        SyncBackend::new(&versions, &connector, &transfer, &transfer).with_descriptors(&reader),
    );

    let report = engine
        .run(&SyncSource::Single {
            artifact: jar("widget"),
            transitive: true,
        })
        .unwrap();

    assert_eq!(
        names(&report.deployed),
        vec![
            "com.acme:acme-parent:pom:1.0",
            "com.acme:lib:jar:1.0",
            "com.acme:lib:pom:1.0",
            "com.acme:widget:jar:1.0",
            "com.acme:widget:pom:1.0",
        ]
    );
    target.assert_artifact_exists(&pom("acme-parent"));
    target.assert_artifact_missing(&jar("junit"));
}

#[test]
fn test_bom_sync_deploys_managed_dependencies() {
    let source = source_with(&["lib", "core", "api", "tool"]);
    source.add(&pom("platform"));
    let target = TestLayout::new();
    target.add(&jar("api"));
    target.add(&pom("api"));

    let mut platform = ArtifactDescriptor::new(pom("platform"));
    platform.managed_dependencies = vec![
        dep("lib", "compile"),
        dep("tool", "test"),
        dep("api", "compile"),
    ];
    platform.model = Some(ProjectModel::default());
    let reader = InMemoryDescriptorReader::new()
        .with_descriptor(platform)
        .with_dependencies(&jar("lib"), vec![dep("core", "compile")])
        .with_model(&pom("lib"), ProjectModel::default())
        .with_model(&pom("core"), ProjectModel::default())
        .with_model(&pom("api"), ProjectModel::default());

    let versions = FileVersionResolver::new();
    let connector = FileRepositoryConnector::new();
    let transfer = FileTransfer::new();
    let engine = SyncEngine::new(
        SyncOptions::new(vec![source.repository("src")], target.repository("dst")),
        SyncBackend::new(&versions, &connector, &transfer, &transfer).with_descriptors(&reader),
    );

    let report = engine
        .run(&SyncSource::Bom {
            artifact: pom("platform"),
            transitive: true,
        })
        .unwrap();

    assert_eq!(
        names(&report.discovered),
        vec![
            "com.acme:api:jar:1.0",
            "com.acme:api:pom:1.0",
            "com.acme:core:jar:1.0",
            "com.acme:core:pom:1.0",
            "com.acme:lib:jar:1.0",
            "com.acme:lib:pom:1.0",
            "com.acme:platform:pom:1.0",
        ]
    );
    // api was already in the target and tool is test-scoped
    assert_eq!(report.deployed.len(), 5);
    target.assert_artifact_exists(&pom("platform"));
    target.assert_artifact_missing(&jar("tool"));
}
