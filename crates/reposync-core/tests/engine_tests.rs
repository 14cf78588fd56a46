//! Tests for the sync engine against in-memory collaborators

use pretty_assertions::assert_eq;
use reposync_core::{Error, ReactorProject, SyncBackend, SyncEngine, SyncOptions, SyncSource};
use reposync_model::{ArtifactCoordinate, DependencyEdge, RemoteRepositoryRef};
use reposync_resolve::{ArtifactDescriptor, ParentRef, ProjectModel};
use reposync_test_utils::doubles::{
    InMemoryConnector, InMemoryDescriptorReader, RecordingTransfer, StaticVersionResolver,
};
use reposync_test_utils::layout::TestLayout;

fn source() -> RemoteRepositoryRef {
    RemoteRepositoryRef::new("central", "https://repo.example.com/maven2")
}

fn target() -> RemoteRepositoryRef {
    RemoteRepositoryRef::new("corp", "https://corp.example.com/releases")
}

fn options() -> SyncOptions {
    SyncOptions::new(vec![source()], target())
}

fn coordinate(s: &str) -> ArtifactCoordinate {
    s.parse().unwrap()
}

fn widget() -> ArtifactCoordinate {
    coordinate("com.acme:widget:1.0")
}

fn names(artifacts: &[ArtifactCoordinate]) -> Vec<String> {
    artifacts.iter().map(ToString::to_string).collect()
}

fn single(artifact: ArtifactCoordinate, transitive: bool) -> SyncSource {
    SyncSource::Single {
        artifact,
        transitive,
    }
}

mod run_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_artifacts_are_fetched_and_deployed() {
        let connector = InMemoryConnector::new()
            .with_artifact(&source(), &widget())
            .with_artifact(&source(), &widget().to_pom());
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        let report = engine.run(&single(widget(), false)).unwrap();

        let expected = vec!["com.acme:widget:jar:1.0", "com.acme:widget:pom:1.0"];
        assert_eq!(names(&report.discovered), expected);
        assert_eq!(names(&report.missing), expected);
        assert_eq!(names(&report.deployed), expected);
        assert_eq!(names(&transfer.deployed_to("corp")), expected);
    }

    #[test]
    fn test_artifacts_in_target_are_not_deployed() {
        let connector = InMemoryConnector::new()
            .with_artifact(&source(), &widget())
            .with_artifact(&source(), &widget().to_pom())
            .with_artifact(&target(), &widget());
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        let report = engine.run(&single(widget(), false)).unwrap();

        assert_eq!(names(&report.missing), vec!["com.acme:widget:pom:1.0"]);
        assert_eq!(transfer.fetched(), vec![widget().to_pom()]);
    }

    #[test]
    fn test_absent_companions_are_dropped() {
        let connector = InMemoryConnector::new()
            .with_artifact(&source(), &widget())
            .with_artifact(&source(), &widget().to_pom())
            .with_artifact(&source(), &widget().to_sources());
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let mut options = options();
        options.sync_sources = true;
        options.sync_javadoc = true;
        let engine = SyncEngine::new(
            options,
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        let discovered = engine.discover(&single(widget(), false)).unwrap();

        assert_eq!(
            names(&discovered),
            vec![
                "com.acme:widget:jar:1.0",
                "com.acme:widget:jar:sources:1.0",
                "com.acme:widget:pom:1.0",
            ]
        );
    }

    #[test]
    fn test_nothing_discovered_ends_the_run() {
        let connector = InMemoryConnector::new();
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        let report = engine.run(&single(widget(), false)).unwrap();

        assert!(report.discovered.is_empty());
        assert!(report.nothing_to_sync());
        assert_eq!(connector.batches(&target()), 0);
        assert_eq!(transfer.deploy_count(), 0);
    }

    #[test]
    fn test_nothing_missing_ends_the_run() {
        let connector = InMemoryConnector::new()
            .with_artifact(&source(), &widget())
            .with_artifact(&target(), &widget())
            .with_artifact(&target(), &widget().to_pom());
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        let report = engine.run(&single(widget(), false)).unwrap();

        assert_eq!(report.discovered, vec![widget()]);
        assert!(report.nothing_to_sync());
        assert!(transfer.fetched().is_empty());
    }

    #[test]
    fn test_dry_run_stops_after_the_diff() {
        let connector = InMemoryConnector::new().with_artifact(&source(), &widget());
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let mut options = options();
        options.dry_run = true;
        let engine = SyncEngine::new(
            options,
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        let report = engine.run(&single(widget(), false)).unwrap();

        assert!(report.dry_run);
        assert_eq!(report.missing, vec![widget()]);
        assert!(report.deployed.is_empty());
        assert!(transfer.fetched().is_empty());
    }

    #[test]
    fn test_no_sources() {
        let connector = InMemoryConnector::new();
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            SyncOptions::new(Vec::new(), target()),
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        assert!(matches!(
            engine.run(&single(widget(), false)),
            Err(Error::NoSourceRepositories)
        ));
    }

    #[test]
    fn test_list_shares_candidates() {
        let gadget = coordinate("com.acme:gadget:2.0");
        let connector = InMemoryConnector::new()
            .with_artifact(&source(), &widget())
            .with_artifact(&source(), &gadget);
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        let discovered = engine
            .discover(&SyncSource::List {
                artifacts: vec![widget(), gadget.clone(), widget()],
                transitive: false,
            })
            .unwrap();

        assert_eq!(discovered, vec![gadget, widget()]);
    }
}

mod failure_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unreachable_target_aborts() {
        let connector = InMemoryConnector::new()
            .with_artifact(&source(), &widget())
            .unavailable(&target());
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        let result = engine.run(&single(widget(), false));

        assert!(matches!(
            result,
            Err(Error::Resolution {
                stage: "get missing artifacts",
                ..
            })
        ));
        assert_eq!(transfer.deploy_count(), 0);
    }

    #[test]
    fn test_unresolvable_version_aborts_discovery() {
        let connector = InMemoryConnector::new();
        let versions = StaticVersionResolver::new().failing(&widget());
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        let result = engine.discover(&single(widget(), false));

        assert!(matches!(
            result,
            Err(Error::Resolution {
                stage: "resolve source artifacts",
                ..
            })
        ));
    }

    #[test]
    fn test_failed_fetch_deploys_nothing() {
        let connector = InMemoryConnector::new()
            .with_artifact(&source(), &widget())
            .with_artifact(&source(), &widget().to_pom());
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new().unfetchable(&widget().to_pom());
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        assert!(matches!(
            engine.run(&single(widget(), false)),
            Err(Error::Transfer(_))
        ));
        assert_eq!(transfer.deploy_count(), 0);
    }

    #[test]
    fn test_transitive_sync_needs_a_reader() {
        let connector = InMemoryConnector::new();
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        assert!(matches!(
            engine.discover(&single(widget(), true)),
            Err(Error::DescriptorReaderRequired { mode: "single" })
        ));
    }
}

mod descriptor_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn jar(artifact_id: &str) -> ArtifactCoordinate {
        ArtifactCoordinate::new("com.acme", artifact_id, "", "jar", "1.0")
    }

    fn pom(artifact_id: &str) -> ArtifactCoordinate {
        ArtifactCoordinate::pom("com.acme", artifact_id, "1.0")
    }

    fn dep(artifact_id: &str, scope: &str) -> DependencyEdge {
        DependencyEdge::new(jar(artifact_id), scope)
    }

    fn parent(artifact_id: &str) -> ProjectModel {
        ProjectModel {
            parent: Some(ParentRef {
                group_id: "com.acme".to_string(),
                artifact_id: artifact_id.to_string(),
                version: "1.0".to_string(),
            }),
            dependency_management: Vec::new(),
        }
    }

    #[test]
    fn test_single_transitive_walks_dependencies_and_parents() {
        let reader = InMemoryDescriptorReader::new()
            .with_dependencies(&jar("widget"), vec![dep("lib", "compile"), dep("junit", "test")])
            .with_dependencies(&jar("lib"), Vec::new())
            .with_model(&pom("widget"), parent("acme-parent"))
            .with_model(&pom("lib"), ProjectModel::default())
            .with_model(&pom("acme-parent"), ProjectModel::default());
        let connector = InMemoryConnector::new()
            .with_artifact(&source(), &jar("widget"))
            .with_artifact(&source(), &jar("lib"))
            .with_artifact(&source(), &jar("junit"));
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer).with_descriptors(&reader),
        );

        let report = engine.run(&single(jar("widget"), true)).unwrap();

        let expected = vec![
            "com.acme:acme-parent:pom:1.0",
            "com.acme:lib:jar:1.0",
            "com.acme:lib:pom:1.0",
            "com.acme:widget:jar:1.0",
            "com.acme:widget:pom:1.0",
        ];
        assert_eq!(names(&report.discovered), expected);
        assert_eq!(names(&report.deployed), expected);
        // POMs are walked, never probed in the sources
        assert!(
            connector
                .probed_in(&source())
                .iter()
                .all(|artifact| !artifact.is_pom())
        );
    }

    fn platform() -> InMemoryDescriptorReader {
        let mut descriptor = ArtifactDescriptor::new(pom("platform"));
        descriptor.managed_dependencies = vec![
            dep("lib", "compile"),
            dep("tool", "test"),
            dep("api", "compile"),
        ];
        descriptor.model = Some(ProjectModel::default());
        InMemoryDescriptorReader::new()
            .with_descriptor(descriptor)
            .with_dependencies(&jar("lib"), vec![dep("core", "compile")])
    }

    fn bom(transitive: bool) -> SyncSource {
        SyncSource::Bom {
            artifact: pom("platform"),
            transitive,
        }
    }

    #[test]
    fn test_bom_collects_managed_dependencies_in_scope() {
        let reader = platform();
        let connector = InMemoryConnector::new();
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer).with_descriptors(&reader),
        );

        let candidates = engine.candidates(&bom(true)).unwrap();

        assert_eq!(
            names(&candidates),
            vec![
                "com.acme:platform:pom:1.0",
                "com.acme:core:jar:1.0",
                "com.acme:lib:jar:1.0",
                "com.acme:api:jar:1.0",
            ]
        );
    }

    #[test]
    fn test_non_transitive_bom_lists_every_managed_dependency() {
        let reader = platform();
        let connector = InMemoryConnector::new();
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer).with_descriptors(&reader),
        );

        let candidates = engine.candidates(&bom(false)).unwrap();

        assert_eq!(
            names(&candidates),
            vec![
                "com.acme:platform:pom:1.0",
                "com.acme:lib:jar:1.0",
                "com.acme:tool:jar:1.0",
                "com.acme:api:jar:1.0",
            ]
        );
    }

    #[test]
    fn test_bom_must_be_a_readable_pom() {
        let reader = InMemoryDescriptorReader::new();
        let connector = InMemoryConnector::new();
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer).with_descriptors(&reader),
        );

        assert!(matches!(
            engine.candidates(&SyncSource::Bom {
                artifact: jar("platform"),
                transitive: true,
            }),
            Err(Error::NotAPom { .. })
        ));
        assert!(matches!(
            engine.candidates(&bom(true)),
            Err(Error::Resolve(_))
        ));
    }

    #[test]
    fn test_reactor_excludes_its_own_projects() {
        let reader = InMemoryDescriptorReader::new();
        let connector = InMemoryConnector::new();
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer).with_descriptors(&reader),
        );

        let mut app = ReactorProject::new(jar("app"));
        app.dependencies = vec![
            dep("widget", "compile"),
            dep("junit", "test"),
            dep("module-b", "compile"),
        ];
        app.imports = vec![DependencyEdge::new(pom("platform"), "import")];
        let mut module_b = ReactorProject::new(jar("module-b"));
        module_b.dependencies = vec![dep("lib", "compile")];

        let candidates = engine
            .candidates(&SyncSource::Reactor {
                projects: vec![app, module_b],
            })
            .unwrap();

        assert_eq!(
            names(&candidates),
            vec![
                "com.acme:widget:jar:1.0",
                "com.acme:platform:pom:1.0",
                "com.acme:lib:jar:1.0",
            ]
        );
    }
}

mod local_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_local_sync_skips_unrequested_classifiers() {
        let layout = TestLayout::new();
        layout.add_all(&[widget(), widget().to_pom(), widget().to_sources()]);
        let connector = InMemoryConnector::new();
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            SyncOptions::new(vec![layout.repository("local")], target()),
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        let report = engine.run(&SyncSource::Local).unwrap();

        assert_eq!(
            names(&report.deployed),
            vec!["com.acme:widget:jar:1.0", "com.acme:widget:pom:1.0"]
        );
    }

    #[test]
    fn test_local_sync_rejects_remote_sources() {
        let connector = InMemoryConnector::new();
        let versions = StaticVersionResolver::new();
        let transfer = RecordingTransfer::new();
        let engine = SyncEngine::new(
            options(),
            SyncBackend::new(&versions, &connector, &transfer, &transfer),
        );

        assert!(matches!(
            engine.discover(&SyncSource::Local),
            Err(Error::UnsupportedProtocol { protocol, .. }) if protocol == "https"
        ));
    }
}
