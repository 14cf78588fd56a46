//! End-to-end syncs between `file:` repositories
//!
//! Each test loads a `reposync.toml`, builds the engine over the filesystem
//! backends and checks what lands in the target directory.

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use reposync_core::{SyncBackend, SyncConfig, SyncEngine, SyncReport};
use reposync_fs::checksum::{compute_checksum, sidecar_path};
use reposync_fs::{FileLocalCache, FileRepositoryConnector, FileTransfer, FileVersionResolver};
use reposync_model::ArtifactCoordinate;
use reposync_test_utils::layout::TestLayout;

fn widget() -> ArtifactCoordinate {
    ArtifactCoordinate::new("com.acme", "widget", "", "jar", "1.0")
}

fn gadget() -> ArtifactCoordinate {
    ArtifactCoordinate::new("com.acme", "gadget", "", "jar", "2.0")
}

fn spec(id: &str, layout: &TestLayout) -> String {
    format!("{}::default::{}", id, layout.url())
}

fn names(artifacts: &[ArtifactCoordinate]) -> Vec<String> {
    artifacts.iter().map(ToString::to_string).collect()
}

/// Write `body` after the repository keys and load it back.
fn load_config(source: &TestLayout, target: &TestLayout, body: &str) -> (TempDir, SyncConfig) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(reposync_core::CONFIG_FILE_NAME);
    fs::write(
        &path,
        format!(
            "source_repositories = [\"{}\"]\ntarget_repository = \"{}\"\n{}",
            spec("src", source),
            spec("dst", target),
            body
        ),
    )
    .unwrap();
    let config = SyncConfig::load(&path).unwrap();
    (dir, config)
}

/// Run a sync over the filesystem backends.
fn sync(config: &SyncConfig, cache: Option<&FileLocalCache>) -> reposync_core::Result<SyncReport> {
    let versions = FileVersionResolver::new();
    let connector = FileRepositoryConnector::new();
    let transfer = FileTransfer::new();
    let mut backend = SyncBackend::new(&versions, &connector, &transfer, &transfer);
    if let Some(cache) = cache {
        backend = backend.with_local_cache(cache);
    }
    SyncEngine::new(config.options()?, backend).run(&config.sync_source()?)
}

#[test]
fn test_local_sync_copies_missing_artifacts_with_checksums() {
    let source = TestLayout::new();
    let target = TestLayout::new();
    let sources_jar = widget().to_sources();
    let javadoc_jar = widget().to_javadoc();
    source.add_all([&widget(), &widget().to_pom(), &sources_jar, &javadoc_jar, &gadget()]);
    target.add(&gadget());
    let (_dir, config) = load_config(&source, &target, "mode = \"local\"\nsync_sources = true\n");

    let report = sync(&config, None).unwrap();

    let deployed = vec![
        "com.acme:widget:jar:1.0",
        "com.acme:widget:jar:sources:1.0",
        "com.acme:widget:pom:1.0",
    ];
    assert_eq!(names(&report.deployed), deployed);
    assert_eq!(report.discovered.len(), 4);
    target.assert_artifact_exists(&sources_jar);
    target.assert_artifact_missing(&javadoc_jar);

    let jar = target.root().join(TestLayout::relative_path(&widget()));
    let digest = fs::read_to_string(sidecar_path(&jar)).unwrap();
    assert_eq!(digest, compute_checksum(widget().to_string().as_bytes()));
}

#[test]
fn test_second_local_sync_has_nothing_to_do() {
    let source = TestLayout::new();
    let target = TestLayout::new();
    source.add_all([&widget(), &widget().to_pom()]);
    let (_dir, config) = load_config(&source, &target, "");

    assert_eq!(sync(&config, None).unwrap().deployed.len(), 2);

    let report = sync(&config, None).unwrap();
    assert!(report.nothing_to_sync());
    assert!(report.deployed.is_empty());
}

#[test]
fn test_list_sync_keeps_only_existing_companions() {
    let source = TestLayout::new();
    let target = TestLayout::new();
    source.add_all([&widget(), &widget().to_pom(), &widget().to_sources(), &gadget()]);
    let (_dir, config) = load_config(
        &source,
        &target,
        "mode = \"list\"\ntransitive = false\nsync_sources = true\nartifacts = [\"com.acme:widget:1.0\", \"com.acme:gadget:2.0\"]\n",
    );

    let report = sync(&config, None).unwrap();

    // gadget was published without a POM
    assert_eq!(
        names(&report.deployed),
        vec![
            "com.acme:gadget:jar:2.0",
            "com.acme:widget:jar:1.0",
            "com.acme:widget:jar:sources:1.0",
            "com.acme:widget:pom:1.0",
        ]
    );
    target.assert_artifact_missing(&gadget().to_pom());
}

#[test]
fn test_dry_run_consults_local_cache_when_asked() {
    let source = TestLayout::new();
    let target = TestLayout::new();
    let cache_dir = TestLayout::new();
    let jar = cache_dir.add(&widget());
    fs::write(
        jar.parent().unwrap().join("_remote.repositories"),
        "widget-1.0.jar>src=\n",
    )
    .unwrap();
    let (_dir, config) = load_config(
        &source,
        &target,
        "mode = \"single\"\ntransitive = false\ncheck_local = true\ndry_run = true\nartifacts = [\"com.acme:widget:1.0\"]\n",
    );
    let cache = FileLocalCache::new(cache_dir.root());

    let report = sync(&config, Some(&cache)).unwrap();

    assert!(report.dry_run);
    assert_eq!(names(&report.discovered), vec!["com.acme:widget:jar:1.0"]);
    assert_eq!(names(&report.missing), vec!["com.acme:widget:jar:1.0"]);
    target.assert_artifact_missing(&widget());

    // Without the cache the source repository alone has nothing
    let report = sync(&config, None).unwrap();
    assert!(report.discovered.is_empty());
}

#[test]
fn test_latest_version_is_resolved_against_the_source() {
    let source = TestLayout::new();
    let target = TestLayout::new();
    let newer = widget().with_version("1.1");
    source.add_all([&widget(), &widget().to_pom(), &newer, &newer.to_pom()]);
    let (_dir, config) = load_config(
        &source,
        &target,
        "mode = \"single\"\ntransitive = false\nartifacts = [\"com.acme:widget:LATEST\"]\n",
    );

    let report = sync(&config, None).unwrap();

    assert_eq!(
        names(&report.deployed),
        vec!["com.acme:widget:jar:1.1", "com.acme:widget:pom:1.1"]
    );
    target.assert_artifact_exists(&newer);
    target.assert_artifact_missing(&widget());
}
