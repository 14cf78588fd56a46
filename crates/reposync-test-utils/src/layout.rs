//! [`TestLayout`] builder for on-disk repository scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use reposync_model::{ArtifactCoordinate, RemoteRepositoryRef};
use tempfile::TempDir;
use url::Url;

/// A temporary directory laid out as a `group/artifact/version` repository.
///
/// # Example
///
/// ```rust,no_run
/// use reposync_model::ArtifactCoordinate;
/// use reposync_test_utils::layout::TestLayout;
///
/// let layout = TestLayout::new();
/// layout.add(&ArtifactCoordinate::new("com.acme", "widget", "", "jar", "1.0"));
/// layout.assert_file_exists("com/acme/widget/1.0/widget-1.0.jar");
/// ```
pub struct TestLayout {
    temp_dir: TempDir,
}

impl Default for TestLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLayout {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `file:` URL of the root directory.
    pub fn url(&self) -> String {
        Url::from_directory_path(self.root())
            .unwrap_or_else(|_| panic!("not an absolute path: {}", self.root().display()))
            .to_string()
    }

    /// A repository reference pointing at this layout.
    pub fn repository(&self, id: &str) -> RemoteRepositoryRef {
        RemoteRepositoryRef::new(id, self.url())
    }

    /// Relative path of `artifact` inside the layout.
    pub fn relative_path(artifact: &ArtifactCoordinate) -> PathBuf {
        let mut path: PathBuf = artifact.group_id.split('.').collect();
        path.push(&artifact.artifact_id);
        path.push(artifact.base_version());
        let classifier = if artifact.classifier.is_empty() {
            String::new()
        } else {
            format!("-{}", artifact.classifier)
        };
        path.push(format!(
            "{}-{}{}.{}",
            artifact.artifact_id, artifact.version, classifier, artifact.extension
        ));
        path
    }

    /// Write `artifact` with its display string as content.
    pub fn add(&self, artifact: &ArtifactCoordinate) -> PathBuf {
        self.add_file(Self::relative_path(artifact), artifact.to_string())
    }

    /// Write every artifact of `artifacts`.
    pub fn add_all<'a>(&self, artifacts: impl IntoIterator<Item = &'a ArtifactCoordinate>) {
        for artifact in artifacts {
            self.add(artifact);
        }
    }

    /// Write `content` at `relative`, creating parent directories.
    pub fn add_file(&self, relative: impl AsRef<Path>, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: impl AsRef<Path>) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `artifact` is present in the layout.
    pub fn assert_artifact_exists(&self, artifact: &ArtifactCoordinate) {
        self.assert_file_exists(Self::relative_path(artifact));
    }

    /// Assert that `artifact` is absent from the layout.
    ///
    /// # Panics
    /// Panics if the artifact file exists.
    pub fn assert_artifact_missing(&self, artifact: &ArtifactCoordinate) {
        let full_path = self.root().join(Self::relative_path(artifact));
        assert!(
            !full_path.exists(),
            "Expected artifact NOT to exist: {}",
            full_path.display()
        );
    }
}
