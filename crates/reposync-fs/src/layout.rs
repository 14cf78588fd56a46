//! The `group/artifact/version/file` repository layout

use std::path::{Path, PathBuf};

use reposync_model::ArtifactCoordinate;

/// File name of `artifact`: `artifactId-version[-classifier].extension`.
pub fn file_name(artifact: &ArtifactCoordinate) -> String {
    if artifact.classifier.is_empty() {
        format!(
            "{}-{}.{}",
            artifact.artifact_id, artifact.version, artifact.extension
        )
    } else {
        format!(
            "{}-{}-{}.{}",
            artifact.artifact_id, artifact.version, artifact.classifier, artifact.extension
        )
    }
}

/// Directory holding every version of an artifact, relative to the root.
///
/// An empty group puts the artifact directory at the root.
pub fn artifact_dir(group_id: &str, artifact_id: &str) -> PathBuf {
    let mut dir: PathBuf = group_id.split('.').filter(|s| !s.is_empty()).collect();
    dir.push(artifact_id);
    dir
}

/// Path of `artifact` relative to the repository root.
///
/// Timestamped snapshots live in their `-SNAPSHOT` version directory.
pub fn artifact_path(artifact: &ArtifactCoordinate) -> PathBuf {
    let mut path = artifact_dir(&artifact.group_id, &artifact.artifact_id);
    path.push(artifact.base_version());
    path.push(file_name(artifact));
    path
}

/// Absolute path of `artifact` below `root`.
pub fn locate(root: &Path, artifact: &ArtifactCoordinate) -> PathBuf {
    root.join(artifact_path(artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("com.acme:widget:1.0", "com/acme/widget/1.0/widget-1.0.jar")]
    #[case("com.acme:widget:1.0:pom", "com/acme/widget/1.0/widget-1.0.pom")]
    #[case("com.acme:widget:1.0:jar:sources", "com/acme/widget/1.0/widget-1.0-sources.jar")]
    #[case("org:tool:2.0-SNAPSHOT:zip", "org/tool/2.0-SNAPSHOT/tool-2.0-SNAPSHOT.zip")]
    #[case(
        "org:tool:2.0-20240101.120000-3",
        "org/tool/2.0-SNAPSHOT/tool-2.0-20240101.120000-3.jar"
    )]
    fn test_artifact_path(#[case] coordinate: &str, #[case] expected: &str) {
        let artifact: ArtifactCoordinate = coordinate.parse().unwrap();
        let expected: PathBuf = expected.split('/').collect();
        assert_eq!(artifact_path(&artifact), expected);
    }

    #[test]
    fn test_empty_group_sits_at_the_root() {
        let artifact = ArtifactCoordinate::new("", "widget", "", "jar", "1.0");
        let expected: PathBuf = ["widget", "1.0", "widget-1.0.jar"].iter().collect();
        assert_eq!(artifact_path(&artifact), expected);
    }
}
