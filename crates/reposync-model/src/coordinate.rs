//! Artifact coordinates and identity keys
//!
//! An [`ArtifactCoordinate`] names one file in a repository. Two coordinates
//! are the same artifact when their [`IdentityKey`] matches; the looser
//! [`KindKey`] leaves out the version and pairs a request with whatever
//! version it resolved to.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Extension of project descriptor files
pub const POM_EXTENSION: &str = "pom";

/// Default extension when a coordinate string omits it
pub const JAR_EXTENSION: &str = "jar";

/// Classifier of source bundles
pub const SOURCES_CLASSIFIER: &str = "sources";

/// Classifier of API documentation bundles
pub const JAVADOC_CLASSIFIER: &str = "javadoc";

/// Classifier of the class jar attached to web archives
pub const CLASSES_CLASSIFIER: &str = "classes";

const SNAPSHOT_SUFFIX: &str = "SNAPSHOT";

static SNAPSHOT_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*-)?([0-9]{8}\.[0-9]{6}-[0-9]+)$").unwrap());

/// A fully qualified artifact coordinate.
///
/// `classifier` is an empty string when the artifact has no classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default)]
    pub classifier: String,
    pub extension: String,
}

/// Canonical identity used to deduplicate artifacts.
///
/// Ordered as `(groupId, artifactId, classifier, version, extension)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    group_id: String,
    artifact_id: String,
    classifier: String,
    version: String,
    extension: String,
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.classifier, self.version, self.extension
        )
    }
}

/// Version-less identity, used to match a request against its resolved form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindKey {
    group_id: String,
    artifact_id: String,
    classifier: String,
    extension: String,
}

impl ArtifactCoordinate {
    /// Create a coordinate from its five parts.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        classifier: impl Into<String>,
        extension: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: classifier.into(),
            extension: extension.into(),
        }
    }

    /// Create a POM coordinate with no classifier.
    pub fn pom(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(group_id, artifact_id, "", POM_EXTENSION, version)
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: self.classifier.clone(),
            version: self.version.clone(),
            extension: self.extension.clone(),
        }
    }

    pub fn kind(&self) -> KindKey {
        KindKey {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: self.classifier.clone(),
            extension: self.extension.clone(),
        }
    }

    /// Return a copy with a different version.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }

    /// The descriptor of this artifact.
    pub fn to_pom(&self) -> Self {
        Self::pom(&self.group_id, &self.artifact_id, &self.version)
    }

    pub fn to_sources(&self) -> Self {
        self.companion(SOURCES_CLASSIFIER)
    }

    pub fn to_javadoc(&self) -> Self {
        self.companion(JAVADOC_CLASSIFIER)
    }

    /// The class jar attached to a web archive.
    pub fn to_classes(&self) -> Self {
        self.companion(CLASSES_CLASSIFIER)
    }

    fn companion(&self, classifier: &str) -> Self {
        Self::new(
            &self.group_id,
            &self.artifact_id,
            classifier,
            JAR_EXTENSION,
            &self.version,
        )
    }

    pub fn is_pom(&self) -> bool {
        self.extension == POM_EXTENSION
    }

    pub fn is_war(&self) -> bool {
        self.extension == "war"
    }

    pub fn is_sources(&self) -> bool {
        self.classifier == SOURCES_CLASSIFIER
    }

    pub fn is_javadoc(&self) -> bool {
        self.classifier == JAVADOC_CLASSIFIER
    }

    pub fn has_classifier(&self) -> bool {
        !self.classifier.is_empty()
    }

    /// Whether the version denotes a snapshot, either `-SNAPSHOT` or a
    /// deployed timestamp such as `1.0-20240101.120000-3`.
    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with(SNAPSHOT_SUFFIX) || SNAPSHOT_TIMESTAMP.is_match(&self.version)
    }

    /// The base version: timestamped snapshots collapse to `-SNAPSHOT`.
    pub fn base_version(&self) -> String {
        match SNAPSHOT_TIMESTAMP.captures(&self.version) {
            Some(caps) => format!(
                "{}{}",
                caps.get(1).map(|m| m.as_str()).unwrap_or_default(),
                SNAPSHOT_SUFFIX
            ),
            None => self.version.clone(),
        }
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if self.has_classifier() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

/// Parses `groupId:artifactId:version[:extension[:classifier]]`.
///
/// The extension defaults to `jar` and the classifier to empty.
impl FromStr for ArtifactCoordinate {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split(':').filter(|t| !t.is_empty()).collect();
        if tokens.len() < 3 || tokens.len() > 5 {
            return Err(Error::InvalidCoordinate {
                input: s.to_string(),
            });
        }
        let extension = tokens.get(3).copied().unwrap_or(JAR_EXTENSION);
        let classifier = tokens.get(4).copied().unwrap_or_default();
        Ok(Self::new(
            tokens[0], tokens[1], classifier, extension, tokens[2],
        ))
    }
}

/// Remove entries with a repeated identity key, keeping first-seen order.
pub fn dedup_by_identity<I>(artifacts: I) -> Vec<ArtifactCoordinate>
where
    I: IntoIterator<Item = ArtifactCoordinate>,
{
    let mut seen = HashSet::new();
    artifacts
        .into_iter()
        .filter(|artifact| seen.insert(artifact.identity()))
        .collect()
}
