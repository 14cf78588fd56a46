//! Local repository path scanner
//!
//! Reconstructs artifact coordinates from the directory layout alone: for a
//! file at `g1/g2/artifactId/version/fileName` the group is `g1.g2`, and
//! `fileName` must read `artifactId-version[-classifier].extension`. File
//! content is never opened.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use reposync_model::coordinate::POM_EXTENSION;
use reposync_model::{ArtifactCoordinate, IdentityKey};

use crate::{Error, Result};

/// Unresolved build placeholders such as `${project.version}`
static ILLEGAL_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[${]").unwrap());

/// A file that could not be turned into a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Artifact [{}] has illegal characters in '{field}' property value: '{value}'", .path.display())]
    IllegalCharacters {
        path: PathBuf,
        field: String,
        value: String,
    },

    #[error("Cannot read {}: {message}", .path.display())]
    Walk { path: PathBuf, message: String },
}

impl ValidationError {
    pub fn path(&self) -> &Path {
        match self {
            ValidationError::IllegalCharacters { path, .. }
            | ValidationError::Walk { path, .. } => path,
        }
    }
}

/// What a scan found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Distinct coordinates, in walk order
    pub artifacts: Vec<ArtifactCoordinate>,
    /// Files skipped in lenient mode
    pub errors: Vec<ValidationError>,
}

impl ScanReport {
    fn reject(&mut self, error: ValidationError, strict: bool) -> Result<()> {
        if strict {
            return Err(Error::Validation(error));
        }
        warn!("{}", error);
        self.errors.push(error);
        Ok(())
    }
}

/// Scan every regular file below `root`.
///
/// In strict mode the first validation error aborts the scan. Otherwise the
/// offending file is logged, recorded in [`ScanReport::errors`] and skipped.
pub fn scan_local_repository(root: &Path, strict: bool) -> Result<ScanReport> {
    let root = dunce::canonicalize(root).map_err(|e| Error::io(root, e))?;
    let mut report = ScanReport::default();
    let mut seen: HashSet<IdentityKey> = HashSet::new();
    let mut patterns = FileNamePatterns::default();

    for entry in WalkDir::new(&root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                report.reject(
                    ValidationError::Walk {
                        path,
                        message: e.to_string(),
                    },
                    strict,
                )?;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        match reconstruct(&root, entry.path(), &mut patterns) {
            Ok(Some(artifact)) => {
                if seen.insert(artifact.identity()) {
                    debug!("Recognised {}", artifact);
                    report.artifacts.push(artifact);
                }
            }
            Ok(None) => {}
            Err(error) => report.reject(error, strict)?,
        }
    }

    info!(
        "Scanned {}: {} artifacts, {} rejected files",
        root.display(),
        report.artifacts.len(),
        report.errors.len()
    );
    Ok(report)
}

/// Compiled `artifactId-version[-classifier].extension` patterns, one per
/// version directory.
#[derive(Default)]
struct FileNamePatterns {
    compiled: HashMap<(String, String), Regex>,
}

impl FileNamePatterns {
    fn get(
        &mut self,
        artifact_id: &str,
        version: &str,
    ) -> std::result::Result<&Regex, regex::Error> {
        let key = (artifact_id.to_string(), version.to_string());
        if !self.compiled.contains_key(&key) {
            // ASCII word boundaries for the extension
            let pattern = Regex::new(&format!(
                r"^{}-{}(?:-(.+))?(?:.(?-u:(\b\w+\b)))$",
                regex::escape(artifact_id),
                regex::escape(version)
            ))?;
            self.compiled.insert(key.clone(), pattern);
        }
        Ok(&self.compiled[&key])
    }
}

/// The coordinate of the file at `path`, `None` when it is not an artifact.
///
/// A file three levels deep has an empty group.
fn reconstruct(
    root: &Path,
    path: &Path,
    patterns: &mut FileNamePatterns,
) -> std::result::Result<Option<ArtifactCoordinate>, ValidationError> {
    let relative = path.strip_prefix(root).map_err(|e| ValidationError::Walk {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let count = segments.len();
    if count < 3 {
        return Ok(None);
    }

    let file_name = &segments[count - 1];
    let version = &segments[count - 2];
    let artifact_id = &segments[count - 3];
    validate(file_name, "fileName", path)?;
    validate(artifact_id, "artifactId", path)?;
    validate(version, "version", path)?;

    let pattern = patterns.get(artifact_id, version).map_err(|e| ValidationError::Walk {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let Some(captures) = pattern.captures(file_name) else {
        return Ok(None);
    };

    let group_id = segments[..count - 3].join(".");
    let extension = captures.get(2).map_or("", |m| m.as_str());
    // POMs are never classified
    let classifier = match captures.get(1) {
        Some(m) if extension != POM_EXTENSION => m.as_str(),
        _ => "",
    };
    validate(&group_id, "groupId", path)?;
    validate(classifier, "classifier", path)?;
    validate(extension, "extension", path)?;

    Ok(Some(ArtifactCoordinate::new(
        group_id,
        artifact_id.as_str(),
        classifier,
        extension,
        version.as_str(),
    )))
}

fn validate(value: &str, field: &str, path: &Path) -> std::result::Result<(), ValidationError> {
    if ILLEGAL_CHARS.is_match(value) {
        return Err(ValidationError::IllegalCharacters {
            path: path.to_path_buf(),
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}
