//! SHA-256 checksum sidecars
//!
//! Deployed artifacts get a `<file>.sha256` sidecar holding the bare
//! lower-case hex digest, as repository managers expect.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Extension appended to an artifact file name for its sidecar
pub const SIDECAR_EXTENSION: &str = "sha256";

/// Hex SHA-256 of `content`.
pub fn compute_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Hex SHA-256 of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_checksum(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(compute_checksum(&content))
}

/// Path of the sidecar belonging to `file`.
pub fn sidecar_path(file: &Path) -> PathBuf {
    let mut name = file.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    file.with_file_name(name)
}
