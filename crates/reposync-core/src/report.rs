//! Outcome of a sync run

use serde::{Deserialize, Serialize};

use reposync_model::ArtifactCoordinate;

use crate::Result;

/// What a sync found and did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Artifacts confirmed in the source repositories
    pub discovered: Vec<ArtifactCoordinate>,
    /// Discovered artifacts absent from the target
    pub missing: Vec<ArtifactCoordinate>,
    /// Artifacts deployed to the target
    pub deployed: Vec<ArtifactCoordinate>,
    pub dry_run: bool,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Whether the run ended without anything to transfer.
    pub fn nothing_to_sync(&self) -> bool {
        self.missing.is_empty()
    }

    /// One-line summary for terminal output.
    pub fn summary(&self) -> String {
        if self.nothing_to_sync() {
            return format!(
                "{} artifacts discovered, nothing to sync",
                self.discovered.len()
            );
        }
        if self.dry_run {
            return format!(
                "{} artifacts discovered, {} would be deployed",
                self.discovered.len(),
                self.missing.len()
            );
        }
        format!(
            "{} artifacts discovered, {} missing, {} deployed",
            self.discovered.len(),
            self.missing.len(),
            self.deployed.len()
        )
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
