use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{LauncherError, LauncherResult};

/// Top-level version index. Immutable once fetched; a refresh replaces the
/// whole value, entries are never patched in place.
#[derive(Debug, Deserialize)]
pub struct VersionIndex {
    pub latest: LatestPointers,
    pub versions: Vec<VersionRef>,
}

#[derive(Debug, Deserialize)]
pub struct LatestPointers {
    pub release: String,
    pub snapshot: String,
}

/// A single entry in the index pointing at a per-version descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: VersionKind,
    pub url: String,
    #[serde(rename = "releaseTime")]
    pub release_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    Release,
    Snapshot,
    // Historic entries still present in the live index.
    OldAlpha,
    OldBeta,
}

impl VersionIndex {
    /// Find a version entry by id (e.g. "1.20.4").
    pub fn find(&self, id: &str) -> Option<&VersionRef> {
        self.versions.iter().find(|v| v.id == id)
    }

    pub fn latest_release(&self) -> Option<&VersionRef> {
        self.find(&self.latest.release)
    }

    pub fn latest_snapshot(&self) -> Option<&VersionRef> {
        self.find(&self.latest.snapshot)
    }

    /// All stable releases, in index order.
    pub fn releases(&self) -> Vec<&VersionRef> {
        self.versions
            .iter()
            .filter(|v| v.kind == VersionKind::Release)
            .collect()
    }

    /// Every id must be unique within one fetch of the index.
    pub fn ensure_unique_ids(&self) -> LauncherResult<()> {
        let mut seen = HashSet::new();
        for version in &self.versions {
            if !seen.insert(version.id.as_str()) {
                return Err(LauncherError::DuplicateVersionId(version.id.clone()));
            }
        }
        Ok(())
    }
}
