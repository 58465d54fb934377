//! Asset index resolution.
//!
//! Assets are content-addressed: the object's SHA-1 hash is both its name
//! under `assets/objects/` and its expected checksum. This module only plans
//! the downloads; the acquisition orchestrator runs them so retry, progress
//! and cancellation apply uniformly to every artifact kind.

use std::collections::HashMap;
use std::path::Path;

use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::error::{LauncherError, LauncherResult};
use crate::fetcher::DownloadRequest;
use crate::manifest::AssetIndexRef;

const DEFAULT_RESOURCES_BASE: &str = "https://resources.download.minecraft.net";

/// Top-level asset index document.
#[derive(Debug, Deserialize)]
pub struct AssetIndex {
    pub objects: HashMap<String, AssetObject>,
}

#[derive(Debug, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    pub size: u64,
}

/// Fetches asset index documents and plans object downloads.
pub struct AssetPlanner {
    http: Client,
    resources_base: String,
}

impl AssetPlanner {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            resources_base: DEFAULT_RESOURCES_BASE.to_string(),
        }
    }

    /// Override the object store base URL (mirrors, tests).
    pub fn with_resources_base(mut self, base: impl Into<String>) -> Self {
        self.resources_base = base.into();
        self
    }

    /// Download the asset index, persist it under `assets/indexes/<id>.json`,
    /// and return one download request per distinct object hash.
    pub async fn plan(
        &self,
        index_ref: &AssetIndexRef,
        assets_dir: &Path,
    ) -> LauncherResult<Vec<DownloadRequest>> {
        let response = self.http.get(&index_ref.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: index_ref.url.clone(),
                status: status.as_u16(),
            });
        }
        let raw = response.bytes().await?;
        let index: AssetIndex = serde_json::from_slice(&raw)?;

        let indexes_dir = assets_dir.join("indexes");
        tokio::fs::create_dir_all(&indexes_dir)
            .await
            .map_err(|e| LauncherError::Io {
                path: indexes_dir.clone(),
                source: e,
            })?;
        let index_path = indexes_dir.join(format!("{}.json", index_ref.id));
        tokio::fs::write(&index_path, &raw)
            .await
            .map_err(|e| LauncherError::Io {
                path: index_path,
                source: e,
            })?;

        // Several logical names can share one hash; fetch each object once.
        let objects_dir = assets_dir.join("objects");
        let mut requests: Vec<DownloadRequest> = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for object in index.objects.values() {
            if object.hash.len() < 2 || !seen.insert(object.hash.clone()) {
                continue;
            }
            let prefix = &object.hash[..2];
            requests.push(DownloadRequest {
                url: format!("{}/{}/{}", self.resources_base, prefix, object.hash),
                dest: objects_dir.join(prefix).join(&object.hash),
                sha1: Some(object.hash.clone()),
                size: Some(object.size),
            });
        }

        info!(
            "asset index {}: {} objects, {} distinct",
            index_ref.id,
            index.objects.len(),
            requests.len()
        );
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_index_deserializes_objects() {
        let index: AssetIndex = serde_json::from_str(
            r#"{"objects": {
                "minecraft/sounds/ambient.ogg": {"hash": "da39a3ee5e6b4b0d3255bfef95601890afd80709", "size": 10},
                "minecraft/lang/en_us.json": {"hash": "da39a3ee5e6b4b0d3255bfef95601890afd80709", "size": 10}
            }}"#,
        )
        .unwrap();
        assert_eq!(index.objects.len(), 2);
        assert_eq!(
            index.objects["minecraft/lang/en_us.json"].hash,
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }
}
