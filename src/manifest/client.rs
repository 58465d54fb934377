use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, info_span, Instrument};

use crate::cache::{cache_key, disk_file_name, ContentCache};
use crate::error::{LauncherError, LauncherResult};
use crate::manifest::{VersionDescriptor, VersionIndex, VersionRef};

const DEFAULT_INDEX_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

/// The index changes whenever a new version ships, so it only lives briefly.
const INDEX_TTL: Duration = Duration::from_secs(10 * 60);
/// Descriptors are immutable once published.
const DESCRIPTOR_TTL: Duration = Duration::from_secs(30 * 60);
const DESCRIPTOR_DISK_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Fetches the version index and per-version descriptors.
///
/// Every request consults the cache collaborator before network I/O, and
/// successful responses populate both the memory tier and the durable disk
/// tier so a restart does not refetch. On network failure a stale disk copy
/// is never served silently: the caller gets [`LauncherError::StaleCacheOnly`]
/// and may opt into [`ManifestClient::load_stale_index`].
pub struct ManifestClient {
    http: Client,
    cache: Arc<dyn ContentCache>,
    index_url: String,
}

impl ManifestClient {
    pub fn new(http: Client, cache: Arc<dyn ContentCache>) -> Self {
        Self {
            http,
            cache,
            index_url: DEFAULT_INDEX_URL.to_string(),
        }
    }

    /// Point the client at a different index endpoint (mirrors, tests).
    pub fn with_index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = url.into();
        self
    }

    /// Fetch and parse the version index.
    pub async fn fetch_index(&self) -> LauncherResult<VersionIndex> {
        let span = info_span!("fetch_index");
        async {
            let bytes = self
                .fetch_document(&self.index_url, INDEX_TTL, INDEX_TTL)
                .await?;
            let index: VersionIndex = serde_json::from_slice(&bytes)?;
            index.ensure_unique_ids()?;
            info!("loaded {} versions from index", index.versions.len());
            Ok(index)
        }
        .instrument(span)
        .await
    }

    /// Fetch and parse one version descriptor, returning the parsed value
    /// together with the raw response bytes so the caller can persist
    /// `<id>.json` next to the artifact tree.
    pub async fn fetch_descriptor(
        &self,
        version: &VersionRef,
    ) -> LauncherResult<(VersionDescriptor, Vec<u8>)> {
        let span = info_span!("fetch_descriptor", version = %version.id);
        async {
            let bytes = self
                .fetch_document(&version.url, DESCRIPTOR_TTL, DESCRIPTOR_DISK_MAX_AGE)
                .await?;
            let descriptor: VersionDescriptor = serde_json::from_slice(&bytes)?;
            Ok((descriptor, bytes))
        }
        .instrument(span)
        .await
    }

    /// Explicit caller opt-in to an expired cached index after
    /// [`LauncherError::StaleCacheOnly`]. Never used as a default.
    pub async fn load_stale_index(&self) -> Option<VersionIndex> {
        let bytes = self
            .cache
            .load_from_disk(&disk_file_name(&self.index_url), Duration::MAX)
            .await?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Shared document path: memory tier, then disk tier, then network.
    async fn fetch_document(
        &self,
        url: &str,
        ttl: Duration,
        disk_max_age: Duration,
    ) -> LauncherResult<Vec<u8>> {
        let key = cache_key(url);
        if let Some(bytes) = self.cache.get(&key).await {
            return Ok(bytes);
        }

        let disk_name = disk_file_name(url);
        if let Some(bytes) = self.cache.load_from_disk(&disk_name, disk_max_age).await {
            self.cache.put(&key, bytes.clone(), ttl).await;
            return Ok(bytes);
        }

        match self.get_bytes(url).await {
            Ok(bytes) => {
                self.cache.put(&key, bytes.clone(), ttl).await;
                self.cache.save_to_disk(&disk_name, &bytes).await;
                Ok(bytes)
            }
            Err(e) if e.is_transient() => {
                // A stale disk copy may still exist; report that explicitly
                // instead of serving it or hiding it behind the network error.
                let has_stale = self
                    .cache
                    .load_from_disk(&disk_name, Duration::MAX)
                    .await
                    .is_some();
                if has_stale {
                    debug!("network failed, stale cached copy available: {url}");
                    Err(LauncherError::StaleCacheOnly {
                        url: url.to_string(),
                    })
                } else {
                    Err(e)
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn get_bytes(&self, url: &str) -> LauncherResult<Vec<u8>> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
