//! Content cache collaborator.
//!
//! The manifest client never talks to disk or memory caches directly; it is
//! handed a `ContentCache` at construction. Tests substitute their own
//! implementation, production wires in [`LauncherCache`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Byte-oriented cache with an in-memory tier (explicit TTL per entry) and a
/// durable disk tier (age checked against the file's modification time).
#[async_trait]
pub trait ContentCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;
    async fn put(&self, key: &str, data: Vec<u8>, ttl: Duration);
    async fn load_from_disk(&self, name: &str, max_age: Duration) -> Option<Vec<u8>>;
    async fn save_to_disk(&self, name: &str, data: &[u8]);
}

struct MemoryEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

/// Default cache implementation. Expired memory entries are dropped on
/// access; expired disk files are ignored on read but left in place so a
/// caller can still reach them as a stale fallback.
pub struct LauncherCache {
    cache_dir: PathBuf,
    memory: Mutex<HashMap<String, MemoryEntry>>,
}

impl LauncherCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            memory: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ContentCache for LauncherCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut memory = self.memory.lock().expect("cache mutex poisoned");
        match memory.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                debug!("memory cache hit: {key}");
                Some(entry.data.clone())
            }
            Some(_) => {
                debug!("memory cache entry expired: {key}");
                memory.remove(key);
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: &str, data: Vec<u8>, ttl: Duration) {
        let entry = MemoryEntry {
            data,
            expires_at: Instant::now() + ttl,
        };
        self.memory
            .lock()
            .expect("cache mutex poisoned")
            .insert(key.to_string(), entry);
    }

    async fn load_from_disk(&self, name: &str, max_age: Duration) -> Option<Vec<u8>> {
        let path = self.cache_dir.join(name);
        let metadata = tokio::fs::metadata(&path).await.ok()?;

        let modified = metadata.modified().ok()?;
        let age = SystemTime::now().duration_since(modified).unwrap_or_default();
        if age > max_age {
            // The file stays on disk: expired copies are still reachable as
            // an explicit stale fallback, and deletion is the eviction
            // collaborator's call, not ours.
            debug!("disk cache entry expired: {name}");
            return None;
        }

        debug!("disk cache hit: {name}");
        tokio::fs::read(&path).await.ok()
    }

    async fn save_to_disk(&self, name: &str, data: &[u8]) {
        if let Err(e) = tokio::fs::create_dir_all(&self.cache_dir).await {
            tracing::warn!("failed to create cache dir {:?}: {e}", self.cache_dir);
            return;
        }
        let path = self.cache_dir.join(name);
        if let Err(e) = tokio::fs::write(&path, data).await {
            tracing::warn!("failed to write disk cache {name}: {e}");
        }
    }
}

/// Cache key for a request identity: hex-encoded SHA-256 of the URL.
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Filesystem-safe disk cache name derived from a URL.
pub fn disk_file_name(url: &str) -> String {
    let mut safe: String = url
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    safe.truncate(100);
    safe
}
