//! Single-artifact download with checksum verification.
//!
//! A destination file is only ever observed in two states: absent, or
//! complete and verified. Downloads stream into a sibling temp file and are
//! renamed into place after the checksum matches, so partially written or
//! corrupted bytes never land at the final path.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

use crate::error::{LauncherError, LauncherResult};

/// A single file to download, with optional SHA-1 for validation.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub dest: PathBuf,
    pub sha1: Option<String>,
    pub size: Option<u64>,
}

/// How a fetch concluded without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Downloaded and checksum-verified.
    Verified,
    /// Destination already present with a matching checksum; no network I/O.
    Skipped,
}

/// Streaming, SHA-1 validated artifact fetcher.
///
/// Retry policy lives in the orchestrator; this layer reports each failure
/// exactly once.
pub struct ArtifactFetcher {
    client: Client,
}

impl ArtifactFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, request: &DownloadRequest) -> LauncherResult<FetchOutcome> {
        if let Some(expected) = request.sha1.as_deref() {
            if request.dest.exists() && validate_sha1(&request.dest, expected).await? {
                debug!("already verified, skipping: {:?}", request.dest);
                return Ok(FetchOutcome::Skipped);
            }
        }

        if let Some(parent) = request.dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let response = self.client.get(&request.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        let temp = temp_path(&request.dest);
        let actual = match self.stream_to(response, &temp).await {
            Ok(digest) => digest,
            Err(e) => {
                let _ = tokio::fs::remove_file(&temp).await;
                return Err(e);
            }
        };

        if let Some(expected) = request.sha1.as_deref() {
            if actual != expected {
                let _ = tokio::fs::remove_file(&temp).await;
                return Err(LauncherError::Sha1Mismatch {
                    path: request.dest.clone(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        tokio::fs::rename(&temp, &request.dest)
            .await
            .map_err(|e| LauncherError::Io {
                path: request.dest.clone(),
                source: e,
            })?;

        debug!("downloaded: {} -> {:?}", request.url, request.dest);
        Ok(FetchOutcome::Verified)
    }

    /// Stream the response body to `temp`, hashing incrementally. Returns
    /// the hex SHA-1 of the written bytes.
    async fn stream_to(&self, response: reqwest::Response, temp: &Path) -> LauncherResult<String> {
        let mut hasher = Sha1::new();
        let mut stream = response.bytes_stream();

        // Scope the file handle so it is closed before the rename.
        {
            let mut file = tokio::fs::File::create(temp)
                .await
                .map_err(|e| LauncherError::Io {
                    path: temp.to_path_buf(),
                    source: e,
                })?;

            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                hasher.update(&chunk);
                file.write_all(&chunk).await.map_err(|e| LauncherError::Io {
                    path: temp.to_path_buf(),
                    source: e,
                })?;
            }

            file.flush().await.map_err(|e| LauncherError::Io {
                path: temp.to_path_buf(),
                source: e,
            })?;
        }

        Ok(hex::encode(hasher.finalize()))
    }
}

/// Compute a file's SHA-1 in chunks and compare to `expected`.
pub async fn validate_sha1(path: &Path, expected: &str) -> LauncherResult<bool> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| LauncherError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).await.map_err(|e| LauncherError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()) == expected)
}

fn temp_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());
    dest.with_file_name(format!(".{}.part-{}", name, Uuid::new_v4().simple()))
}
