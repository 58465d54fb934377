use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the launcher core.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Network unreachable and only a stale cached copy exists for {url}")]
    StaleCacheOnly { url: String },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Manifest data ───────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version {version} is missing required field `{field}`")]
    MissingDescriptorField {
        version: String,
        field: &'static str,
    },

    #[error("Version not found in manifest: {0}")]
    VersionNotFound(String),

    #[error("Duplicate version id in manifest: {0}")]
    DuplicateVersionId(String),

    // ── Acquisition ─────────────────────────────────────
    #[error("Acquisition cancelled")]
    Cancelled,

    #[error("Acquisition of {version} failed: {failed} artifact(s) could not be verified")]
    AcquisitionFailed { version: String, failed: usize },

    // ── Launch ──────────────────────────────────────────
    #[error("Main class not set for version {0}")]
    MissingMainClass(String),

    #[error("Library {0} has no verified local artifact")]
    UnresolvedLibrary(String),

    #[error("Launch failed: {0}")]
    Launch(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    /// Transient transport failures are the only errors the orchestrator is
    /// allowed to retry. Integrity and data errors always surface as-is.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LauncherError::Http(_) | LauncherError::DownloadFailed { .. }
        )
    }
}

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
