//! Acquisition orchestrator.
//!
//! Drives the full pipeline for one version id: resolve the descriptor,
//! fetch the primary artifact, then fan out library, native and asset
//! downloads with bounded concurrency. Concurrent `acquire` calls for the
//! same id collapse into one in-flight task.

mod handle;

pub use handle::{AcquisitionHandle, AcquisitionProgress, AcquisitionState, ArtifactFailure};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::assets::AssetPlanner;
use crate::error::{LauncherError, LauncherResult};
use crate::fetcher::{ArtifactFetcher, DownloadRequest};
use crate::layout::DataLayout;
use crate::manifest::{ManifestClient, VersionDescriptor};
use crate::rules::Platform;

pub struct AcquisitionService {
    manifest: ManifestClient,
    fetcher: ArtifactFetcher,
    assets: AssetPlanner,
    layout: DataLayout,
    /// Bounded fan-out per acquisition; remote endpoints throttle beyond this.
    max_concurrent: usize,
    /// Attempts per artifact for transient transport errors.
    max_attempts: u32,
    retry_base_delay: Duration,
    /// versionId → live task. The single synchronization point for dedup.
    tasks: Mutex<HashMap<String, AcquisitionHandle>>,
}

impl AcquisitionService {
    pub fn new(
        manifest: ManifestClient,
        fetcher: ArtifactFetcher,
        assets: AssetPlanner,
        layout: DataLayout,
    ) -> Self {
        Self {
            manifest,
            fetcher,
            assets,
            layout,
            max_concurrent: 8,
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(500),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn manifest(&self) -> &ManifestClient {
        &self.manifest
    }

    /// Start (or join) the acquisition of `version_id`. Returns immediately.
    ///
    /// Deduplication invariant: at most one live task per version id. A call
    /// while a task is still in flight returns a handle onto that task; a
    /// call after it reached a terminal state starts a fresh one.
    pub fn acquire(self: &Arc<Self>, version_id: &str) -> AcquisitionHandle {
        let mut tasks = self.tasks.lock().expect("task map mutex poisoned");

        if let Some(existing) = tasks.get(version_id) {
            if !existing.state().is_terminal() {
                debug!("joining in-flight acquisition for {version_id}");
                return existing.clone();
            }
        }

        let handle = AcquisitionHandle::new(version_id);
        tasks.insert(version_id.to_string(), handle.clone());
        drop(tasks);

        let service = Arc::clone(self);
        let task_handle = handle.clone();
        tokio::spawn(async move {
            service.drive(task_handle).await;
        });

        handle
    }

    async fn drive(&self, handle: AcquisitionHandle) {
        let span = info_span!("acquire", version = %handle.version_id());
        let result = self.run(&handle).instrument(span).await;
        match &result {
            Ok(()) => info!("acquisition complete: {}", handle.version_id()),
            Err(e) => warn!("acquisition failed: {}: {e}", handle.version_id()),
        }
        handle.finish(&result);
    }

    async fn run(&self, handle: &AcquisitionHandle) -> LauncherResult<()> {
        handle.mark_running();
        let id = handle.version_id();

        // ── Resolve & validate before any artifact download ──
        let index = self.manifest.fetch_index().await?;
        let version = index
            .find(id)
            .ok_or_else(|| LauncherError::VersionNotFound(id.to_string()))?
            .clone();
        let (descriptor, raw) = self.manifest.fetch_descriptor(&version).await?;
        descriptor.validate()?;

        self.layout.ensure_tree().await?;
        let version_dir = self.layout.version_dir(id);
        tokio::fs::create_dir_all(&version_dir)
            .await
            .map_err(|e| LauncherError::Io {
                path: version_dir,
                source: e,
            })?;
        let json_path = self.layout.version_json(id);
        tokio::fs::write(&json_path, &raw)
            .await
            .map_err(|e| LauncherError::Io {
                path: json_path,
                source: e,
            })?;

        // ── Plan every download unit so progress has a fixed denominator ──
        let units = self.plan_units(&descriptor).await?;
        handle.set_total_units(1 + units.len());

        // ── Primary artifact: hard prerequisite ──
        handle.check_cancelled()?;
        let primary = descriptor.primary()?;
        let primary_request = DownloadRequest {
            url: primary.url.clone(),
            dest: self.layout.version_jar(id),
            sha1: Some(primary.sha1.clone()),
            size: Some(primary.size),
        };
        if let Err(e) = self.fetch_with_retry(handle, &primary_request).await {
            handle.unit_failed(failure_of(&primary_request, &e));
            return Err(e);
        }
        handle.unit_succeeded();

        // ── Fan out libraries, natives and assets ──
        let failures: Vec<ArtifactFailure> = stream::iter(units)
            .map(|request| {
                let handle = handle.clone();
                async move {
                    match self.fetch_with_retry(&handle, &request).await {
                        Ok(()) => {
                            handle.unit_succeeded();
                            None
                        }
                        Err(e) => {
                            let failure = failure_of(&request, &e);
                            handle.unit_failed(failure.clone());
                            Some(failure)
                        }
                    }
                }
            })
            .buffer_unordered(self.max_concurrent)
            .filter_map(|failure| async move { failure })
            .collect()
            .await;

        if handle.is_cancelled() {
            return Err(LauncherError::Cancelled);
        }
        if !failures.is_empty() {
            return Err(LauncherError::AcquisitionFailed {
                version: id.to_string(),
                failed: failures.len(),
            });
        }
        Ok(())
    }

    /// Applicable libraries and natives (rule-filtered), plus asset objects.
    /// Duplicate destination paths collapse into one unit even when several
    /// entries reference them.
    async fn plan_units(
        &self,
        descriptor: &VersionDescriptor,
    ) -> LauncherResult<Vec<DownloadRequest>> {
        let platform = Platform::current();
        let mut units = Vec::new();
        let mut seen = HashSet::new();

        for library in &descriptor.libraries {
            if !library.applies_on(platform) {
                debug!("skipping library (platform rule): {}", library.name);
                continue;
            }

            let artifact = library.downloads.as_ref().and_then(|d| d.artifact.as_ref());
            let native = library.native_artifact_for(platform);
            for spec in [artifact, native].into_iter().flatten() {
                let Some(relative) = spec.path.as_deref() else {
                    continue;
                };
                let dest = self.layout.library_path(relative);
                if seen.insert(dest.clone()) {
                    units.push(DownloadRequest {
                        url: spec.url.clone(),
                        dest,
                        sha1: Some(spec.sha1.clone()),
                        size: Some(spec.size),
                    });
                }
            }
        }

        if let Some(index_ref) = &descriptor.asset_index {
            let asset_units = self.assets.plan(index_ref, &self.layout.assets_dir()).await?;
            for unit in asset_units {
                if seen.insert(unit.dest.clone()) {
                    units.push(unit);
                }
            }
        }

        Ok(units)
    }

    /// Bounded retry with doubling backoff, transient transport errors only.
    /// Checksum mismatches and data errors surface immediately.
    async fn fetch_with_retry(
        &self,
        handle: &AcquisitionHandle,
        request: &DownloadRequest,
    ) -> LauncherResult<()> {
        let mut attempt = 1;
        loop {
            handle.check_cancelled()?;
            match self.fetcher.fetch(request).await {
                Ok(_) => return Ok(()),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.retry_base_delay * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        "transient failure for {} (attempt {attempt}/{}): {e}; retrying in {delay:?}",
                        request.url, self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn failure_of(request: &DownloadRequest, error: &LauncherError) -> ArtifactFailure {
    ArtifactFailure {
        url: request.url.clone(),
        dest: request.dest.clone(),
        reason: error.to_string(),
    }
}
