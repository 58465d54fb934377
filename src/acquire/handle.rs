use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{LauncherError, LauncherResult};

/// Lifecycle of one acquisition task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl AcquisitionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AcquisitionState::Succeeded | AcquisitionState::Failed)
    }
}

/// One artifact that could not be verified, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct ArtifactFailure {
    pub url: String,
    pub dest: PathBuf,
    pub reason: String,
}

/// Observable snapshot of an acquisition. Fractions are computed over
/// terminal download units, so the value is monotonically non-decreasing
/// and reaches 1.0 only once every constituent fetch has finished.
#[derive(Debug, Clone)]
pub struct AcquisitionProgress {
    pub state: AcquisitionState,
    pub completed_units: usize,
    pub total_units: usize,
    pub failures: Vec<ArtifactFailure>,
    pub error: Option<String>,
}

impl AcquisitionProgress {
    pub fn fraction(&self) -> f64 {
        if self.total_units == 0 {
            0.0
        } else {
            self.completed_units as f64 / self.total_units as f64
        }
    }

    pub fn succeeded(&self) -> bool {
        self.state == AcquisitionState::Succeeded
    }
}

struct HandleInner {
    version_id: String,
    cancelled: AtomicBool,
    progress: watch::Sender<AcquisitionProgress>,
}

/// Shared handle onto one in-flight acquisition. Clones observe the same
/// underlying task; the deduplication map hands out clones rather than
/// spawning duplicates.
#[derive(Clone)]
pub struct AcquisitionHandle {
    inner: Arc<HandleInner>,
}

impl AcquisitionHandle {
    pub(crate) fn new(version_id: &str) -> Self {
        let (progress, _) = watch::channel(AcquisitionProgress {
            state: AcquisitionState::Pending,
            completed_units: 0,
            total_units: 0,
            failures: Vec::new(),
            error: None,
        });
        Self {
            inner: Arc::new(HandleInner {
                version_id: version_id.to_string(),
                cancelled: AtomicBool::new(false),
                progress,
            }),
        }
    }

    pub fn version_id(&self) -> &str {
        &self.inner.version_id
    }

    /// Receiver of progress updates; every mutation is published here.
    pub fn subscribe(&self) -> watch::Receiver<AcquisitionProgress> {
        self.inner.progress.subscribe()
    }

    /// Current snapshot.
    pub fn progress(&self) -> AcquisitionProgress {
        self.inner.progress.borrow().clone()
    }

    pub fn state(&self) -> AcquisitionState {
        self.inner.progress.borrow().state
    }

    /// Two handles refer to the same underlying task iff they share state.
    pub fn same_task(&self, other: &AcquisitionHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Request cancellation: no new fetches are issued, in-flight fetches
    /// finish or abort, and the task terminates as failed.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn check_cancelled(&self) -> LauncherResult<()> {
        if self.is_cancelled() {
            Err(LauncherError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Wait for the terminal snapshot.
    pub async fn wait(&self) -> AcquisitionProgress {
        let mut rx = self.subscribe();
        loop {
            {
                let current = rx.borrow_and_update();
                if current.state.is_terminal() {
                    return current.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.progress();
            }
        }
    }

    // ── driver-side mutations ───────────────────────────

    pub(crate) fn mark_running(&self) {
        self.inner.progress.send_modify(|p| p.state = AcquisitionState::Running);
    }

    pub(crate) fn set_total_units(&self, total: usize) {
        self.inner.progress.send_modify(|p| p.total_units = total);
    }

    pub(crate) fn unit_succeeded(&self) {
        self.inner.progress.send_modify(|p| p.completed_units += 1);
    }

    pub(crate) fn unit_failed(&self, failure: ArtifactFailure) {
        self.inner.progress.send_modify(|p| {
            p.completed_units += 1;
            p.failures.push(failure);
        });
    }

    pub(crate) fn finish(&self, result: &LauncherResult<()>) {
        self.inner.progress.send_modify(|p| match result {
            Ok(()) => p.state = AcquisitionState::Succeeded,
            Err(e) => {
                p.state = AcquisitionState::Failed;
                p.error = Some(e.to_string());
            }
        });
    }
}
