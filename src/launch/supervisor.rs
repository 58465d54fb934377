//! Process supervision.
//!
//! Spawns the game process non-blocking, merges its error stream into the
//! observable output stream, and forwards every line to the logging
//! pipeline until the streams close. In-process crashes are not a launch
//! error; they surface through the output stream and the exit status.

use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::{LauncherError, LauncherResult};

use super::command::LaunchSpec;

/// Handle onto a launched game process.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    output: Option<mpsc::UnboundedReceiver<String>>,
}

impl ProcessHandle {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Whether the process is still running, without blocking.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Exit status if the process has already terminated.
    pub fn try_exit_status(&mut self) -> Option<ExitStatus> {
        self.child.try_wait().ok().flatten()
    }

    /// Wait for process exit. The launcher itself never requires this; it
    /// exists for callers that want to observe the exit code.
    pub async fn wait(&mut self) -> LauncherResult<ExitStatus> {
        self.child
            .wait()
            .await
            .map_err(|e| LauncherError::Launch(format!("wait failed: {e}")))
    }

    pub async fn kill(&mut self) -> LauncherResult<()> {
        self.child
            .kill()
            .await
            .map_err(|e| LauncherError::Launch(format!("kill failed: {e}")))
    }

    /// Take the merged stdout+stderr line stream. Lines are forwarded to
    /// the log regardless of whether this receiver is consumed.
    pub fn take_output(&mut self) -> Option<mpsc::UnboundedReceiver<String>> {
        self.output.take()
    }
}

/// Spawn the process described by `spec`. Returns immediately after spawn.
///
/// Covers executable-not-found and permission failures as [`LauncherError::Launch`].
pub fn launch(spec: &LaunchSpec) -> LauncherResult<ProcessHandle> {
    info!("launching {:?} in {:?}", spec.java_path, spec.working_dir);
    debug!("launch args: {:?}", spec.args);

    let mut child = Command::new(&spec.java_path)
        .args(&spec.args)
        .current_dir(&spec.working_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| LauncherError::Launch(format!("{:?}: {e}", spec.java_path)))?;

    let (tx, rx) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        spawn_line_reader(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_line_reader(stderr, tx);
    }

    Ok(ProcessHandle {
        child,
        output: Some(rx),
    })
}

fn spawn_line_reader<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            info!(target: "game", "{line}");
            // Receiver may have been dropped; logging above still happened.
            let _ = tx.send(line);
        }
    });
}
