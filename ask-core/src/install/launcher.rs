// ask-core/src/install/launcher.rs
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use ask_common::config::{Config, PROGRESS_ENV_VAR};
use ask_common::error::{AskError, Result};
use ask_common::events::InstallOutcome;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

const STDERR_TAIL_LINES: usize = 20;
const STDERR_COLLECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Starts `<tool> install <identifier>` with progress reporting switched on.
#[derive(Debug, Clone)]
pub struct InstallLauncher {
    tool: String,
}

impl InstallLauncher {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tool())
    }

    /// Spawns the installer. Must be called from within a Tokio runtime.
    pub fn start(&self, identifier: &str, pipe_path: PathBuf) -> Result<InstallSession> {
        debug!(
            "Launching: {} install {} ({}=1)",
            self.tool, identifier, PROGRESS_ENV_VAR
        );
        let mut cmd = Command::new(&self.tool);
        cmd.arg("install")
            .arg(identifier)
            .env(PROGRESS_ENV_VAR, "1")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            error!("Failed to spawn {}: {}", self.tool, e);
            AskError::LaunchFailed(format!("could not run '{} install {identifier}': {e}", self.tool))
        })?;
        debug!("Installer running with pid {:?}", child.id());

        let stderr_tail = child.stderr.take().map(|s| tokio::spawn(collect_stderr(s)));
        Ok(InstallSession {
            identifier: identifier.to_string(),
            pipe_path,
            child,
            stderr_tail,
        })
    }
}

/// A running installer process and the pipe it is expected to report through.
pub struct InstallSession {
    identifier: String,
    pipe_path: PathBuf,
    child: Child,
    stderr_tail: Option<JoinHandle<Vec<String>>>,
}

impl InstallSession {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn pipe_path(&self) -> &Path {
        &self.pipe_path
    }

    /// Waits for the installer to exit. Cancel safe.
    pub async fn wait_exit(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Maps an observed exit into the session outcome.
    pub async fn into_outcome(mut self, exit: io::Result<ExitStatus>) -> InstallOutcome {
        match exit {
            Ok(status) if status.success() => {
                debug!("Installer for {} exited successfully", self.identifier);
                InstallOutcome::Succeeded
            }
            Ok(status) => {
                let tail = self.stderr_tail().await;
                error!("Installer for {} exited with {}", self.identifier, status);
                let mut reason = format!("'{}' installer exited with {status}", self.identifier);
                if !tail.is_empty() {
                    reason.push_str(":\n");
                    reason.push_str(&tail.join("\n"));
                }
                InstallOutcome::Failed(AskError::InstallFailed(reason))
            }
            Err(e) => {
                error!("Failed waiting for installer of {}: {}", self.identifier, e);
                InstallOutcome::Failed(AskError::InstallFailed(format!(
                    "could not wait for the installer: {e}"
                )))
            }
        }
    }

    async fn stderr_tail(&mut self) -> Vec<String> {
        let Some(handle) = self.stderr_tail.take() else {
            return Vec::new();
        };
        match tokio::time::timeout(STDERR_COLLECT_TIMEOUT, handle).await {
            Ok(Ok(lines)) => lines,
            _ => Vec::new(),
        }
    }
}

/// Drains stderr until EOF so the child never blocks on a full pipe or hits a
/// closed one; keeps the last lines. Lines are decoded lossily.
async fn collect_stderr(stderr: ChildStderr) -> Vec<String> {
    let mut reader = BufReader::new(stderr);
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                debug!(target: "dbin", "{}", line);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line.to_string());
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Reading installer stderr failed: {}", e);
                break;
            }
        }
    }
    tail.into()
}
