// ask-core/src/install/mod.rs
pub mod launcher;
pub mod monitor;
pub mod pipe;

use std::path::PathBuf;

use ask_common::error::Result;
use ask_common::events::InstallEvent;
pub use launcher::{InstallLauncher, InstallSession};
pub use monitor::{MonitorReport, MonitorState, MonitorTimings, ProgressMonitor};
pub use pipe::{parse_progress_line, PipeEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Launches the installer and hands it to a monitor running on its own task.
///
/// A launch failure is returned directly; everything after that is reported
/// through `events` and the returned report.
pub fn start_install(
    launcher: &InstallLauncher,
    identifier: &str,
    pipe_path: PathBuf,
    timings: MonitorTimings,
    events: mpsc::UnboundedSender<InstallEvent>,
) -> Result<JoinHandle<MonitorReport>> {
    let session = launcher.start(identifier, pipe_path)?;
    Ok(ProgressMonitor::new(events, timings).spawn(session))
}
