// ask-core/src/install/monitor.rs
// Drives one install session from launch to a terminal outcome:
//
//   AwaitingPipe -> StreamingProgress -> AwaitingExit -> Completed | Failed
//   AwaitingPipe -> BlindWait         -> AwaitingExit -> Completed | Failed

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use ask_common::error::AskError;
use ask_common::events::{InstallEvent, InstallOutcome};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::launcher::InstallSession;
use super::pipe::{release_blocked_reader, spawn_pipe_reader, wait_for_pipe, PipeEvent};

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const POLL_ATTEMPTS: u32 = 50;
/// How long to keep reading after the installer has already exited.
pub const DRAIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorTimings {
    pub poll_interval: Duration,
    pub poll_attempts: u32,
    pub drain_grace: Duration,
}

impl Default for MonitorTimings {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            poll_attempts: POLL_ATTEMPTS,
            drain_grace: DRAIN_GRACE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    AwaitingPipe,
    StreamingProgress,
    BlindWait,
    AwaitingExit,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub outcome: InstallOutcome,
    /// Every state entered, in order.
    pub states: Vec<MonitorState>,
}

pub struct ProgressMonitor {
    timings: MonitorTimings,
    events: mpsc::UnboundedSender<InstallEvent>,
    last_percent: Option<f64>,
    states: Vec<MonitorState>,
}

impl ProgressMonitor {
    pub fn new(events: mpsc::UnboundedSender<InstallEvent>, timings: MonitorTimings) -> Self {
        Self {
            timings,
            events,
            last_percent: None,
            states: Vec::new(),
        }
    }

    /// Runs the monitor on its own task.
    pub fn spawn(self, session: InstallSession) -> JoinHandle<MonitorReport> {
        tokio::spawn(self.run(session))
    }

    pub async fn run(mut self, mut session: InstallSession) -> MonitorReport {
        let pipe_path = session.pipe_path().to_path_buf();
        self.emit(InstallEvent::Launched {
            target_id: session.identifier().to_string(),
            pipe_path: pipe_path.clone(),
        });

        self.enter(MonitorState::AwaitingPipe);
        let poll = tokio::spawn(wait_for_pipe(
            pipe_path.clone(),
            self.timings.poll_interval,
            self.timings.poll_attempts,
        ));
        let pipe_found = poll.await.unwrap_or(false);

        let early_exit = if pipe_found {
            self.enter(MonitorState::StreamingProgress);
            self.emit(InstallEvent::PipeFound {
                pipe_path: pipe_path.clone(),
            });
            self.stream_progress(&mut session).await
        } else {
            let notice = AskError::PipeUnavailable(format!(
                "{} did not appear within {:?}; installation is continuing",
                pipe_path.display(),
                self.timings.poll_interval * self.timings.poll_attempts
            ));
            info!("{}", notice);
            self.emit(InstallEvent::pipe_unavailable(&notice));
            self.enter(MonitorState::BlindWait);
            None
        };

        self.enter(MonitorState::AwaitingExit);
        let exit = match early_exit {
            Some(exit) => exit,
            None => session.wait_exit().await,
        };
        let outcome = session.into_outcome(exit).await;

        self.publish_percent(100.0);
        self.enter(if outcome.is_success() {
            MonitorState::Completed
        } else {
            MonitorState::Failed
        });
        self.emit(InstallEvent::Finished(outcome.clone()));

        MonitorReport {
            outcome,
            states: self.states,
        }
    }

    /// Reads the pipe until the writer closes it. If the installer exits first the
    /// remaining lines are drained and its exit status is handed back.
    async fn stream_progress(
        &mut self,
        session: &mut InstallSession,
    ) -> Option<io::Result<ExitStatus>> {
        let mut stream = spawn_pipe_reader(session.pipe_path().to_path_buf());

        let exit = loop {
            tokio::select! {
                biased;
                event = stream.recv() => match event {
                    Some(PipeEvent::Progress(value)) => self.publish_percent(value),
                    Some(PipeEvent::EndOfStream) | None => return None,
                },
                exit = session.wait_exit() => break exit,
            }
        };

        debug!("Installer exited while the progress pipe was still open");
        if !self.drain(&mut stream).await {
            release_blocked_reader(session.pipe_path());
            if !self.drain(&mut stream).await {
                warn!(
                    "Progress pipe {} never closed; continuing without it",
                    session.pipe_path().display()
                );
            }
        }
        Some(exit)
    }

    /// Consumes events until end of stream or the grace period runs out.
    async fn drain(&mut self, stream: &mut mpsc::UnboundedReceiver<PipeEvent>) -> bool {
        let deadline = tokio::time::sleep(self.timings.drain_grace);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                event = stream.recv() => match event {
                    Some(PipeEvent::Progress(value)) => self.publish_percent(value),
                    Some(PipeEvent::EndOfStream) | None => return true,
                },
                _ = &mut deadline => return false,
            }
        }
    }

    /// Publishes a new percentage unless it repeats the last one.
    fn publish_percent(&mut self, percent: f64) {
        if self.last_percent == Some(percent) {
            return;
        }
        self.last_percent = Some(percent);
        self.emit(InstallEvent::Progress { percent });
    }

    fn enter(&mut self, state: MonitorState) {
        debug!("Install monitor -> {:?}", state);
        self.states.push(state);
    }

    fn emit(&self, event: InstallEvent) {
        // A detached presentation layer is not an error.
        let _ = self.events.send(event);
    }
}
