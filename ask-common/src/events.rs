// ask-common/src/events.rs
use std::path::PathBuf;

use crate::error::AskError;

/// Terminal result of an install session.
#[derive(Debug, Clone)]
pub enum InstallOutcome {
    Succeeded,
    Failed(AskError),
    /// The session ended without an observed exit status.
    Interrupted,
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InstallOutcome::Succeeded)
    }
}

/// Published by the progress monitor for whatever presentation layer is attached.
#[derive(Debug, Clone)]
pub enum InstallEvent {
    Launched {
        target_id: String,
        pipe_path: PathBuf,
    },
    PipeFound {
        pipe_path: PathBuf,
    },
    /// Informational: no progress will be reported, installation continues.
    PipeUnavailable {
        message: String,
    },
    Progress {
        percent: f64,
    },
    Finished(InstallOutcome),
}

impl InstallEvent {
    pub fn pipe_unavailable(error: &AskError) -> Self {
        InstallEvent::PipeUnavailable {
            message: error.to_string(),
        }
    }
}
