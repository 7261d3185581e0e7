// ask-core/src/process.rs
use std::process::{Command, Output, Stdio};

use ask_common::error::Result;
use tracing::{debug, error};

/// Runs an external command to completion, capturing stdout and stderr.
///
/// A non-zero exit is not an error here; callers inspect `output.status`.
pub fn run_command_sync(program: &str, args: &[&str]) -> Result<Output> {
    debug!("Running command: {} {:?}", program, args);
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.stdin(Stdio::null());

    match cmd.output() {
        Ok(output) => {
            if !output.status.success() {
                debug!("Command failed with status: {}", output.status);
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stderr.trim().is_empty() {
                    debug!("Stderr:\n{}", stderr.trim());
                }
            } else {
                debug!("Command finished successfully.");
            }
            Ok(output)
        }
        Err(e) => {
            error!("Failed to execute {}: {}", program, e);
            Err(e.into())
        }
    }
}
