// ask-core/src/test_support.rs
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ask_common::events::InstallEvent;
use tokio::sync::mpsc;

use crate::install::MonitorTimings;

/// Writes an executable `sh` script standing in for the package manager.
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub(crate) fn fast_timings() -> MonitorTimings {
    MonitorTimings {
        poll_interval: Duration::from_millis(10),
        poll_attempts: 20,
        drain_grace: Duration::from_millis(50),
    }
}

/// Collects every progress value until the monitor drops its sender.
pub(crate) async fn progress_values(rx: &mut mpsc::UnboundedReceiver<InstallEvent>) -> Vec<f64> {
    let mut values = Vec::new();
    while let Some(event) = rx.recv().await {
        if let InstallEvent::Progress { percent } = event {
            values.push(percent);
        }
    }
    values
}
