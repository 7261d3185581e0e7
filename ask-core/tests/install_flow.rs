// End-to-end runs of the orchestration flow against a fake `dbin` script.
#![cfg(unix)]

use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ask_common::events::{InstallEvent, InstallOutcome};
use ask_common::Config;
use ask_core::install::MonitorState;
use ask_core::{
    fetch_metadata, start_install, InstallLauncher, InstallRequest, MonitorTimings, Teardown,
};
use tokio::sync::mpsc;

fn write_tool(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("dbin");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config_for(root: &Path, tool: &Path) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("DBIN_ASK_TOOL", tool.display().to_string()),
        ("DBIN_ASK_PIPE_DIR", root.join("pipes").display().to_string()),
        ("DBIN_ASK_SCRATCH_ROOT", root.join("scratch").display().to_string()),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

fn timings() -> MonitorTimings {
    MonitorTimings {
        poll_interval: Duration::from_millis(10),
        poll_attempts: 25,
        drain_grace: Duration::from_millis(100),
    }
}

#[tokio::test]
async fn confirmed_install_streams_progress_and_completes() {
    let tmp = tempfile::tempdir().unwrap();
    let request = InstallRequest::parse("dbin://ask/install/tool%23stable", "dbin").unwrap();
    assert_eq!(request.identifier(), "tool#stable");

    let config = config_for(tmp.path(), &tmp.path().join("dbin"));
    let pipe = config.pipe_path(request.package());
    fs::create_dir_all(pipe.parent().unwrap()).unwrap();
    write_tool(
        tmp.path(),
        &format!(
            r#"case "$1" in
info) printf '%s' '{{"pkg":"tool","pkg_id":"stable","version":"2.1.0"}}' ;;
install) mkfifo '{p}'; printf '0\n12.5\n12.5\n47.0\n100\n' > '{p}'; rm -f '{p}' ;;
*) exit 64 ;;
esac"#,
            p = pipe.display()
        ),
    );

    let metadata = fetch_metadata(config.tool(), request.identifier()).unwrap();
    assert_eq!(metadata.version, "2.1.0");
    assert_eq!(config.pipe_path(&metadata.id()), pipe);

    let scratch = config.scratch_dir(&metadata.id());
    fs::create_dir_all(&scratch).unwrap();
    let teardown = Arc::new(Teardown::new(&scratch));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = start_install(
        &InstallLauncher::from_config(&config),
        request.identifier(),
        pipe,
        timings(),
        tx,
    )
    .unwrap();
    let report = handle.await.unwrap();

    let mut values = Vec::new();
    let mut finished = 0;
    while let Some(event) = rx.recv().await {
        match event {
            InstallEvent::Progress { percent } => values.push(percent),
            InstallEvent::Finished(outcome) => {
                assert!(outcome.is_success());
                finished += 1;
            }
            _ => {}
        }
    }
    assert_eq!(values, vec![0.0, 12.5, 47.0, 100.0]);
    assert_eq!(finished, 1);
    assert_eq!(report.states.last(), Some(&MonitorState::Completed));

    assert!(teardown.run());
    assert!(!scratch.exists());
}

#[tokio::test]
async fn failed_install_without_pipe_still_cleans_up() {
    let tmp = tempfile::tempdir().unwrap();
    let tool = write_tool(tmp.path(), "[ \"$1\" = install ] && exit 1; exit 64");
    let config = config_for(tmp.path(), &tool);
    let request = InstallRequest::parse("dbin://ask/install/tool", "dbin").unwrap();

    let scratch = config.scratch_dir(request.package());
    fs::create_dir_all(&scratch).unwrap();
    fs::write(scratch.join("icon-00000000.png"), b"png").unwrap();
    let teardown = Arc::new(Teardown::new(&scratch));

    let (tx, _rx) = mpsc::unbounded_channel();
    let report = start_install(
        &InstallLauncher::from_config(&config),
        request.identifier(),
        config.pipe_path(request.package()),
        timings(),
        tx,
    )
    .unwrap()
    .await
    .unwrap();

    assert!(matches!(report.outcome, InstallOutcome::Failed(_)));
    assert!(report.states.contains(&MonitorState::BlindWait));
    assert_eq!(report.states.last(), Some(&MonitorState::Failed));

    assert!(teardown.run());
    assert!(!scratch.exists());
    assert!(!teardown.run());
}

#[tokio::test]
async fn launch_failure_is_reported_before_monitoring() {
    let tmp = tempfile::tempdir().unwrap();
    let launcher = InstallLauncher::new(tmp.path().join("missing-dbin").display().to_string());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let result = start_install(&launcher, "tool", tmp.path().join("pipe"), timings(), tx);

    assert!(matches!(
        result,
        Err(ask_common::AskError::LaunchFailed(_))
    ));
    assert!(rx.recv().await.is_none());
}
