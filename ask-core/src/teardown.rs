// ask-core/src/teardown.rs
// Session cleanup that runs exactly once, from whichever of the normal exit path
// and the signal handler gets there first.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Teardown {
    /// `Some` until the first `run`. Held for the whole removal so a racing
    /// caller returns only once the directory is gone.
    pending: Mutex<Option<PathBuf>>,
}

impl Teardown {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            pending: Mutex::new(Some(scratch_dir.into())),
        }
    }

    pub fn has_run(&self) -> bool {
        self.lock().is_none()
    }

    /// Removes the scratch directory. Returns `false` if teardown already happened.
    pub fn run(&self) -> bool {
        let mut pending = self.lock();
        let Some(dir) = pending.take() else {
            debug!("Teardown already ran");
            return false;
        };
        match fs::remove_dir_all(&dir) {
            Ok(()) => debug!("Removed scratch directory {}", dir.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Scratch directory {} already gone", dir.display())
            }
            Err(e) => warn!(
                "Failed to remove scratch directory {}: {}",
                dir.display(),
                e
            ),
        }
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PathBuf>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Exit status used when the process is stopped by a signal.
pub const SIGNAL_EXIT_CODE: i32 = 1;

/// Listens for SIGINT/SIGTERM for the rest of the process lifetime; on receipt
/// runs teardown and exits. A running installer is left alone.
#[cfg(unix)]
pub fn spawn_signal_listener(teardown: Arc<Teardown>) -> io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(tokio::spawn(async move {
        let name = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        };
        warn!("Received {}, cleaning up", name);
        teardown.run();
        std::process::exit(SIGNAL_EXIT_CODE);
    }))
}

#[cfg(not(unix))]
pub fn spawn_signal_listener(teardown: Arc<Teardown>) -> io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl-C, cleaning up");
            teardown.run();
            std::process::exit(SIGNAL_EXIT_CODE);
        }
    }))
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn removes_directory_once() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = tmp.path().join("dbinAsk-0011223344556677");
        fs::create_dir_all(scratch.join("nested")).unwrap();
        fs::write(scratch.join("nested/icon.png"), b"png").unwrap();

        let teardown = Teardown::new(&scratch);
        assert!(!teardown.has_run());
        assert!(teardown.run());
        assert!(!scratch.exists());
        assert!(teardown.has_run());

        // A directory recreated afterwards is not touched by a second call.
        fs::create_dir_all(&scratch).unwrap();
        assert!(!teardown.run());
        assert!(scratch.exists());
    }

    #[test]
    fn missing_directory_still_counts_as_run() {
        let tmp = tempfile::tempdir().unwrap();
        let teardown = Teardown::new(tmp.path().join("never-created"));
        assert!(teardown.run());
        assert!(!teardown.run());
    }

    #[test]
    fn racing_callers_run_it_exactly_once() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = tmp.path().join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        let teardown = Arc::new(Teardown::new(&scratch));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let teardown = Arc::clone(&teardown);
                thread::spawn(move || teardown.run())
            })
            .collect();
        let ran: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();

        assert_eq!(ran, 1);
        assert!(!scratch.exists());
    }
}
