// ask-core/src/install/pipe.rs
// Progress pipe wire format: one ASCII decimal in [0, 100] per line, nothing else.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipeEvent {
    Progress(f64),
    EndOfStream,
}

/// The only place wire text becomes a value. Anything unusable is `None`.
pub fn parse_progress_line(line: &str) -> Option<f64> {
    let value: f64 = line.trim().parse().ok()?;
    (value.is_finite() && (0.0..=100.0).contains(&value)).then_some(value)
}

/// Checks for `path` every `interval`, at most `attempts` times.
pub async fn wait_for_pipe(path: PathBuf, interval: Duration, attempts: u32) -> bool {
    for attempt in 1..=attempts {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("Progress pipe {} found after {} checks", path.display(), attempt);
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    false
}

/// Reads the pipe on the blocking pool and forwards parsed lines.
///
/// The stream always ends with exactly one `EndOfStream`, including when the
/// pipe cannot be opened or read.
pub fn spawn_pipe_reader(path: PathBuf) -> mpsc::UnboundedReceiver<PipeEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        match File::open(&path) {
            Ok(file) => {
                for line in BufReader::new(file).split(b'\n') {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            warn!("Error reading progress pipe {}: {}", path.display(), e);
                            break;
                        }
                    };
                    let text = String::from_utf8_lossy(&line);
                    match parse_progress_line(&text) {
                        Some(value) => {
                            if tx.send(PipeEvent::Progress(value)).is_err() {
                                return;
                            }
                        }
                        None => trace!("Ignoring progress line {:?}", text),
                    }
                }
            }
            Err(e) => warn!("Cannot open progress pipe {}: {}", path.display(), e),
        }
        let _ = tx.send(PipeEvent::EndOfStream);
    });
    rx
}

/// Opens and immediately closes the write side so a reader parked in `open(2)`
/// on a FIFO nobody will write to can return. Does nothing if no reader waits.
#[cfg(unix)]
pub(crate) fn release_blocked_reader(path: &Path) {
    use std::fs::OpenOptions;
    use std::os::unix::fs::OpenOptionsExt;

    match OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
    {
        Ok(_writer) => debug!("Released reader blocked on {}", path.display()),
        Err(e) => debug!("No blocked reader on {}: {}", path.display(), e),
    }
}

#[cfg(not(unix))]
pub(crate) fn release_blocked_reader(_path: &Path) {}
