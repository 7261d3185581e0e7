// ask/src/ui.rs
//! Terminal presentation: package summary, confirmation prompt and install progress.

use std::fmt::Write as _;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use ask_common::error::{AskError, Result};
use ask_common::events::{InstallEvent, InstallOutcome};
use ask_common::model::{CachedResource, PackageMetadata, ResourceKind};
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

const BAR_LENGTH: u64 = 1000;

/// Plain-text rendering of the description, details and notes sections.
pub fn render_summary(metadata: &PackageMetadata, resources: &[CachedResource]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("Install {}", metadata.id()).bold());

    let _ = writeln!(out, "\n{}", "DESCRIPTION".blue().bold());
    let description = metadata.description.trim();
    if description.is_empty() {
        let _ = writeln!(out, "  No description available");
    } else {
        for line in description.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }

    let _ = writeln!(out, "\n{}", "DETAILS".blue().bold());
    let details = metadata.detail_fields();
    if details.is_empty() {
        let _ = writeln!(out, "  No metadata available");
    }
    for (label, value) in details {
        let _ = writeln!(out, "  {}: {}", label.bold(), value);
    }

    let _ = writeln!(out, "\n{}", "NOTES".blue().bold());
    if metadata.notes.is_empty() {
        let _ = writeln!(out, "  No notes available");
    }
    for note in &metadata.notes {
        let _ = writeln!(out, "  - {note}");
    }

    let screenshots = resources
        .iter()
        .filter(|r| r.kind == ResourceKind::Screenshot)
        .count();
    if !resources.is_empty() {
        let _ = writeln!(out, "\n{}", "RESOURCES".blue().bold());
        for resource in resources {
            let _ = writeln!(
                out,
                "  {}: {}",
                resource.kind,
                resource.local_path.display()
            );
        }
    }
    if screenshots == 0 {
        let _ = writeln!(out, "\n  No screenshots available");
    }
    out
}

pub fn print_summary(metadata: &PackageMetadata, resources: &[CachedResource]) {
    println!("{}", render_summary(metadata, resources));
}

/// Asks whether to proceed. Fails when there is no terminal to ask on.
pub fn confirm(display_id: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!(
            "Do you wish to proceed with the installation of {display_id}?"
        ))
        .default(true)
        .interact()
        .map_err(|e| {
            AskError::Io(Arc::new(io::Error::other(format!(
                "confirmation prompt failed (use --yes when not on a terminal): {e}"
            ))))
        })
}

/// Status line shown for an install event, if the event changes it.
pub fn status_message(event: &InstallEvent) -> Option<String> {
    match event {
        InstallEvent::Launched { target_id, .. } => {
            Some(format!("Installation of {target_id} in progress..."))
        }
        InstallEvent::PipeFound { .. } => Some("Monitoring installation progress...".to_string()),
        InstallEvent::PipeUnavailable { .. } => {
            Some("Progress monitoring unavailable, installation continuing...".to_string())
        }
        InstallEvent::Progress { percent } => Some(format!("Installing... {percent:.1}%")),
        InstallEvent::Finished(InstallOutcome::Succeeded) => {
            Some("Installation completed successfully".to_string())
        }
        InstallEvent::Finished(_) => Some("Installation failed".to_string()),
    }
}

/// Renders monitor events on a single progress line.
pub struct ProgressView {
    bar: ProgressBar,
}

impl ProgressView {
    pub fn new(display_id: &str) -> Self {
        let bar = ProgressBar::new(BAR_LENGTH);
        bar.set_style(spinner_style());
        bar.set_prefix(display_id.to_string());
        bar.set_message("Starting installation...");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn handle(&mut self, event: &InstallEvent) {
        match event {
            InstallEvent::PipeFound { .. } => self.bar.set_style(bar_style()),
            InstallEvent::PipeUnavailable { .. } => self.bar.println(format!(
                "{} Progress information not available. Installation is continuing.",
                "Notice:".yellow().bold()
            )),
            InstallEvent::Progress { percent } => {
                self.bar.set_position((percent * 10.0).round() as u64);
            }
            InstallEvent::Finished(outcome) => {
                self.bar.set_style(bar_style());
                self.bar.set_position(BAR_LENGTH);
                let message = status_message(event).unwrap_or_default();
                let message = if outcome.is_success() {
                    message.green().bold().to_string()
                } else {
                    message.red().bold().to_string()
                };
                self.bar.finish_with_message(message);
                return;
            }
            InstallEvent::Launched {
                target_id,
                pipe_path,
            } => debug!(
                "Installer for {} started; expecting progress pipe at {}",
                target_id,
                pipe_path.display()
            ),
        }
        if let Some(message) = status_message(event) {
            self.bar.set_message(message);
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue.bold} {prefix:.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue.bold} {prefix:.bold} [{bar:40.cyan/blue}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn summary_lists_details_and_resources() {
        let metadata = PackageMetadata {
            name: "tool".into(),
            pkg_id: "stable".into(),
            version: "2.1.0".into(),
            description: "A tool.".into(),
            notes: vec!["Needs FUSE".into()],
            ..Default::default()
        };
        let resources = vec![CachedResource {
            kind: ResourceKind::Screenshot,
            source_url: "https://example.com/a.png".into(),
            local_path: PathBuf::from("/tmp/dbinAsk-x/screenshot-1.png"),
        }];
        colored::control::set_override(false);
        let text = render_summary(&metadata, &resources);
        assert!(text.contains("Install tool#stable"));
        assert!(text.contains("Version: 2.1.0"));
        assert!(text.contains("- Needs FUSE"));
        assert!(text.contains("screenshot: /tmp/dbinAsk-x/screenshot-1.png"));
        assert!(!text.contains("No screenshots available"));
    }

    #[test]
    fn summary_falls_back_when_empty() {
        colored::control::set_override(false);
        let metadata = PackageMetadata {
            name: "tool".into(),
            ..Default::default()
        };
        let text = render_summary(&metadata, &[]);
        assert!(text.contains("No description available"));
        assert!(text.contains("No metadata available"));
        assert!(text.contains("No notes available"));
        assert!(text.contains("No screenshots available"));
    }

    #[test]
    fn status_messages_follow_events() {
        let launched = InstallEvent::Launched {
            target_id: "tool#stable".into(),
            pipe_path: PathBuf::from("/tmp/dbin/dbinAsk-f74cd7423cebc4c1"),
        };
        assert_eq!(
            status_message(&launched).as_deref(),
            Some("Installation of tool#stable in progress...")
        );
        assert_eq!(
            status_message(&InstallEvent::Progress { percent: 12.5 }).as_deref(),
            Some("Installing... 12.5%")
        );
        assert_eq!(
            status_message(&InstallEvent::Finished(InstallOutcome::Interrupted)).as_deref(),
            Some("Installation failed")
        );
    }
}
