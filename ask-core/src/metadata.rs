// ask-core/src/metadata.rs
use ask_common::error::{AskError, Result};
use ask_common::model::PackageMetadata;
use tracing::debug;

use crate::process::run_command_sync;

/// Runs `<tool> info --json <identifier>` and parses its output. Blocks the caller.
pub fn fetch_metadata(tool: &str, identifier: &str) -> Result<PackageMetadata> {
    let unavailable = |reason: String| AskError::MetadataUnavailable(identifier.to_string(), reason);

    let output = run_command_sync(tool, &["info", "--json", identifier])
        .map_err(|e| unavailable(format!("could not run '{tool} info': {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.trim().lines().last().unwrap_or_default().to_string();
        return Err(unavailable(if detail.is_empty() {
            format!("'{tool} info' exited with {}", output.status)
        } else {
            format!("'{tool} info' exited with {}: {detail}", output.status)
        }));
    }

    let metadata: PackageMetadata = serde_json::from_slice(&output.stdout)
        .map_err(|e| unavailable(format!("unexpected '{tool} info' output: {e}")))?;
    debug!(
        "Fetched metadata for {} (version '{}')",
        metadata.id(),
        metadata.version
    );
    Ok(metadata)
}
