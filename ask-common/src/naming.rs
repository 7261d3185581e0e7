// ask-common/src/naming.rs
// Stable names shared with the external installer. Changing anything here breaks
// the pipe handshake with already-released dbin builds.
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::{AskError, Result};
use crate::model::PackageId;

pub const SESSION_TAG_PREFIX: &str = "dbinAsk-";

/// `dbinAsk-` followed by the hex of the first 8 bytes of SHA-256 over the display id.
pub fn session_tag(id: &PackageId) -> String {
    let digest = Sha256::digest(id.to_string().as_bytes());
    format!("{SESSION_TAG_PREFIX}{}", hex::encode(&digest[..8]))
}

/// How the progress pipe file name is derived from the package id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipeNaming {
    /// `<pipe dir>/dbinAsk-<hash>`, same tag as the scratch directory.
    #[default]
    Hashed,
    /// `<pipe dir>/<name#qualifier>`, the layout older installers create.
    Plain,
}

impl PipeNaming {
    pub fn pipe_path(&self, pipe_dir: &Path, id: &PackageId) -> PathBuf {
        match self {
            PipeNaming::Hashed => pipe_dir.join(session_tag(id)),
            PipeNaming::Plain => pipe_dir.join(id.to_string()),
        }
    }
}

impl FromStr for PipeNaming {
    type Err = AskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashed" | "v1" => Ok(PipeNaming::Hashed),
            "plain" | "v0" => Ok(PipeNaming::Plain),
            other => Err(AskError::Config(format!(
                "Unknown pipe naming scheme '{other}' (expected 'hashed' or 'plain')"
            ))),
        }
    }
}
