// ask-common/src/config.rs
use std::env;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use super::error::Result;
use crate::model::PackageId;
use crate::naming::{session_tag, PipeNaming};

const DEFAULT_TOOL: &str = "dbin";
const DEFAULT_SCHEME: &str = "dbin";
/// Set to `1` in the installer's environment to make it report progress over the pipe.
pub const PROGRESS_ENV_VAR: &str = "DBIN_PB_FIFO";

#[derive(Debug, Clone)]
pub struct Config {
    pub tool: String,
    pub scheme: String,
    pub pipe_dir: PathBuf,
    pub pipe_naming: PipeNaming,
    pub scratch_root: PathBuf,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading dbin-ask configuration");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; `load` feeds it the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let tool = var("DBIN_ASK_TOOL").unwrap_or_else(|| DEFAULT_TOOL.to_string());
        let scheme = var("DBIN_ASK_SCHEME").unwrap_or_else(|| DEFAULT_SCHEME.to_string());

        let pipe_naming = match var("DBIN_ASK_PIPE_NAMING") {
            Some(raw) => raw.parse()?,
            None => PipeNaming::default(),
        };

        let temp = env::temp_dir();
        let pipe_dir = var("DBIN_ASK_PIPE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| temp.join("dbin"));
        let scratch_root = var("DBIN_ASK_SCRATCH_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| temp.clone());

        let log_dir = var("DBIN_ASK_LOG_DIR")
            .map(PathBuf::from)
            .or_else(|| {
                ProjectDirs::from("", "", "dbin-ask").map(|dirs| dirs.cache_dir().join("logs"))
            })
            .unwrap_or_else(|| temp.join("dbin-ask-logs"));

        debug!(
            "Effective tool '{}', scheme '{}', pipe dir {} ({:?}), scratch root {}",
            tool,
            scheme,
            pipe_dir.display(),
            pipe_naming,
            scratch_root.display()
        );

        Ok(Self {
            tool,
            scheme,
            pipe_dir,
            pipe_naming,
            scratch_root,
            log_dir,
        })
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Per-package scratch directory for downloaded icons and screenshots.
    pub fn scratch_dir(&self, id: &PackageId) -> PathBuf {
        self.scratch_root.join(session_tag(id))
    }

    /// Where the installer is expected to create its progress pipe.
    pub fn pipe_path(&self, id: &PackageId) -> PathBuf {
        self.pipe_naming.pipe_path(&self.pipe_dir, id)
    }

    pub fn logs_dir(&self) -> &Path {
        &self.log_dir
    }
}
