use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AskError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Malformed install request: {0}")]
    MalformedRequest(String),

    #[error("Could not decode install request: {0}")]
    DecodeError(String),

    #[error("Package metadata unavailable for '{0}': {1}")]
    MetadataUnavailable(String, String),

    #[error("Failed to download {0} from '{1}': {2}")]
    DownloadFailed(String, String, String),

    #[error("Failed to start installation: {0}")]
    LaunchFailed(String),

    #[error("Progress pipe unavailable: {0}")]
    PipeUnavailable(String),

    #[error("Installation failed: {0}")]
    InstallFailed(String),
}

impl From<std::io::Error> for AskError {
    fn from(err: std::io::Error) -> Self {
        AskError::Io(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, AskError>;
