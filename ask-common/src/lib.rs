// ask-common/src/lib.rs
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod naming;

// Re-export key types
pub use config::Config;
pub use error::{AskError, Result};
pub use model::{CachedResource, PackageId, PackageMetadata, ResourceKind};
