// ask-common/src/model/mod.rs
pub mod package;
pub mod resource;

pub use package::{PackageId, PackageMetadata};
pub use resource::{CachedResource, ResourceKind};
