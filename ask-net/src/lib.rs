// ask-net/src/lib.rs
pub mod http;
pub mod resource;

pub use http::{build_http_client, validate_url};
pub use resource::{HttpSource, ResourceCache, ResourceSource};
