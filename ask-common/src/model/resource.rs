use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Icon,
    Screenshot,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Icon => "icon",
            ResourceKind::Screenshot => "screenshot",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A downloaded auxiliary asset, keyed by its source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResource {
    pub kind: ResourceKind,
    pub source_url: String,
    pub local_path: PathBuf,
}
