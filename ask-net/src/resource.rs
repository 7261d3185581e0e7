// ask-net/src/resource.rs
// Deduplicating download cache for icons and screenshots.

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

use ask_common::error::Result;
use ask_common::model::{CachedResource, PackageMetadata, ResourceKind};
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use url::Url;

use crate::http::{build_http_client, download_to, validate_url};

/// Transport used by [`ResourceCache`] to materialize a remote resource on disk.
pub trait ResourceSource {
    fn fetch_to(
        &self,
        kind: ResourceKind,
        url: &Url,
        dest: &Path,
    ) -> impl Future<Output = Result<()>> + Send;
}

pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(build_http_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl ResourceSource for HttpSource {
    async fn fetch_to(&self, kind: ResourceKind, url: &Url, dest: &Path) -> Result<()> {
        download_to(&self.client, kind, url, dest).await.map(|_| ())
    }
}

/// Owns the per-package scratch directory and the list of resources downloaded into it.
///
/// Each distinct source URL is downloaded at most once per session. The directory
/// itself is removed by the session teardown, not by this type.
pub struct ResourceCache<S = HttpSource> {
    scratch_dir: PathBuf,
    resources: Vec<CachedResource>,
    source: S,
}

impl ResourceCache<HttpSource> {
    pub fn create(scratch_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_source(scratch_dir, HttpSource::new()?)
    }
}

impl<S: ResourceSource> ResourceCache<S> {
    pub fn with_source(scratch_dir: impl Into<PathBuf>, source: S) -> Result<Self> {
        let scratch_dir = scratch_dir.into();
        create_private_dir(&scratch_dir)?;
        debug!("Using scratch directory {}", scratch_dir.display());
        Ok(Self {
            scratch_dir,
            resources: Vec::new(),
            source,
        })
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn resources(&self) -> &[CachedResource] {
        &self.resources
    }

    /// `<kind>-<first 4 bytes of sha256(url) as hex><.ext>`; the extension comes from
    /// the URL path so query strings never leak into file names.
    pub fn file_name_for(kind: ResourceKind, url_str: &str, url: &Url) -> String {
        let digest = Sha256::digest(url_str.as_bytes());
        let ext = Path::new(url.path())
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        format!("{}-{}{}", kind, hex::encode(&digest[..4]), ext)
    }

    /// Returns the local path for `url`, downloading it on first request only.
    pub async fn fetch(&mut self, url_str: &str, kind: ResourceKind) -> Result<PathBuf> {
        if let Some(hit) = self.resources.iter().find(|r| r.source_url == url_str) {
            debug!("Cache hit for {} {}", kind, url_str);
            return Ok(hit.local_path.clone());
        }

        let url = validate_url(kind, url_str)?;
        let local_path = self
            .scratch_dir
            .join(Self::file_name_for(kind, url_str, &url));

        self.source.fetch_to(kind, &url, &local_path).await?;

        debug!("Cached {} {} at {}", kind, url_str, local_path.display());
        self.resources.push(CachedResource {
            kind,
            source_url: url_str.to_string(),
            local_path: local_path.clone(),
        });
        Ok(local_path)
    }

    /// Fetches the icon and every screenshot. Failures are logged and skipped.
    pub async fn fetch_all(&mut self, metadata: &PackageMetadata) -> Vec<CachedResource> {
        let mut wanted: Vec<(ResourceKind, &str)> = Vec::new();
        if let Some(icon) = metadata.icon_url() {
            wanted.push((ResourceKind::Icon, icon));
        }
        wanted.extend(
            metadata
                .screenshots
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| (ResourceKind::Screenshot, s)),
        );

        let mut fetched = Vec::with_capacity(wanted.len());
        for (kind, url) in wanted {
            match self.fetch(url, kind).await {
                Ok(local_path) => fetched.push(CachedResource {
                    kind,
                    source_url: url.to_string(),
                    local_path,
                }),
                Err(e) => warn!("Failed to load {}: {}", kind, e),
            }
        }
        fetched
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o750).create(dir)?;
    Ok(())
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}
