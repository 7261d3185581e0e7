use std::fs;
use std::path::Path;
use std::time::Duration;

use ask_common::error::{AskError, Result};
use ask_common::model::ResourceKind;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use tokio::fs::File as TokioFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

const DOWNLOAD_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 15;
const USER_AGENT_STRING: &str = concat!("dbin-ask/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    Client::builder()
        .user_agent(USER_AGENT_STRING)
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| AskError::Config(format!("Failed to build HTTP client: {e}")))
}

/// Parses a resource URL, accepting only http and https.
pub fn validate_url(kind: ResourceKind, url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str).map_err(|e| {
        AskError::DownloadFailed(kind.to_string(), url_str.to_string(), format!("invalid URL: {e}"))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AskError::DownloadFailed(
            kind.to_string(),
            url_str.to_string(),
            format!("unsupported URL scheme '{other}'"),
        )),
    }
}

/// GETs `url` into a hidden sibling of `final_path`, then renames it into place.
pub async fn download_to(
    client: &Client,
    kind: ResourceKind,
    url: &Url,
    final_path: &Path,
) -> Result<u64> {
    let failed = |reason: String| AskError::DownloadFailed(kind.to_string(), url.to_string(), reason);

    let temp_filename = format!(
        ".{}.download",
        final_path.file_name().unwrap_or_default().to_string_lossy()
    );
    let temp_path = final_path.with_file_name(temp_filename);
    debug!("Downloading {} to temporary path: {}", url, temp_path.display());

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| failed(format!("HTTP request failed: {e}")))?;
    let status = response.status();
    debug!("Received HTTP status: {} for {}", status, url);
    if !status.is_success() {
        return Err(failed(format!("HTTP status {status}")));
    }

    let content = response
        .bytes()
        .await
        .map_err(|e| failed(format!("Failed to read response body: {e}")))?;

    let write_result = async {
        let mut temp_file = TokioFile::create(&temp_path).await?;
        temp_file.write_all(&content).await?;
        temp_file.flush().await?;
        drop(temp_file);
        fs::rename(&temp_path, final_path)
    }
    .await;

    if let Err(e) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(failed(format!(
            "Failed to write {}: {}",
            final_path.display(),
            e
        )));
    }

    debug!(
        "Stored {} bytes at final location: {}",
        content.len(),
        final_path.display()
    );
    Ok(content.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_only() {
        assert!(validate_url(ResourceKind::Icon, "https://example.com/i.png").is_ok());
        assert!(validate_url(ResourceKind::Icon, "http://example.com/i.png").is_ok());
        assert!(matches!(
            validate_url(ResourceKind::Icon, "file:///etc/passwd"),
            Err(AskError::DownloadFailed(..))
        ));
        assert!(matches!(
            validate_url(ResourceKind::Screenshot, "not a url"),
            Err(AskError::DownloadFailed(..))
        ));
    }
}
