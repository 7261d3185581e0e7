// ask-core/src/request.rs
// Decodes `<scheme>://ask/install/<percent-encoded identifier>`.

use ask_common::error::{AskError, Result};
use ask_common::model::PackageId;

const ROUTE: &str = "ask/install";
const EXPECTED_SEGMENTS: usize = 5;

/// A decoded install request. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    identifier: String,
    package: PackageId,
}

impl InstallRequest {
    pub fn parse(uri: &str, scheme: &str) -> Result<Self> {
        let prefix = format!("{scheme}://{ROUTE}/");
        if !uri.starts_with(&prefix) {
            return Err(AskError::MalformedRequest(format!(
                "expected '{prefix}<package>', got '{uri}'"
            )));
        }

        let segments: Vec<&str> = uri.split('/').collect();
        if segments.len() != EXPECTED_SEGMENTS {
            return Err(AskError::MalformedRequest(format!(
                "expected {EXPECTED_SEGMENTS} '/'-separated segments, got {} in '{uri}'",
                segments.len()
            )));
        }

        let identifier = query_unescape(segments[EXPECTED_SEGMENTS - 1])?;
        if identifier.is_empty() {
            return Err(AskError::MalformedRequest(format!(
                "no package named in '{uri}'"
            )));
        }

        Ok(Self {
            package: PackageId::parse(&identifier),
            identifier,
        })
    }

    /// The decoded identifier exactly as requested; this is what the installer receives.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn package(&self) -> &PackageId {
        &self.package
    }

    pub fn to_uri(&self, scheme: &str) -> String {
        format!(
            "{scheme}://{ROUTE}/{}",
            urlencoding::encode(&self.identifier)
        )
    }
}

/// Query-string unescaping: `+` is a space and every `%` must start a two-digit hex escape.
fn query_unescape(encoded: &str) -> Result<String> {
    let bytes = encoded.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                let shown: String = encoded[i..].chars().take(3).collect();
                return Err(AskError::DecodeError(format!(
                    "invalid escape '{shown}' in '{encoded}'"
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = encoded.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| AskError::DecodeError(format!("'{encoded}' is not valid UTF-8: {e}")))
}
