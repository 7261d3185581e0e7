use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Name plus optional qualifier selecting one installable unit, e.g. `tool#stable`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId {
    name: String,
    qualifier: Option<String>,
}

impl PackageId {
    pub const SEPARATOR: char = '#';

    pub fn new(name: impl Into<String>, qualifier: Option<String>) -> Self {
        Self {
            name: name.into(),
            qualifier: qualifier.filter(|q| !q.is_empty()),
        }
    }

    /// Splits on the first `#`. Anything after it is the qualifier.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(Self::SEPARATOR) {
            Some((name, qualifier)) => Self::new(name, Some(qualifier.to_string())),
            None => Self::new(raw, None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}{}{}", self.name, Self::SEPARATOR, q),
            None => f.write_str(&self.name),
        }
    }
}

/// Output of `dbin info --json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageMetadata {
    #[serde(rename = "pkg", alias = "name")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pkg_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub build_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub license: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub screenshots: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PackageMetadata {
    pub fn id(&self) -> PackageId {
        PackageId::new(self.name.clone(), Some(self.pkg_id.clone()))
    }

    pub fn icon_url(&self) -> Option<&str> {
        Some(self.icon.trim()).filter(|s| !s.is_empty())
    }

    /// Non-empty detail rows in display order.
    pub fn detail_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        let mut push = |label, value: &str| {
            if !value.is_empty() {
                fields.push((label, value.to_string()));
            }
        };
        push("Version", &self.version);
        push("Size", &self.size);
        push("Build Date", &self.build_date);
        push("License", &self.license.join(", "));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_id_splits_on_first_separator() {
        let id = PackageId::parse("tool#stable");
        assert_eq!(id.name(), "tool");
        assert_eq!(id.qualifier(), Some("stable"));
        assert_eq!(id.to_string(), "tool#stable");

        let id = PackageId::parse("a#b#c");
        assert_eq!(id.name(), "a");
        assert_eq!(id.qualifier(), Some("b#c"));
    }

    #[test]
    fn empty_qualifier_displays_bare_name() {
        assert_eq!(PackageId::parse("tool").to_string(), "tool");
        assert_eq!(PackageId::parse("tool#").to_string(), "tool");
        assert_eq!(PackageId::new("tool", Some(String::new())).qualifier(), None);
    }

    #[test]
    fn metadata_tolerates_missing_and_null_fields() {
        let json = r#"{
            "pkg": "tool",
            "pkg_id": "stable",
            "version": "2.1.0",
            "license": null,
            "notes": ["first", "second"],
            "screenshots": ["https://example.com/a.png"]
        }"#;
        let meta: PackageMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.id().to_string(), "tool#stable");
        assert_eq!(meta.version, "2.1.0");
        assert!(meta.license.is_empty());
        assert!(meta.description.is_empty());
        assert_eq!(meta.notes.len(), 2);
        assert_eq!(meta.icon_url(), None);
    }

    #[test]
    fn metadata_accepts_name_alias() {
        let meta: PackageMetadata = serde_json::from_str(r#"{"name": "tool"}"#).unwrap();
        assert_eq!(meta.id().to_string(), "tool");
    }

    #[test]
    fn detail_fields_skip_empty_values() {
        let meta = PackageMetadata {
            name: "tool".into(),
            version: "2.1.0".into(),
            license: vec!["MIT".into(), "Apache-2.0".into()],
            ..Default::default()
        };
        assert_eq!(
            meta.detail_fields(),
            vec![
                ("Version", "2.1.0".to_string()),
                ("License", "MIT, Apache-2.0".to_string()),
            ]
        );
    }
}
