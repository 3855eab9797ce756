//! Content-build metadata
//!
//! One authenticated request, keyed by a release-channel label, resolves
//! to the distribution base URL and relative path of that channel's
//! manifest.

use serde::Deserialize;

use crate::error::Result;

/// Resolved content build for one release channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBuildDescriptor {
    /// Release channel label the descriptor was requested for
    pub label: String,
    /// Distribution base URL
    pub distribution: String,
    /// Manifest path relative to the distribution base
    pub path: String,
}

impl ContentBuildDescriptor {
    /// Absolute manifest URL
    pub fn manifest_url(&self) -> Result<url::Url> {
        let base = url::Url::parse(&self.distribution)?;
        Ok(base.join(&self.path)?)
    }
}

/// Wire shape of the content-builds response
#[derive(Debug, Deserialize)]
pub(crate) struct ContentBuildResponse {
    #[serde(default)]
    items: Option<ContentItems>,
}

#[derive(Debug, Deserialize)]
struct ContentItems {
    #[serde(rename = "MANIFEST")]
    manifest: Option<ContentItem>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    distribution: String,
    path: String,
}

impl ContentBuildResponse {
    /// Collapse the nested payload into a descriptor, if one is present
    pub(crate) fn into_descriptor(self, label: &str) -> Option<ContentBuildDescriptor> {
        let item = self.items?.manifest?;
        Some(ContentBuildDescriptor {
            label: label.to_string(),
            distribution: item.distribution,
            path: item.path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_into_descriptor() {
        let response: ContentBuildResponse = serde_json::from_str(
            r#"{"items":{"MANIFEST":{"distribution":"https://cdn.example.com/","path":"Builds/manifest.json"}}}"#,
        )
        .expect("parse response");

        let descriptor = response.into_descriptor("Live").expect("descriptor");
        assert_eq!(descriptor.label, "Live");
        assert_eq!(
            descriptor.manifest_url().expect("url").as_str(),
            "https://cdn.example.com/Builds/manifest.json"
        );
    }

    #[test]
    fn test_empty_payload_yields_none() {
        let empty: ContentBuildResponse = serde_json::from_str("{}").expect("parse");
        assert!(empty.into_descriptor("Live").is_none());

        let no_manifest: ContentBuildResponse =
            serde_json::from_str(r#"{"items":{"MANIFEST":null}}"#).expect("parse");
        assert!(no_manifest.into_descriptor("Live").is_none());
    }
}
