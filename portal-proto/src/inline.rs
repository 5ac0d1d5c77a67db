//! Inline image payloads.

use serde::{Deserialize, Serialize};

/// An image embedded directly in a record as a `data:` URL.
///
/// Serialized as a plain JSON string, e.g.
/// `"data:image/jpeg;base64,/9j/4AAQ..."`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineImage(String);

impl InlineImage {
    /// Builds a data URL from a media type and an already base64-encoded body.
    #[must_use]
    pub fn from_base64(media_type: &str, payload: &str) -> Self {
        Self(format!("data:{media_type};base64,{payload}"))
    }

    /// Wraps an existing data URL without validating it.
    #[must_use]
    pub const fn from_data_url(url: String) -> Self {
        Self(url)
    }

    /// Returns the full data URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the media type (`image/jpeg`), if the URL is well formed.
    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let (meta, _) = rest.split_once(',')?;
        Some(meta.split(';').next().unwrap_or(meta))
    }

    /// Returns the base64 body, if the URL is well formed.
    #[must_use]
    pub fn base64_payload(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let (meta, body) = rest.split_once(',')?;
        meta.ends_with(";base64").then_some(body)
    }

    /// Length of the data URL in bytes (what it costs in storage).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the URL is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for InlineImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
