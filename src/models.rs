//! Request and response models for the preview endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Email content to upload.
///
/// The service requires at least one of `raw_source`, `html_text` or
/// `plain_text`; the constructors each set one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmailSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Opaque identifier for the end user the email belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_user_id: Option<String>,
}

impl EmailSource {
    /// A complete RFC 5322 message, headers included.
    pub fn from_raw_source(raw: impl Into<String>) -> Self {
        Self {
            raw_source: Some(raw.into()),
            ..Self::default()
        }
    }

    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html_text: Some(html.into()),
            ..Self::default()
        }
    }

    pub fn from_plain_text(text: impl Into<String>) -> Self {
        Self {
            plain_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_plain_text(mut self, text: impl Into<String>) -> Self {
        self.plain_text = Some(text.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_end_user_id(mut self, end_user_id: impl Into<String>) -> Self {
        self.end_user_id = Some(end_user_id.into());
        self
    }
}

/// Handle returned by email creation.
///
/// Handles expire on the service side after about a day and are immutable:
/// changed content needs a new handle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmailHandle {
    pub email_guid: String,
    /// Everything else the service echoed back.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Whether remote images load in the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageVisibility {
    Allowed,
    Blocked,
}

impl ImageVisibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Blocked => "blocked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// Capture options shared by previews, prefetches and image URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PreviewOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<ImageVisibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

impl PreviewOptions {
    pub fn images(mut self, images: ImageVisibility) -> Self {
        self.images = Some(images);
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::new();
        if let Some(images) = self.images {
            pairs.push(("images", images.as_str()));
        }
        if let Some(orientation) = self.orientation {
            pairs.push(("orientation", orientation.as_str()));
        }
        pairs
    }
}

/// One render target plus options, for prefetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewConfiguration {
    pub client: String,
    #[serde(flatten)]
    pub options: PreviewOptions,
}

impl PreviewConfiguration {
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            options: PreviewOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PreviewOptions) -> Self {
        self.options = options;
        self
    }
}

/// Capture size (`full`, `thumb`, ...) to downloadable image URL.
pub type PreviewUrls = BTreeMap<String, String>;

/// Options for an embeddable preview image URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageUrlOptions {
    /// Defaults to `full`.
    pub capture_size: Option<String>,
    pub preview: PreviewOptions,
    /// Image served if the capture fails. Percent-encoded into the query.
    pub fallback_url: Option<String>,
    pub fallback_text: Option<String>,
}

impl ImageUrlOptions {
    pub fn capture_size(mut self, size: impl Into<String>) -> Self {
        self.capture_size = Some(size.into());
        self
    }

    pub fn preview(mut self, preview: PreviewOptions) -> Self {
        self.preview = preview;
        self
    }

    pub fn fallback_url(mut self, url: impl Into<String>) -> Self {
        self.fallback_url = Some(url.into());
        self
    }

    pub fn fallback_text(mut self, text: impl Into<String>) -> Self {
        self.fallback_text = Some(text.into());
        self
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self.preview.query_pairs();
        if let Some(url) = &self.fallback_url {
            pairs.push(("fallback_url", url.as_str()));
        }
        if let Some(text) = &self.fallback_text {
            pairs.push(("fallback_text", text.as_str()));
        }
        pairs
    }
}

/// Pull `<size>_url` string fields out of a preview response.
pub(crate) fn preview_urls(payload: &Value) -> PreviewUrls {
    payload
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|(key, value)| {
                    let size = key.strip_suffix("_url")?;
                    Some((size.to_string(), value.as_str()?.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_source_omits_unset_fields() {
        let source = EmailSource::from_html("<p>hi</p>").with_subject("Hello");
        assert_eq!(
            serde_json::to_value(&source).unwrap(),
            json!({"html_text": "<p>hi</p>", "subject": "Hello"})
        );
    }

    #[test]
    fn configuration_flattens_options() {
        let config = PreviewConfiguration::new("gmailw").with_options(
            PreviewOptions::default()
                .images(ImageVisibility::Blocked)
                .orientation(Orientation::Vertical),
        );
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"client": "gmailw", "images": "blocked", "orientation": "vertical"})
        );
    }

    #[test]
    fn handle_keeps_metadata() {
        let handle: EmailHandle = serde_json::from_value(json!({
            "email_guid": "abc123",
            "end_user_id": "u1",
        }))
        .unwrap();
        assert_eq!(handle.email_guid, "abc123");
        assert_eq!(handle.metadata.get("end_user_id"), Some(&json!("u1")));
    }

    #[test]
    fn preview_urls_by_capture_size() {
        let urls = preview_urls(&json!({
            "full_url": "https://cdn.test/full.png",
            "thumb_url": "https://cdn.test/thumb.png",
            "status": "done",
            "odd_url": 3,
        }));
        assert_eq!(urls.len(), 2);
        assert_eq!(urls["full"], "https://cdn.test/full.png");
        assert_eq!(urls["thumb"], "https://cdn.test/thumb.png");
        assert!(preview_urls(&json!([1])).is_empty());
    }
}
