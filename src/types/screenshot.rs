use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::ImageError;

/// A captured screenshot as returned by the screenshots endpoint.
///
/// `screenshot` is either a URL or an inline `data:` URL with a base64 payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotEntry {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub screenshot: String,
    pub timestamp: DateTime<Utc>,
}

/// One page of screenshots as returned by `GET /screenshots`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotPage {
    pub screenshots: Vec<ScreenshotEntry>,
    pub total_pages: u32,
    pub total_count: u64,
}

/// Where the pixels of a screenshot live.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Fetched separately from this URL.
    Url(String),
    /// Embedded in the entry itself.
    Inline { mime: String, bytes: Vec<u8> },
}

impl ScreenshotEntry {
    /// Classifies the image reference, decoding inline payloads.
    pub fn image_source(&self) -> Result<ImageSource, ImageError> {
        let Some(rest) = self.screenshot.strip_prefix("data:") else {
            return Ok(ImageSource::Url(self.screenshot.clone()));
        };

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::MalformedDataUrl(truncate(&self.screenshot)))?;

        let Some(mime) = header.strip_suffix(";base64") else {
            // Percent-encoded payloads are not produced by the capture side.
            return Err(ImageError::MalformedDataUrl(truncate(&self.screenshot)));
        };

        let bytes = BASE64
            .decode(payload.trim())
            .map_err(|e| ImageError::InvalidBase64(e.to_string()))?;

        let mime = if mime.is_empty() {
            "application/octet-stream".to_string()
        } else {
            mime.to_string()
        };

        Ok(ImageSource::Inline { mime, bytes })
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(48).collect()
}
