//! Turning image bytes into embeddable `data:` URLs.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use mime_sniffer::MimeTypeSniffer;
use reqwest::header::CONTENT_TYPE;

use crate::error::MediaError;

pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Pick the MIME type for an image payload: the declared content type when
/// it is an image type, else whatever the bytes sniff as.
pub fn image_mime(content_type: Option<&str>, bytes: &Bytes) -> String {
    let declared = content_type
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .filter(|value| value.starts_with("image/"));

    match declared {
        Some(mime) => mime.to_string(),
        None => bytes.sniff_mime_type().unwrap_or(FALLBACK_MIME).to_string(),
    }
}

/// `data:{mime};base64,{payload}`
pub fn encode_data_url(bytes: &Bytes, content_type: Option<&str>) -> String {
    let mime = image_mime(content_type, bytes);
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

pub fn is_embedded_url(url: &str) -> bool {
    url.starts_with("data:") || url.starts_with("blob:")
}

/// Fetches remote images and returns them as data URLs.
#[derive(Debug, Clone, Default)]
pub struct MediaClient {
    http: reqwest::Client,
}

impl MediaClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn fetch_data_url(&self, url: &str, timeout: Duration) -> Result<String, MediaError> {
        let request_failed = |source: reqwest::Error| MediaError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(request_failed)?;
        if bytes.is_empty() {
            return Err(MediaError::Empty {
                url: url.to_string(),
            });
        }

        tracing::debug!(bytes = bytes.len(), "fetched image");
        Ok(encode_data_url(&bytes, content_type.as_deref()))
    }
}
