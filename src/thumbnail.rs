use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::StatusCode;
use serde::Serialize;

use crate::relay::{describe_error, Relay};

const DEFAULT_MIME: &str = "image/jpeg";

/// Base64 image payload ready to be embedded in a JSON request.
/// `data` never carries a `data:` URL prefix.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ThumbnailError {
    #[error("Failed to fetch thumbnail image via proxy. Status: {0}. Please try again.")]
    Status(StatusCode),

    #[error("Failed to fetch thumbnail image via proxy: {0}")]
    Request(String),

    #[error("thumbnail body could not be encoded: {0}")]
    Decode(String),
}

#[derive(Clone, Debug)]
pub struct ImageFetcher {
    relay: Relay,
}

impl ImageFetcher {
    pub fn new(relay: Relay) -> Self {
        Self { relay }
    }

    pub async fn fetch_image_as_text(&self, url: &str) -> Result<EncodedImage, ThumbnailError> {
        let response = self
            .relay
            .get(url)
            .await
            .map_err(|e| ThumbnailError::Request(describe_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ThumbnailError::Status(status));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ThumbnailError::Request(describe_error(&e)))?;

        let encoded = encode_image(&bytes)?;
        log::debug!(
            "thumbnail {url} encoded: {} bytes -> {} chars ({})",
            bytes.len(),
            encoded.data.len(),
            encoded.mime_type
        );
        Ok(encoded)
    }
}

/// Encodes raw image bytes; a body that already is a base64 data URL is
/// unwrapped instead.
pub fn encode_image(bytes: &[u8]) -> Result<EncodedImage, ThumbnailError> {
    if bytes.is_empty() {
        return Err(ThumbnailError::Decode("empty response body".into()));
    }

    if bytes.starts_with(b"data:") {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| ThumbnailError::Decode("data url is not valid utf8".into()))?;
        return strip_data_url(text.trim());
    }

    let kind = infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .ok_or_else(|| ThumbnailError::Decode("response body is not an image".into()))?;

    Ok(EncodedImage {
        mime_type: kind.mime_type().to_string(),
        data: STANDARD.encode(bytes),
    })
}

/// Splits `data:<mime>;base64,<body>` and keeps only the body.
pub fn strip_data_url(data_url: &str) -> Result<EncodedImage, ThumbnailError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| ThumbnailError::Decode("missing data: prefix".into()))?;
    let (header, body) = rest
        .split_once(',')
        .ok_or_else(|| ThumbnailError::Decode("data url has no payload".into()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| ThumbnailError::Decode("data url is not base64".into()))?;

    if body.is_empty() || STANDARD.decode(body).is_err() {
        return Err(ThumbnailError::Decode("data url payload is not valid base64".into()));
    }

    Ok(EncodedImage {
        mime_type: if mime.is_empty() {
            DEFAULT_MIME.to_string()
        } else {
            mime.to_string()
        },
        data: body.to_string(),
    })
}
