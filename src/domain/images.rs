//! Image ingestion: classifies client image sources and swaps inline payloads for hosted URLs.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

const DATA_URL_PREFIX: &str = "data:";

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("invalid inline image: {0}")]
    InvalidDataUrl(String),

    #[error("image host error: {0}")]
    Host(String),
}

/// An image payload sent inline as a `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 body, exactly as received (validated, not re-encoded).
    pub base64: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Already hosted somewhere reachable; stored as-is.
    Hosted(String),
    /// Must be uploaded before it can be stored.
    Inline(InlineImage),
}

impl ImageSource {
    /// Classifies one client-supplied image string.
    pub fn parse(raw: &str) -> Result<Self, ImageError> {
        let raw = raw.trim();
        if raw.starts_with(DATA_URL_PREFIX) {
            return parse_data_url(raw).map(ImageSource::Inline);
        }
        if raw.starts_with("https://") || raw.starts_with("http://") {
            return Ok(ImageSource::Hosted(raw.to_string()));
        }
        Err(ImageError::InvalidDataUrl(
            "expected an http(s) URL or a data: URL".to_string(),
        ))
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ImageSource::Inline(_))
    }
}

fn parse_data_url(raw: &str) -> Result<InlineImage, ImageError> {
    let rest = &raw[DATA_URL_PREFIX.len()..];
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageError::InvalidDataUrl("missing ',' separator".to_string()))?;

    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| ImageError::InvalidDataUrl("only base64 data URLs are accepted".to_string()))?;
    if !mime_type.starts_with("image/") {
        return Err(ImageError::InvalidDataUrl(format!(
            "unsupported media type '{}'",
            mime_type
        )));
    }

    let payload = payload.trim();
    if payload.is_empty() {
        return Err(ImageError::InvalidDataUrl("empty payload".to_string()));
    }
    BASE64
        .decode(payload)
        .map_err(|e| ImageError::InvalidDataUrl(format!("payload is not valid base64: {}", e)))?;

    Ok(InlineImage {
        mime_type: mime_type.to_string(),
        base64: payload.to_string(),
    })
}

/// An external service that hosts uploaded images and returns a public URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: &InlineImage) -> Result<String, ImageError>;
}

/// Stand-in used when no image-host credential is configured.
///
/// Hosted URLs still work; inline payloads fail with an upload error.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredImageHost;

#[async_trait]
impl ImageHost for UnconfiguredImageHost {
    async fn upload(&self, _image: &InlineImage) -> Result<String, ImageError> {
        Err(ImageError::Host(
            "image hosting is not configured (IMGBB_API_KEY is unset)".to_string(),
        ))
    }
}

/// Resolves every source to a hosted URL, uploading inline payloads one at a time.
///
/// Stops at the first failed upload and reports its 0-based index.
pub async fn resolve_sources(
    host: &dyn ImageHost,
    sources: Vec<ImageSource>,
) -> Result<Vec<String>, (usize, ImageError)> {
    let mut urls = Vec::with_capacity(sources.len());
    for (index, source) in sources.into_iter().enumerate() {
        match source {
            ImageSource::Hosted(url) => urls.push(url),
            ImageSource::Inline(image) => {
                let url = host.upload(&image).await.map_err(|e| (index, e))?;
                tracing::debug!(index, url = %url, "Uploaded inline image");
                urls.push(url);
            }
        }
    }
    Ok(urls)
}
