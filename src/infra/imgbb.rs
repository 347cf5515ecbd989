//! Image hosting client for the ImgBB upload API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::domain::images::{ImageError, ImageHost, InlineImage};

/// ImgBB upload endpoint
pub const IMGBB_UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";

#[derive(Clone)]
pub struct ImgbbClient {
    http_client: HttpClient,
    api_key: String,
    upload_url: String,
}

impl std::fmt::Debug for ImgbbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImgbbClient")
            .field("upload_url", &self.upload_url)
            .finish()
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
    error: Option<UploadError>,
}

#[derive(Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Deserialize)]
struct UploadError {
    message: Option<String>,
}

impl ImgbbClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ImageError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageError::Host(e.to_string()))?;
        Ok(Self {
            http_client,
            api_key: api_key.into(),
            upload_url: IMGBB_UPLOAD_URL.to_string(),
        })
    }

    /// Points the client at a different endpoint (mirrors, test servers).
    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }
}

#[async_trait]
impl ImageHost for ImgbbClient {
    async fn upload(&self, image: &InlineImage) -> Result<String, ImageError> {
        let response = self
            .http_client
            .post(&self.upload_url)
            .form(&[("key", self.api_key.as_str()), ("image", image.base64.as_str())])
            .send()
            .await
            .map_err(|e| ImageError::Host(e.to_string()))?;

        let status = response.status();
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Host(format!("unreadable upload response ({}): {}", status, e)))?;
        parse_upload(status.as_u16(), body)
    }
}

fn parse_upload(status: u16, body: UploadResponse) -> Result<String, ImageError> {
    match body {
        UploadResponse { success: true, data: Some(data), .. } if (200..300).contains(&status) => {
            Ok(data.url)
        }
        UploadResponse { error, .. } => {
            let message = error
                .and_then(|e| e.message)
                .unwrap_or_else(|| "upload rejected".to_string());
            Err(ImageError::Host(format!("{} ({})", message, status)))
        }
    }
}
