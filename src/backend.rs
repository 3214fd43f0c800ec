//! Extraction backend boundary: send screenshots, get the raw JSON response back.

use crate::error::ProcessingError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Multipart field name every image is sent under.
pub const IMAGES_FIELD: &str = "images";

/// One uploaded screenshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UploadedImage {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Turns screenshots into the backend's raw extraction response.
///
/// Implementations report transport failures and non-success statuses as errors; the content of
/// a successful response (including `success: false`) is judged by the mapper.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    async fn extract(&self, images: Vec<UploadedImage>) -> Result<Value, ProcessingError>;
}

/// HTTP client for the OCR service (`POST {base}/process`).
pub struct HttpExtractionBackend {
    client: reqwest::Client,
    process_url: String,
}

impl HttpExtractionBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProcessingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProcessingError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            process_url: format!("{}/process", base_url.trim_end_matches('/')),
        })
    }

    pub fn process_url(&self) -> &str {
        &self.process_url
    }
}

#[async_trait]
impl ExtractionBackend for HttpExtractionBackend {
    async fn extract(&self, images: Vec<UploadedImage>) -> Result<Value, ProcessingError> {
        if images.is_empty() {
            return Err(ProcessingError::NoImages);
        }
        let mut form = reqwest::multipart::Form::new();
        for image in images {
            log::debug!("Adding {} ({} bytes)", image.filename, image.bytes.len());
            let mut part = reqwest::multipart::Part::bytes(image.bytes).file_name(image.filename);
            if let Some(content_type) = image.content_type {
                part = part
                    .mime_str(&content_type)
                    .map_err(|e| ProcessingError::Transport(e.to_string()))?;
            }
            form = form.part(IMAGES_FIELD, part);
        }

        let response = self
            .client
            .post(&self.process_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProcessingError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProcessingError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ProcessingError::Backend {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        serde_json::from_str(&body)
            .map_err(|e| ProcessingError::Malformed(format!("response is not JSON: {}", e)))
    }
}

/// Message to show for a failed response: the JSON `error` field if there is one, else the text.
pub fn error_message(body: &str) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = obj.get("error").and_then(Value::as_str) {
            return msg.to_string();
        }
    }
    let text = body.trim();
    if text.is_empty() {
        "no response body".to_string()
    } else {
        text.to_string()
    }
}
