//! Client the web backend uses to reach the OCR service

use crate::error::{OcrError, OcrResult};
use ecoscan_config::OcrConfig;
use ecoscan_core::OCR_FAILURE_PLACEHOLDER;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct OcrReply {
    #[serde(default)]
    raw_text: String,
}

/// HTTP client for the OCR sidecar
#[derive(Clone)]
pub struct OcrClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl OcrClient {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: config.service_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// POST the image and return the trimmed extracted text
    pub async fn recognize(&self, filename: &str, image: Vec<u8>) -> OcrResult<String> {
        let part = reqwest::multipart::Part::bytes(image)
            .file_name(filename.to_string())
            .mime_str("image/jpeg")
            .map_err(|e| OcrError::Request(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&self.url)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| OcrError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Service { status, body });
        }

        let reply: OcrReply = response
            .json()
            .await
            .map_err(|e| OcrError::Request(e.to_string()))?;
        Ok(reply.raw_text.trim().to_string())
    }

    /// Like [`recognize`](Self::recognize), but degrades to the fixed
    /// placeholder on any failure instead of erroring. The scan pipeline
    /// treats the placeholder as "OCR failed" downstream.
    pub async fn recognize_or_placeholder(&self, filename: &str, image: Vec<u8>) -> String {
        match self.recognize(filename, image).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                warn!("OCR service returned empty text");
                OCR_FAILURE_PLACEHOLDER.to_string()
            }
            Err(e) => {
                warn!("OCR request failed: {}", e);
                OCR_FAILURE_PLACEHOLDER.to_string()
            }
        }
    }
}
