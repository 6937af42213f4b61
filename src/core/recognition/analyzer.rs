// src/core/recognition/analyzer.rs
use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::decode::DecodedFrame;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Failed to encode frame for analysis: {0}")]
    Encode(String),

    #[error("Face analyzer unreachable: {0}")]
    Unreachable(String),

    #[error("Face analyzer timed out after {0:?}")]
    Timeout(Duration),

    #[error("Face analyzer returned HTTP {0}")]
    Status(u16),

    #[error("Malformed analyzer response: {0}")]
    Malformed(String),
}

/// Face detection and feature extraction for a decoded frame.
///
/// Implementations return one feature vector per detected face, in detection
/// order. An empty list means no face was found.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FaceAnalyzer: Send + Sync {
    async fn extract(&self, frame: &DecodedFrame) -> Result<Vec<Vec<f32>>, AnalyzerError>;
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest {
    image: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    faces: Vec<Vec<f32>>,
}

/// Delegates extraction to an HTTP service that accepts a base64 JPEG and
/// answers with `{ "faces": [[...], ...] }`.
pub struct HttpFaceAnalyzer {
    url: String,
    client: Client,
    timeout: Duration,
}

impl HttpFaceAnalyzer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AnalyzerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalyzerError::Unreachable(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            client,
            timeout,
        })
    }

    fn encode_jpeg(frame: &DecodedFrame) -> Result<String, AnalyzerError> {
        let mut buf = Cursor::new(Vec::new());
        frame
            .image
            .write_to(&mut buf, ImageFormat::Jpeg)
            .map_err(|e| AnalyzerError::Encode(e.to_string()))?;
        Ok(STANDARD.encode(buf.into_inner()))
    }
}

#[async_trait]
impl FaceAnalyzer for HttpFaceAnalyzer {
    async fn extract(&self, frame: &DecodedFrame) -> Result<Vec<Vec<f32>>, AnalyzerError> {
        let request = AnalyzeRequest {
            image: Self::encode_jpeg(frame)?,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzerError::Timeout(self.timeout)
                } else {
                    AnalyzerError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzerError::Status(status.as_u16()));
        }

        let body: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::Malformed(e.to_string()))?;

        debug!(
            "Analyzer found {} face(s) in {}x{} frame",
            body.faces.len(),
            frame.width(),
            frame.height()
        );
        Ok(body.faces)
    }
}
