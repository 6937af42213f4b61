// src/core/recognition/decode.rs
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops::FilterType, RgbImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty image payload")]
    Empty,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("frame of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported or corrupt image: {0}")]
    Image(#[from] image::ImageError),

    #[error("image decoding timed out after {0:?}")]
    Timeout(Duration),

    #[error("decode task failed: {0}")]
    TaskFailed(String),
}

/// An RGB frame ready for feature extraction.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub image: RgbImage,
    pub original_width: u32,
    pub original_height: u32,
}

impl DecodedFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

pub struct FrameDecoder {
    max_frame_bytes: usize,
    resize_width: u32,
    timeout: Duration,
}

impl FrameDecoder {
    /// `resize_width` of 0 keeps frames at their original size.
    pub fn new(max_frame_bytes: usize, resize_width: u32, timeout: Duration) -> Self {
        Self {
            max_frame_bytes,
            resize_width,
            timeout,
        }
    }

    /// Decodes a base64 payload, with or without a `data:` URL prefix.
    pub async fn decode_base64(&self, payload: &str) -> Result<DecodedFrame, DecodeError> {
        let payload = strip_data_url(payload.trim());
        if payload.is_empty() {
            return Err(DecodeError::Empty);
        }

        // Reject oversized payloads before allocating the decoded buffer.
        let estimated = payload.len() / 4 * 3;
        if estimated > self.max_frame_bytes + 3 {
            return Err(DecodeError::TooLarge {
                size: estimated,
                limit: self.max_frame_bytes,
            });
        }

        let bytes = STANDARD.decode(payload)?;
        self.decode_bytes(bytes).await
    }

    pub async fn decode_bytes(&self, bytes: Vec<u8>) -> Result<DecodedFrame, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        if bytes.len() > self.max_frame_bytes {
            return Err(DecodeError::TooLarge {
                size: bytes.len(),
                limit: self.max_frame_bytes,
            });
        }

        let resize_width = self.resize_width;
        let task = tokio::task::spawn_blocking(move || decode_sync(&bytes, resize_width));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(DecodeError::TaskFailed(e.to_string())),
            Err(_) => Err(DecodeError::Timeout(self.timeout)),
        }
    }
}

fn strip_data_url(payload: &str) -> &str {
    if payload.starts_with("data:") {
        payload.split_once(',').map(|(_, data)| data).unwrap_or("")
    } else {
        payload
    }
}

fn decode_sync(bytes: &[u8], resize_width: u32) -> Result<DecodedFrame, DecodeError> {
    let image = image::load_from_memory(bytes)?.to_rgb8();
    let (original_width, original_height) = image.dimensions();

    let image = if resize_width > 0 && original_width > resize_width {
        let height = ((original_height as u64 * resize_width as u64) / original_width as u64).max(1) as u32;
        image::imageops::resize(&image, resize_width, height, FilterType::Triangle)
    } else {
        image
    };

    Ok(DecodedFrame {
        image,
        original_width,
        original_height,
    })
}
