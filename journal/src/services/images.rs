//! Image collector
//!
//! Turns uploaded image files into small inline references:
//! decode, shrink so the longer side fits the cap, re-encode as JPEG
//! and wrap the bytes in a `data:` URI.

use crate::config::{IMAGE_DATA_URI_PREFIX, JPEG_QUALITY, MAX_IMAGE_DIMENSION};
use crate::error::{AppError, Result};
use crate::models::ImageRef;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;

/// Service for ingesting images
#[derive(Debug, Clone, Copy)]
pub struct ImageCollector {
    max_dimension: u32,
    quality: u8,
}

impl Default for ImageCollector {
    fn default() -> Self {
        Self::new(MAX_IMAGE_DIMENSION, JPEG_QUALITY)
    }
}

impl ImageCollector {
    pub fn new(max_dimension: u32, quality: u8) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            quality: quality.clamp(1, 100),
        }
    }

    /// Decode, shrink and encode one file.
    ///
    /// Decoding runs on the blocking pool so the caller's task never stalls.
    pub async fn ingest(&self, data: Vec<u8>) -> Result<ImageRef> {
        let collector = *self;
        tokio::task::spawn_blocking(move || collector.encode(&data))
            .await
            .map_err(|e| AppError::Generic(format!("Image task failed: {}", e)))?
    }

    /// Ingest several files concurrently.
    ///
    /// Results are returned in submission order, whatever order the
    /// decodes finish in.
    pub async fn ingest_batch(&self, files: Vec<Vec<u8>>) -> Vec<Result<ImageRef>> {
        let handles: Vec<_> = files
            .into_iter()
            .map(|data| {
                let collector = *self;
                tokio::task::spawn_blocking(move || collector.encode(&data))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = handle
                .await
                .map_err(|e| AppError::Generic(format!("Image task failed: {}", e)))
                .and_then(|r| r);
            results.push(result);
        }

        results
    }

    fn encode(&self, data: &[u8]) -> Result<ImageRef> {
        let img = image::load_from_memory(data).map_err(|e| AppError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        let (target_width, target_height) = target_dimensions(width, height, self.max_dimension);

        let img = if (target_width, target_height) != (width, height) {
            img.resize_exact(target_width, target_height, FilterType::Triangle)
        } else {
            img
        };

        // JPEG has no alpha channel
        let rgb = img.to_rgb8();

        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, self.quality).encode_image(&rgb)?;

        tracing::debug!(
            "Encoded image {}x{} -> {}x{} ({} bytes)",
            width,
            height,
            target_width,
            target_height,
            encoded.len()
        );

        Ok(format!(
            "{}{}",
            IMAGE_DATA_URI_PREFIX,
            base64::engine::general_purpose::STANDARD.encode(&encoded)
        ))
    }
}

/// Size that keeps the aspect ratio and fits `max` on the longer side.
///
/// Images already within the cap keep their size. When the sides are
/// equal the height decides. Fractions are truncated, never below 1 px.
pub fn target_dimensions(width: u32, height: u32, max: u32) -> (u32, u32) {
    let scale = |side: u32, num: u32, den: u32| -> u32 {
        ((side as u64 * num as u64) / den as u64).max(1) as u32
    };

    if width > height {
        if width > max {
            return (max, scale(height, max, width));
        }
    } else if height > max {
        return (scale(width, max, height), max);
    }

    (width, height)
}

/// Split a stored reference back into its JPEG bytes
pub fn decode_image_ref(image_ref: &str) -> Result<Vec<u8>> {
    let payload = image_ref
        .strip_prefix(IMAGE_DATA_URI_PREFIX)
        .ok_or_else(|| AppError::Decode("not a JPEG data URI".to_string()))?;

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AppError::Decode(e.to_string()))
}
