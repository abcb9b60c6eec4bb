//! CPU raster backend built on the `image` crate
//!
//! Codec work runs on the blocking thread pool; each decode/encode completes
//! when its task finishes, never on a timer.

use crate::surface::{DecodedImage, Surface};
use crate::url::{ObjectUrl, UrlRegistry};
use crate::RasterBackend;
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use std::sync::Arc;
use tensor_interop_common::config::DEFAULT_MAX_SURFACE_DIMENSION;
use tensor_interop_common::{
    ConversionConfig, ConversionError, EncodedImage, ImageMime, Result, DEFAULT_JPEG_QUALITY,
};
use tracing::{debug, warn};

/// Software canvas: surfaces in memory, PNG/JPEG through the `image` crate
#[derive(Debug)]
pub struct SoftwareCanvas {
    urls: Arc<UrlRegistry>,
    max_dimension: u32,
}

impl Default for SoftwareCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareCanvas {
    #[must_use]
    pub fn new() -> Self {
        Self {
            urls: UrlRegistry::new(),
            max_dimension: DEFAULT_MAX_SURFACE_DIMENSION,
        }
    }

    #[must_use]
    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::new().with_max_dimension(config.max_surface_dimension)
    }

    #[must_use]
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Object URLs handed out by this canvas
    #[must_use]
    pub fn urls(&self) -> &UrlRegistry {
        &self.urls
    }
}

#[async_trait]
impl RasterBackend for SoftwareCanvas {
    fn create_surface(&self, width: u32, height: u32) -> Result<Surface> {
        if width == 0 || height == 0 {
            return Err(ConversionError::SurfaceUnavailable(format!(
                "cannot allocate an empty {width}x{height} surface"
            )));
        }
        if width > self.max_dimension || height > self.max_dimension {
            return Err(ConversionError::SurfaceUnavailable(format!(
                "{width}x{height} exceeds the {} pixel limit",
                self.max_dimension
            )));
        }
        Ok(Surface::new(width, height))
    }

    fn create_object_url(&self, image: &EncodedImage) -> ObjectUrl {
        self.urls.register(image.clone())
    }

    async fn decode(&self, url: &ObjectUrl) -> Result<DecodedImage> {
        let source = self.urls.resolve(url)?;
        let image = tokio::task::spawn_blocking(move || decode_bytes(&source.bytes))
            .await
            .map_err(|e| ConversionError::DecodeFailed(format!("Task join error: {e}")))??;

        debug!(
            "Decoded {} into {}x{}",
            url,
            image.width(),
            image.height()
        );
        Ok(DecodedImage::new(image))
    }

    async fn encode(
        &self,
        surface: &Surface,
        mime: ImageMime,
        quality: Option<f32>,
    ) -> Result<EncodedImage> {
        let pixels = surface.as_image().clone();
        let bytes = tokio::task::spawn_blocking(move || encode_pixels(&pixels, mime, quality))
            .await
            .map_err(|e| ConversionError::EncodeFailed(format!("Task join error: {e}")))??;

        debug!("Encoded {} bytes as {}", bytes.len(), mime);
        Ok(EncodedImage::new(mime, bytes))
    }
}

fn decode_bytes(bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| ConversionError::DecodeFailed(e.to_string()))?;
    Ok(image.to_rgba8())
}

fn encode_pixels(pixels: &RgbaImage, mime: ImageMime, quality: Option<f32>) -> Result<Vec<u8>> {
    let (width, height) = pixels.dimensions();
    let mut bytes = Vec::new();

    match mime {
        ImageMime::Png => PngEncoder::new(&mut bytes).write_image(
            pixels.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ImageMime::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(pixels.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality)).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
    }
    .map_err(|e| ConversionError::EncodeFailed(e.to_string()))?;

    Ok(bytes)
}

/// Map a [0, 1] quality to the encoder's 1-100 scale; out-of-range values fall back to the default
fn jpeg_quality(quality: Option<f32>) -> u8 {
    let q = match quality {
        Some(q) if (0.0..=1.0).contains(&q) => q,
        Some(q) => {
            warn!(
                "Ignoring JPEG quality {} outside [0, 1], using {}",
                q, DEFAULT_JPEG_QUALITY
            );
            DEFAULT_JPEG_QUALITY
        }
        None => DEFAULT_JPEG_QUALITY,
    };
    ((q * 100.0).round() as u8).clamp(1, 100)
}
