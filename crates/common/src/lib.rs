//! Common types and utilities for tensor conversions

pub mod config;
pub mod error;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use config::{ConversionConfig, DecodeOptions, EncodeOptions};
pub use error::{ConversionError, ErrorCategory, Result};

/// Rectangular numeric array: flat buffer plus row-major shape
pub type Tensor = ndarray::ArrayD<f32>;

/// Default JPEG quality used when none (or an out-of-range one) is supplied
pub const DEFAULT_JPEG_QUALITY: f32 = 0.92;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// MIME types the image converters can produce and consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImageMime {
    #[default]
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl ImageMime {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMime::Png => "image/png",
            ImageMime::Jpeg => "image/jpeg",
        }
    }

    /// Detect the format from leading magic bytes
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PNG_MAGIC) {
            Some(ImageMime::Png)
        } else if bytes.starts_with(JPEG_MAGIC) {
            Some(ImageMime::Jpeg)
        } else {
            None
        }
    }

    /// Whether the encoder honours a quality parameter
    #[must_use]
    pub fn is_lossy(self) -> bool {
        matches!(self, ImageMime::Jpeg)
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageMime {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(ImageMime::Png),
            "image/jpeg" | "image/jpg" => Ok(ImageMime::Jpeg),
            other => Err(ConversionError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Encoded image bytes tagged with their MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime: ImageMime,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    #[must_use]
    pub fn new(mime: ImageMime, bytes: Vec<u8>) -> Self {
        Self { mime, bytes }
    }

    /// Wrap raw bytes, deriving the MIME type from their magic number
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mime = ImageMime::sniff(&bytes).ok_or_else(|| {
            ConversionError::UnsupportedFormat("unrecognized image signature".to_string())
        })?;
        Ok(Self { mime, bytes })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Number of channels kept on the image side of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMode {
    /// Red, green, blue; alpha is dropped on decode and forced opaque on encode
    #[default]
    Rgb,
    /// Red, green, blue, alpha
    Rgba,
}

impl ChannelMode {
    #[must_use]
    pub fn count(self) -> usize {
        match self {
            ChannelMode::Rgb => 3,
            ChannelMode::Rgba => 4,
        }
    }
}

/// Map an 8-bit intensity to [0, 1]
#[inline]
#[must_use]
pub fn normalize(value: u8) -> f32 {
    f32::from(value) / 255.0
}

/// Map a [0, 1] intensity to 8 bits. Out-of-range values are clamped, NaN becomes 0.
#[inline]
#[must_use]
pub fn denormalize(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bounds() {
        assert_eq!(normalize(0), 0.0);
        assert_eq!(normalize(255), 1.0);
        assert!((normalize(128) - 0.501_960_8).abs() < 1e-6);
    }

    #[test]
    fn test_denormalize_is_single_scaling() {
        assert_eq!(denormalize(0.0), 0);
        assert_eq!(denormalize(1.0), 255);
        assert_eq!(denormalize(0.5), 128);
        assert_eq!(denormalize(0.2), 51);
    }

    #[test]
    fn test_denormalize_clamps() {
        assert_eq!(denormalize(-0.5), 0);
        assert_eq!(denormalize(3.0), 255);
        assert_eq!(denormalize(f32::NAN), 0);
        assert_eq!(denormalize(f32::INFINITY), 255);
    }

    #[test]
    fn test_normalize_denormalize_roundtrip() {
        for v in 0..=255u8 {
            assert_eq!(denormalize(normalize(v)), v);
        }
    }

    #[test]
    fn test_mime_parse() {
        assert_eq!("image/png".parse::<ImageMime>().unwrap(), ImageMime::Png);
        assert_eq!(" IMAGE/JPEG ".parse::<ImageMime>().unwrap(), ImageMime::Jpeg);
        assert!("image/webp".parse::<ImageMime>().is_err());
        assert_eq!(ImageMime::Jpeg.to_string(), "image/jpeg");
    }

    #[test]
    fn test_mime_sniff() {
        assert_eq!(
            ImageMime::sniff(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"),
            Some(ImageMime::Png)
        );
        assert_eq!(
            ImageMime::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageMime::Jpeg)
        );
        assert_eq!(ImageMime::sniff(b"GIF89a"), None);
        assert!(EncodedImage::from_bytes(b"GIF89a".to_vec()).is_err());
    }

    #[test]
    fn test_mime_serde_names() {
        let json = serde_json::to_string(&ImageMime::Jpeg).unwrap();
        assert_eq!(json, "\"image/jpeg\"");
        let mode: ChannelMode = serde_json::from_str("\"rgba\"").unwrap();
        assert_eq!(mode.count(), 4);
    }
}
