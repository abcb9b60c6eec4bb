//! Conversion configuration and per-call options

use crate::{ChannelMode, ConversionError, ImageMime, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Largest surface edge accepted by default, in pixels
pub const DEFAULT_MAX_SURFACE_DIMENSION: u32 = 16_384;

/// Configuration for image conversions, loadable from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Output MIME type for tensor -> image
    pub mime: ImageMime,
    /// JPEG quality in [0, 1]; `None` uses the codec default
    pub jpeg_quality: Option<f32>,
    /// Channels carried by image-domain tensors
    pub channels: ChannelMode,
    /// Upper bound on a single decode/encode wait, in milliseconds
    pub timeout_ms: Option<u64>,
    /// Largest width or height a drawing surface may have
    pub max_surface_dimension: u32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            mime: ImageMime::Png,
            jpeg_quality: None,
            channels: ChannelMode::Rgb,
            timeout_ms: None,
            max_surface_dimension: DEFAULT_MAX_SURFACE_DIMENSION,
        }
    }
}

impl ConversionConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&contents)?;
        info!("Loaded conversion config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(q) = self.jpeg_quality {
            if !(0.0..=1.0).contains(&q) {
                return Err(ConversionError::Config(format!(
                    "jpeg_quality must be within [0, 1], got {q}"
                )));
            }
        }
        if self.max_surface_dimension == 0 {
            return Err(ConversionError::Config(
                "max_surface_dimension must be positive".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    #[must_use]
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            mime: self.mime,
            quality: if self.mime.is_lossy() {
                self.jpeg_quality
            } else {
                None
            },
            channels: self.channels,
            timeout: self.timeout(),
        }
    }

    #[must_use]
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            channels: self.channels,
            timeout: self.timeout(),
        }
    }
}

/// Options for tensor -> image
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EncodeOptions {
    pub mime: ImageMime,
    /// Lossy quality in [0, 1]; ignored for PNG
    pub quality: Option<f32>,
    /// Channel count the input tensor must have
    pub channels: ChannelMode,
    pub timeout: Option<Duration>,
}

impl EncodeOptions {
    #[must_use]
    pub fn png() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn jpeg(quality: Option<f32>) -> Self {
        Self {
            mime: ImageMime::Jpeg,
            quality,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_channels(mut self, channels: ChannelMode) -> Self {
        self.channels = channels;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Options for image -> tensor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DecodeOptions {
    /// Channels kept per pixel (3 drops alpha)
    pub channels: ChannelMode,
    pub timeout: Option<Duration>,
}

impl DecodeOptions {
    #[must_use]
    pub fn rgba() -> Self {
        Self {
            channels: ChannelMode::Rgba,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = ConversionConfig::default();
        assert_eq!(config.mime, ImageMime::Png);
        assert_eq!(config.channels, ChannelMode::Rgb);
        assert!(config.jpeg_quality.is_none());
        assert!(config.timeout().is_none());
        assert_eq!(config.max_surface_dimension, DEFAULT_MAX_SURFACE_DIMENSION);
    }

    #[test]
    fn test_config_from_yaml_str() {
        let yaml = "mime: image/jpeg\njpeg_quality: 0.8\ntimeout_ms: 250\n";
        let config = ConversionConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.mime, ImageMime::Jpeg);
        assert_eq!(config.jpeg_quality, Some(0.8));
        assert_eq!(config.channels, ChannelMode::Rgb);

        let encode = config.encode_options();
        assert_eq!(encode.mime, ImageMime::Jpeg);
        assert_eq!(encode.quality, Some(0.8));
        assert_eq!(encode.timeout, Some(Duration::from_millis(250)));

        let decode = config.decode_options();
        assert_eq!(decode.channels, ChannelMode::Rgb);
        assert_eq!(decode.timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_config_png_drops_quality() {
        let config = ConversionConfig {
            jpeg_quality: Some(0.5),
            ..Default::default()
        };
        assert!(config.encode_options().quality.is_none());
    }

    #[test]
    fn test_config_rejects_bad_quality() {
        let result = ConversionConfig::from_yaml_str("jpeg_quality: 1.5\n");
        assert!(matches!(result, Err(ConversionError::Config(_))));
    }

    #[test]
    fn test_config_rejects_unknown_mime() {
        let result = ConversionConfig::from_yaml_str("mime: image/webp\n");
        assert!(matches!(result, Err(ConversionError::Config(_))));
    }

    #[test]
    fn test_config_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "channels: rgba").unwrap();
        writeln!(file, "max_surface_dimension: 512").unwrap();

        let config = ConversionConfig::from_yaml(file.path()).unwrap();
        assert_eq!(config.channels, ChannelMode::Rgba);
        assert_eq!(config.max_surface_dimension, 512);
    }

    #[test]
    fn test_config_missing_file() {
        let result = ConversionConfig::from_yaml("/nonexistent/tensor-interop.yaml");
        assert!(matches!(result, Err(ConversionError::Io(_))));
    }
}
