//! Error types shared by every converter

use std::time::Duration;
use thiserror::Error;

/// Conversion errors
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{0}")]
    InvalidShape(String),

    #[error("Invalid channel count: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("Row {row} has no value for column '{column}'")]
    MissingField { row: usize, column: String },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Invalid pixel buffer: {0}")]
    InvalidPixelBuffer(String),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    #[error("Image {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Object URL {0} is not registered")]
    UnknownUrl(u64),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad error classes, matching how callers are expected to react
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Wrong rank, wrong channel count or malformed input; raised before any work
    Validation,
    /// A drawing surface could not be acquired
    Resource,
    /// Decode/encode failed or never completed
    AsyncIo,
    /// Configuration, serialization and file-system failures
    Other,
}

impl ConversionError {
    /// Classify this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConversionError::InvalidShape(_)
            | ConversionError::ChannelMismatch { .. }
            | ConversionError::MissingField { .. }
            | ConversionError::DuplicateColumn(_)
            | ConversionError::InvalidPixelBuffer(_)
            | ConversionError::Shape(_) => ErrorCategory::Validation,
            ConversionError::SurfaceUnavailable(_) => ErrorCategory::Resource,
            ConversionError::DecodeFailed(_)
            | ConversionError::EncodeFailed(_)
            | ConversionError::Timeout { .. }
            | ConversionError::UnknownUrl(_) => ErrorCategory::AsyncIo,
            ConversionError::UnsupportedFormat(_)
            | ConversionError::Config(_)
            | ConversionError::Serialization(_)
            | ConversionError::Io(_) => ErrorCategory::Other,
        }
    }
}

impl From<serde_yaml::Error> for ConversionError {
    fn from(err: serde_yaml::Error) -> Self {
        ConversionError::Config(err.to_string())
    }
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ConversionError::InvalidShape("bad".into()).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            ConversionError::SurfaceUnavailable("0x0".into()).category(),
            ErrorCategory::Resource
        );
        assert_eq!(
            ConversionError::Timeout {
                operation: "decode",
                after: Duration::from_millis(5),
            }
            .category(),
            ErrorCategory::AsyncIo
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ConversionError::ChannelMismatch {
            expected: 3,
            actual: 4,
        };
        assert_eq!(err.to_string(), "Invalid channel count: expected 3, got 4");

        let err = ConversionError::DecodeFailed("bad magic".into());
        assert!(err.to_string().contains("bad magic"));
    }
}
