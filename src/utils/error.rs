//! Error types for the deepframe library.
//!
//! Uses thiserror for ergonomic error definitions. Failures are fatal by
//! design: a bad dataset or checkpoint aborts the run before training starts.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for deepframe operations
#[derive(Error, Debug)]
pub enum DeepframeError {
    /// Error loading or decoding an image file
    #[error("Failed to load image at '{0}': {1}")]
    ImageLoad(PathBuf, String),

    /// Error with dataset construction or iteration
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Error loading or saving a model checkpoint
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for deepframe operations
pub type Result<T> = std::result::Result<T, DeepframeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeepframeError::Dataset("no class directories".to_string());
        assert_eq!(format!("{}", err), "Dataset error: no class directories");
    }

    #[test]
    fn test_image_load_error_mentions_path() {
        let path = PathBuf::from("/data/frames/fake_001.jpg");
        let err = DeepframeError::ImageLoad(path, "truncated file".to_string());
        assert!(format!("{}", err).contains("fake_001.jpg"));
    }
}
