//! Error types for Montage.

use thiserror::Error;

/// Main error type for Montage operations.
#[derive(Error, Debug)]
pub enum MontageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Media not found: {0}")]
    MediaNotFound(String),

    #[error("Render surface error: {0}")]
    Surface(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Export validation failed: {0}")]
    Validation(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Timeline error: {0}")]
    Timeline(String),
}

/// Result type alias for Montage operations.
pub type Result<T> = std::result::Result<T, MontageError>;
