//! Error types for the clipper crate

use crate::extract::ExtractError;
use thiserror::Error;

/// Result type for clipper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for clipper operations
#[derive(Debug, Error)]
pub enum Error {
    /// Content extraction error
    #[error("Extraction error: {0}")]
    Extract(ExtractError),

    /// Batch result serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}
