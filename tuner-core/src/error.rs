//! Error types for the tuner core.
//!
//! Only configuration and persistence can fail. A frame that yields no
//! usable pitch is not an error; see [`crate::pitch::Rejection`].

use thiserror::Error;

/// Result alias for fallible tuner-core operations.
pub type Result<T> = std::result::Result<T, TunerError>;

#[derive(Debug, Error)]
pub enum TunerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
