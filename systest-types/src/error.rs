//! Error types for the system-test models.

use thiserror::Error;

/// Errors that can occur while building or parsing model values.
#[derive(Debug, Error)]
pub enum SystestError {
    /// An identifier was not 64 lowercase hex characters.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// Unknown provider type discriminator
    #[error("invalid provider type: {0}")]
    InvalidProviderType(u8),

    /// Unknown metric name
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// A token amount could not be parsed
    #[error("invalid token amount: {0}")]
    InvalidAmount(String),

    /// JSON decoding failed
    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}
