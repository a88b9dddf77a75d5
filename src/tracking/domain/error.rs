//! Error types for tracking domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing tracking domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackingDomainError {
    /// The value does not name one of the four order stages.
    #[error("invalid order stage: {0}")]
    InvalidStage(String),

    /// The order reference is empty, too long, or contains unsupported
    /// characters.
    #[error("invalid order reference '{0}'")]
    InvalidOrderRef(String),
}
