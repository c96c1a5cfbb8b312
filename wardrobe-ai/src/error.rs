//! Error types for wardrobe-ai
//!
//! Remote calls fail in exactly three ways; the tier state machine matches
//! on these exhaustively to decide between retrying and advancing.

use thiserror::Error;

/// Failure of a single remote inference call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// Rate exceeded (HTTP 429 / quota exhausted); retried within the tier
    #[error("Rate limit exceeded: {0}")]
    Throttled(String),

    /// The model answered but the payload is unusable; advances to the next tier
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Transport, auth or server failure; advances to the next tier
    #[error("Model unavailable: {0}")]
    Unavailable(String),
}

impl InferenceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, InferenceError::Throttled(_))
    }
}

/// Every configured tier failed for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("All inference tiers exhausted")]
pub struct TiersExhausted;
