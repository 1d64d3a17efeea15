//! Error types for follow-up decoding.

use thiserror::Error;

/// Errors that can occur when reading follow-up rules from a backend payload.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The payload is not valid JSON, or a rule has the wrong shape.
    #[error("Failed to parse follow-ups: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is JSON but not one of the known response envelopes.
    #[error("Unexpected follow-up payload: {0}")]
    UnexpectedEnvelope(String),
}
