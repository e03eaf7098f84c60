//! Failure taxonomy for the concierge pipeline.
//!
//! Backend and parse failures are recoverable: the reconciler converts them
//! into deterministic fallback responses. Only request-shape validation
//! reaches the HTTP boundary as an explicit error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConciergeError {
    /// Missing or malformed request input. Surfaced immediately; no backend
    /// call is attempted.
    #[error("{0}")]
    InvalidRequest(String),

    /// Missing credential, network failure, or non-success response from the
    /// generative backend. Never retried.
    #[error("generative backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend responded but the text could not be recovered as
    /// structured data, even after the bracket-scan repair attempt.
    #[error("unusable backend output: {0}")]
    UnparsableOutput(String),

    /// Pool construction yielded an empty set (catalog and edition both
    /// empty). Callers treat this as an empty suggestion list.
    #[error("no candidates available")]
    NoCandidates,
}

impl ConciergeError {
    /// True when the error is recoverable through the canned fallback table.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ConciergeError::BackendUnavailable(_) | ConciergeError::UnparsableOutput(_)
        )
    }
}
