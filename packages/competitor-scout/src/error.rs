//! Typed errors for the competitor discovery pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell a
//! rejected request apart from a degraded upstream call.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur inside the pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// The request cannot be searched (no domain and no features)
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Search provider call failed
    #[error("search failed: {0}")]
    Search(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Content fetch failed for a URL
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Language model call failed
    #[error("LLM error: {0}")]
    Llm(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An external call exceeded its time budget
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// LLM output could not be repaired into the expected shape
    #[error("malformed LLM output: {0}")]
    MalformedOutput(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl ScoutError {
    /// Build an invalid-input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Whether this error should be reported to the caller as a bad request.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ScoutError>;
