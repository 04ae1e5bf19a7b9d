//! Typed errors for the curation library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Most judgment-service failures never surface here: the pipeline
//! stages recover locally (fail open, singleton groups, empty
//! selection) and record the failure in the run diagnostics. Only
//! configuration errors at pipeline entry and collector failures abort
//! a subject's run.

use thiserror::Error;

/// Errors that can occur during curation operations.
#[derive(Debug, Error)]
pub enum CurationError {
    /// Invalid configuration at the pipeline boundary
    #[error("config error: {reason}")]
    Config { reason: String },

    /// Judgment service unavailable or returned garbage
    #[error("judgment service error: {0}")]
    Judge(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Article collection failed
    #[error("collect failed: {0}")]
    Collect(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,
}

impl CurationError {
    /// Wrap an arbitrary error as a judgment-service failure.
    pub fn judge(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Judge(err.into())
    }

    /// Wrap an arbitrary error as a collection failure.
    pub fn collect(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Collect(err.into())
    }
}

/// Result type alias for curation operations.
pub type Result<T> = std::result::Result<T, CurationError>;
