//! Error types for the `meeting-eval` crate.

use meeting_rag::RagError;
use thiserror::Error;

/// Errors that can occur while configuring or running an evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Invalid weights or harness parameters. Raised before any query runs.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A labeled query is malformed.
    #[error("Invalid query spec: {0}")]
    InvalidQuerySpec(String),

    /// A retrieval or orchestration failure while processing one query.
    #[error(transparent)]
    Rag(#[from] RagError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A convenience result type for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;
