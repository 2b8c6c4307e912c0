//! Error types for the `meeting-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval and synthesis operations.
///
/// Generation failures are listed for completeness of provider
/// implementations, but the [`AnswerSynthesizer`](crate::AnswerSynthesizer)
/// folds them into a degraded answer instead of returning them.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the fragment store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation capability failed or timed out.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An interchange file could not be read or decoded.
    #[error("Loader error: {0}")]
    LoaderError(String),

    /// A fragment violates a data-model invariant (e.g. empty text).
    #[error("Invalid fragment: {0}")]
    InvalidFragment(String),

    /// A query request is malformed (e.g. zero limit).
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A configuration validation error. Raised before any query runs.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in retrieval orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
