//! Error types for the `meeting-telemetry` crate.

use thiserror::Error;

/// Errors a telemetry sink or the logging setup can report.
///
/// None of these ever reach the RAG critical path: [`emit`](crate::emit)
/// discards sink errors after logging them at `debug` level.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The sink cannot accept events right now (lock poisoned, backend down).
    #[error("Telemetry sink unavailable ({sink}): {message}")]
    SinkUnavailable {
        /// The sink that rejected the event.
        sink: String,
        /// A description of the failure.
        message: String,
    },

    /// The event could not be serialized for the sink.
    #[error("Telemetry serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The global `tracing` subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    SubscriberInit(String),
}

/// A convenience result type for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;
