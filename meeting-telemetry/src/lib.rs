//! Telemetry and logging for the meeting-record RAG system.
//!
//! Two separate concerns live here:
//!
//! - **Logging**: [`init_logging`] installs a `tracing-subscriber` registry with
//!   an `EnvFilter` and either a human-readable or JSON formatter.
//! - **Telemetry events**: the [`TelemetrySink`] capability receives
//!   [`TelemetryEvent`]s describing retrieval, generation, and end-to-end runs.
//!   Sinks are injected; the default is [`NoopSink`]. Every call site goes
//!   through [`emit`], which isolates sink failures and panics from the caller.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use meeting_telemetry::{emit, InMemorySink, RunType, TelemetryEvent, TelemetrySink};
//!
//! let sink: Arc<dyn TelemetrySink> = Arc::new(InMemorySink::new());
//! emit(sink.as_ref(), || TelemetryEvent::new("semantic_search_metrics", RunType::Retriever));
//! ```

pub mod error;
pub mod event;
pub mod memory;
pub mod sink;

#[cfg(test)]
mod test_inmemory;

pub use error::{Result, TelemetryError};
pub use event::{RunType, TelemetryEvent};
pub use memory::InMemorySink;
pub use sink::{NoopSink, TelemetrySink, TracingSink, emit};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, single-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Install the global `tracing` subscriber.
///
/// The filter is read from `RUST_LOG` and falls back to `info`. Calling this
/// more than once returns [`TelemetryError::SubscriberInit`]; callers that may
/// initialize twice (tests, embedded use) can ignore that error.
pub fn init_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json().flatten_event(true)).try_init(),
    };

    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}
