//! The telemetry sink capability and the emission boundary.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info};

use crate::error::Result;
use crate::event::TelemetryEvent;

/// A destination for [`TelemetryEvent`]s.
///
/// `record_event` is synchronous and must not block on I/O; sinks that ship
/// events elsewhere should hand them off (channel, background task) and
/// return immediately.
pub trait TelemetrySink: Send + Sync {
    /// Record one event.
    fn record_event(&self, event: TelemetryEvent) -> Result<()>;

    /// Whether this sink wants events at all. When `false`, [`emit`] skips
    /// building the event.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// A sink that drops everything. Used when no telemetry is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn record_event(&self, _event: TelemetryEvent) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// A sink that writes each event as a structured `tracing` record under the
/// `telemetry` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record_event(&self, event: TelemetryEvent) -> Result<()> {
        let inputs = serde_json::to_string(&event.inputs)?;
        let outputs = serde_json::to_string(&event.outputs)?;
        info!(
            target: "telemetry",
            name = %event.name,
            run_type = %event.run_type,
            inputs = %inputs,
            outputs = %outputs,
            "telemetry event"
        );
        Ok(())
    }
}

/// Fire-and-forget emission.
///
/// The event is built lazily, only if the sink is enabled. Errors returned by
/// the sink and panics raised inside it are both discarded here, so telemetry
/// can never change the caller's control flow or result.
pub fn emit<F>(sink: &dyn TelemetrySink, build: F)
where
    F: FnOnce() -> TelemetryEvent,
{
    if !sink.is_enabled() {
        return;
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let event = build();
        let name = event.name.clone();
        (name, sink.record_event(event))
    }));

    match outcome {
        Ok((_, Ok(()))) => {}
        Ok((name, Err(e))) => debug!(event = %name, error = %e, "telemetry sink rejected event"),
        Err(_) => debug!("telemetry sink panicked, event discarded"),
    }
}
