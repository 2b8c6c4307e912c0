use std::sync::{Arc, RwLock};

use crate::error::{Result, TelemetryError};
use crate::event::{RunType, TelemetryEvent};
use crate::sink::TelemetrySink;

/// A sink that keeps every event in memory.
///
/// Clones share the same storage, so a test can hand one clone to the
/// component under test and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    events: Arc<RwLock<Vec<TelemetryEvent>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far, in emission order.
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.read().map(|events| events.clone()).unwrap_or_default()
    }

    /// Events with the given name, in emission order.
    pub fn events_named(&self, name: &str) -> Vec<TelemetryEvent> {
        self.filtered(|e| e.name == name)
    }

    /// Events of the given run type, in emission order.
    pub fn events_of(&self, run_type: RunType) -> Vec<TelemetryEvent> {
        self.filtered(|e| e.run_type == run_type)
    }

    pub fn len(&self) -> usize {
        self.events.read().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }

    fn filtered(&self, predicate: impl Fn(&TelemetryEvent) -> bool) -> Vec<TelemetryEvent> {
        self.events
            .read()
            .map(|events| events.iter().filter(|e| predicate(e)).cloned().collect())
            .unwrap_or_default()
    }
}

impl TelemetrySink for InMemorySink {
    fn record_event(&self, event: TelemetryEvent) -> Result<()> {
        let mut events = self.events.write().map_err(|e| TelemetryError::SinkUnavailable {
            sink: "InMemory".to_string(),
            message: format!("event lock poisoned: {e}"),
        })?;
        events.push(event);
        Ok(())
    }
}
