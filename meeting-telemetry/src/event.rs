use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which stage of a RAG call an event describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    /// Vector search.
    Retriever,
    /// A generation-capability call.
    Llm,
    /// A composed retrieve-then-generate run.
    Chain,
}

impl std::fmt::Display for RunType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunType::Retriever => "retriever",
            RunType::Llm => "llm",
            RunType::Chain => "chain",
        };
        f.write_str(s)
    }
}

/// A single telemetry record: a named run with its inputs and outputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetryEvent {
    pub name: String,
    pub run_type: RunType,
    pub inputs: Value,
    pub outputs: Value,
    pub recorded_at: DateTime<Utc>,
}

impl TelemetryEvent {
    /// Create an event with empty inputs and outputs, stamped with the current time.
    pub fn new(name: impl Into<String>, run_type: RunType) -> Self {
        Self {
            name: name.into(),
            run_type,
            inputs: Value::Object(Default::default()),
            outputs: Value::Object(Default::default()),
            recorded_at: Utc::now(),
        }
    }

    pub fn with_inputs(mut self, inputs: Value) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Value) -> Self {
        self.outputs = outputs;
        self
    }
}
