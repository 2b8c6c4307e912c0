use serde_json::json;

use crate::error::TelemetryError;
use crate::event::{RunType, TelemetryEvent};
use crate::memory::InMemorySink;
use crate::sink::{NoopSink, TelemetrySink, TracingSink, emit};

struct FailingSink;

impl TelemetrySink for FailingSink {
    fn record_event(&self, _event: TelemetryEvent) -> crate::Result<()> {
        Err(TelemetryError::SinkUnavailable {
            sink: "Failing".to_string(),
            message: "backend down".to_string(),
        })
    }
}

struct PanickingSink;

impl TelemetrySink for PanickingSink {
    fn record_event(&self, _event: TelemetryEvent) -> crate::Result<()> {
        panic!("sink exploded");
    }
}

#[tokio::test]
async fn test_inmemory_sink_captures_events_in_order() {
    let sink = InMemorySink::new();
    let shared = sink.clone();

    emit(&sink, || {
        TelemetryEvent::new("semantic_search_metrics", RunType::Retriever)
            .with_inputs(json!({ "query": "funding", "limit": 10 }))
            .with_outputs(json!({ "results_count": 3, "top_score": 0.82 }))
    });
    emit(&sink, || TelemetryEvent::new("llm_generation_metrics", RunType::Llm));

    let events = shared.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name, "semantic_search_metrics");
    assert_eq!(events[0].inputs["limit"], 10);
    assert_eq!(events[1].run_type, RunType::Llm);
    assert_eq!(shared.events_named("llm_generation_metrics").len(), 1);
    assert_eq!(shared.events_of(RunType::Retriever).len(), 1);

    shared.clear();
    assert!(sink.is_empty());
}

#[test]
fn test_noop_sink_never_builds_event() {
    let mut built = false;
    emit(&NoopSink, || {
        built = true;
        TelemetryEvent::new("never", RunType::Chain)
    });
    assert!(!built);
}

#[test]
fn test_failing_sink_is_swallowed() {
    emit(&FailingSink, || TelemetryEvent::new("dropped", RunType::Chain));
}

#[test]
fn test_panicking_sink_is_swallowed() {
    emit(&PanickingSink, || TelemetryEvent::new("dropped", RunType::Chain));
}

#[test]
fn test_tracing_sink_accepts_events() {
    let event = TelemetryEvent::new("rag_pipeline_complete", RunType::Chain)
        .with_outputs(json!({ "total_time": 0.12 }));
    assert!(TracingSink.record_event(event).is_ok());
}

#[test]
fn test_run_type_serializes_snake_case() {
    let value = serde_json::to_value(RunType::Retriever).unwrap();
    assert_eq!(value, json!("retriever"));
    assert_eq!(RunType::Llm.to_string(), "llm");
}
