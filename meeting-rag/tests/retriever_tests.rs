//! Retriever behavior: ordering, filters, degenerate stores, telemetry isolation.

use std::sync::Arc;

use async_trait::async_trait;
use meeting_rag::{
    Category, EmbeddingProvider, Fragment, FragmentFilter, FragmentPoint, FragmentStore,
    InMemoryFragmentStore, RagError, Retriever,
};
use meeting_telemetry::{InMemorySink, RunType, TelemetryError, TelemetryEvent, TelemetrySink};

/// Always returns the same unit vector along the first axis.
struct AxisEmbedder {
    dims: usize,
}

#[async_trait]
impl EmbeddingProvider for AxisEmbedder {
    async fn embed(&self, _text: &str) -> meeting_rag::Result<Vec<f32>> {
        let mut v = vec![0.0; self.dims];
        v[0] = 1.0;
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

struct BrokenEmbedder;

#[async_trait]
impl EmbeddingProvider for BrokenEmbedder {
    async fn embed(&self, _text: &str) -> meeting_rag::Result<Vec<f32>> {
        Err(RagError::EmbeddingError { provider: "Broken".into(), message: "offline".into() })
    }

    fn dimensions(&self) -> usize {
        2
    }
}

/// Produces a vector with a NaN component.
struct NanEmbedder;

#[async_trait]
impl EmbeddingProvider for NanEmbedder {
    async fn embed(&self, _text: &str) -> meeting_rag::Result<Vec<f32>> {
        Ok(vec![f32::NAN, 0.0])
    }

    fn dimensions(&self) -> usize {
        2
    }
}

struct PanickingSink;

impl TelemetrySink for PanickingSink {
    fn record_event(&self, _event: TelemetryEvent) -> meeting_telemetry::Result<()> {
        panic!("telemetry backend crashed");
    }
}

struct RejectingSink;

impl TelemetrySink for RejectingSink {
    fn record_event(&self, _event: TelemetryEvent) -> meeting_telemetry::Result<()> {
        Err(TelemetryError::SinkUnavailable { sink: "Rejecting".into(), message: "quota".into() })
    }
}

/// A 2-d vector whose cosine with the x axis is `score`.
fn vector_with_score(score: f32) -> Vec<f32> {
    vec![score, (1.0 - score * score).max(0.0).sqrt()]
}

fn point(fragment: Fragment, score: f32) -> FragmentPoint {
    FragmentPoint { id: fragment.id.clone(), vector: vector_with_score(score), fragment, source_file: None }
}

async fn seeded_store() -> Arc<InMemoryFragmentStore> {
    let store = Arc::new(InMemoryFragmentStore::new(2));
    store
        .upsert(&[
            point(Fragment::minute("m1", "MTG_001", "We should raise a seed round"), 0.4),
            point(Fragment::minute("m2", "MTG_002", "Compliance review is pending"), 0.9),
            point(
                Fragment::action_item("a1", "MTG_001", "Draft the investor memo", Default::default()),
                0.7,
            ),
            point(Fragment::key_insight("k1", "MTG_002", "Regulatory risk is the main blocker"), 0.8),
        ])
        .await
        .unwrap();
    store
}

fn retriever(store: Arc<InMemoryFragmentStore>) -> Retriever {
    Retriever::new(Arc::new(AxisEmbedder { dims: 2 }), store).unwrap()
}

#[tokio::test]
async fn results_are_sorted_by_descending_score() {
    let retriever = retriever(seeded_store().await);
    let results = retriever.retrieve("anything", 10, &FragmentFilter::new()).await.unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.fragment.id.as_str()).collect();
    assert_eq!(ids, vec!["m2", "k1", "a1", "m1"]);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn limit_truncates_results() {
    let retriever = retriever(seeded_store().await);
    let results = retriever.retrieve("anything", 2, &FragmentFilter::new()).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].fragment.id, "m2");
}

#[tokio::test]
async fn filters_are_conjunctive() {
    let retriever = retriever(seeded_store().await);

    let minutes = retriever
        .retrieve("anything", 10, &FragmentFilter::new().category(Category::Minute))
        .await
        .unwrap();
    assert_eq!(minutes.len(), 2);
    assert!(minutes.iter().all(|r| r.fragment.category() == Category::Minute));

    let both = retriever
        .retrieve(
            "anything",
            10,
            &FragmentFilter::new().category(Category::Minute).record_id("MTG_001"),
        )
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].fragment.id, "m1");

    let none = retriever
        .retrieve(
            "anything",
            10,
            &FragmentFilter::new().category(Category::ActionItem).record_id("MTG_002"),
        )
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn empty_store_yields_empty_results() {
    let retriever = retriever(Arc::new(InMemoryFragmentStore::new(2)));
    let results = retriever.retrieve("anything", 10, &FragmentFilter::new()).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn dimension_mismatch_is_a_config_error() {
    let store = Arc::new(InMemoryFragmentStore::new(384));
    let result = Retriever::new(Arc::new(AxisEmbedder { dims: 2 }), store);
    assert!(matches!(result, Err(RagError::ConfigError(_))));
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let retriever = retriever(seeded_store().await);
    assert!(matches!(
        retriever.retrieve("  ", 10, &FragmentFilter::new()).await,
        Err(RagError::InvalidQuery(_))
    ));
    assert!(matches!(
        retriever.retrieve("query", 0, &FragmentFilter::new()).await,
        Err(RagError::InvalidQuery(_))
    ));
}

#[tokio::test]
async fn embedding_failure_surfaces_as_pipeline_error() {
    let store = Arc::new(InMemoryFragmentStore::new(2));
    let retriever = Retriever::new(Arc::new(BrokenEmbedder), store).unwrap();
    let err = retriever.retrieve("query", 5, &FragmentFilter::new()).await.unwrap_err();
    assert!(matches!(err, RagError::PipelineError(_)));
}

#[tokio::test]
async fn non_finite_query_embedding_is_rejected() {
    let retriever = Retriever::new(Arc::new(NanEmbedder), seeded_store().await).unwrap();
    let err = retriever.retrieve("query", 5, &FragmentFilter::new()).await.unwrap_err();
    assert!(matches!(err, RagError::PipelineError(_)));
}

#[tokio::test]
async fn telemetry_event_carries_query_filter_count_and_top_score() {
    let sink = InMemorySink::new();
    let retriever = retriever(seeded_store().await).with_telemetry(Arc::new(sink.clone()));

    retriever
        .retrieve("compliance", 3, &FragmentFilter::new().category(Category::KeyInsight))
        .await
        .unwrap();

    let events = sink.events_of(RunType::Retriever);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.name, "semantic_search_metrics");
    assert_eq!(event.inputs["query"], "compliance");
    assert_eq!(event.inputs["chunk_type"], "key_insight");
    assert_eq!(event.outputs["results_count"], 1);
    let top = event.outputs["top_score"].as_f64().unwrap();
    assert!((top - 0.8).abs() < 1e-4);
}

#[tokio::test]
async fn telemetry_failures_never_reach_the_caller() {
    let store = seeded_store().await;

    let panicking = retriever(store.clone()).with_telemetry(Arc::new(PanickingSink));
    let results = panicking.retrieve("anything", 10, &FragmentFilter::new()).await.unwrap();
    assert_eq!(results.len(), 4);

    let rejecting = retriever(store).with_telemetry(Arc::new(RejectingSink));
    let results = rejecting.retrieve("anything", 10, &FragmentFilter::new()).await.unwrap();
    assert_eq!(results.len(), 4);
}
