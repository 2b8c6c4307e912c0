//! Loader → store → orchestrator, end to end with deterministic providers.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use meeting_rag::{
    AnswerSynthesizer, Category, EmbeddingProvider, FragmentFilter, FragmentStore,
    GenerationRequest, InMemoryFragmentStore, NO_INFORMATION_ANSWER, RagConfig, RagError,
    RagOrchestrator, Retriever, TextGenerator, load_directory,
};
use meeting_telemetry::{InMemorySink, RunType};
use serde_json::json;

/// Bag-of-words embedding over a tiny fixed vocabulary.
struct VocabEmbedder;

const VOCAB: [&str; 4] = ["funding", "compliance", "deadline", "roadmap"];

#[async_trait]
impl EmbeddingProvider for VocabEmbedder {
    async fn embed(&self, text: &str) -> meeting_rag::Result<Vec<f32>> {
        let lower = text.to_lowercase();
        Ok(VOCAB.iter().map(|w| if lower.contains(w) { 1.0 } else { 0.0 }).collect())
    }

    fn dimensions(&self) -> usize {
        VOCAB.len()
    }
}

struct CannedGenerator;

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn complete(&self, _request: &GenerationRequest) -> meeting_rag::Result<String> {
        Ok("Funding discussions focused on closing the seed round.".to_string())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

fn write_json(path: &Path, value: serde_json::Value) {
    std::fs::write(path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

fn write_fixture(dir: &Path) {
    write_json(
        &dir.join("embeddings_chunked_MTG_001.json"),
        json!([
            {
                "chunk_id": "MTG_001_00:01",
                "embedding": [1.0, 0.0, 0.0, 0.0],
                "metadata": {
                    "chunk_id": "MTG_001_00:01", "meeting_id": "MTG_001", "type": "minute",
                    "text": "We need to close funding this quarter.",
                    "speaker": "Arjun Vasanth", "role": "CEO"
                }
            },
            {
                "chunk_id": "MTG_001_action_1",
                "embedding": [0.0, 0.0, 1.0, 0.0],
                "metadata": {
                    "meeting_id": "MTG_001", "type": "action_item",
                    "task": "Submit deck before the deadline",
                    "assigned_to": "Priya", "due_date": "2024-02-01", "priority": "high"
                }
            }
        ]),
    );
    write_json(
        &dir.join("embeddings_chunked_MTG_002.json"),
        json!([
            {
                "chunk_id": "MTG_002_insight_1",
                "embedding": [0.6, 0.8, 0.0, 0.0],
                "metadata": {
                    "meeting_id": "MTG_002", "type": "key_insight",
                    "text": "Compliance costs may slow funding."
                }
            }
        ]),
    );
    std::fs::write(dir.join("README.txt"), "not an embeddings file").unwrap();
}

async fn orchestrator(store: Arc<InMemoryFragmentStore>, sink: InMemorySink) -> RagOrchestrator {
    let retriever = Retriever::new(Arc::new(VocabEmbedder), store)
        .unwrap()
        .with_telemetry(Arc::new(sink.clone()));
    let synthesizer = AnswerSynthesizer::new(Arc::new(CannedGenerator), RagConfig::default())
        .with_telemetry(Arc::new(sink.clone()));
    RagOrchestrator::builder()
        .retriever(Arc::new(retriever))
        .synthesizer(Arc::new(synthesizer))
        .telemetry(Arc::new(sink))
        .build()
        .unwrap()
}

#[tokio::test]
async fn loads_directory_and_answers() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let store = Arc::new(InMemoryFragmentStore::new(VOCAB.len()));
    let summary = load_directory(dir.path(), store.as_ref(), 100).await.unwrap();
    assert_eq!(summary.files, 2);
    assert_eq!(summary.points, 3);

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_points, 3);
    assert_eq!(stats.vector_size, 4);
    assert_eq!(stats.distance, "cosine");

    let sink = InMemorySink::new();
    let orchestrator = orchestrator(store, sink.clone()).await;
    let answer = orchestrator
        .answer("What about funding?", 10, &FragmentFilter::new())
        .await
        .unwrap();

    assert_eq!(answer.query, "What about funding?");
    assert_eq!(answer.total_found, 3);
    assert_eq!(answer.retrieved[0].fragment.id, "MTG_001_00:01");
    assert_eq!(answer.retrieved[1].fragment.id, "MTG_002_insight_1");
    assert!(answer.generated_answer.confidence > 0.0);
    assert!(answer.generated_answer.confidence <= 1.0);
    assert_eq!(answer.generated_answer.sources_used, 3);

    assert_eq!(sink.events_of(RunType::Retriever).len(), 1);
    assert_eq!(sink.events_of(RunType::Llm).len(), 1);
    let chain = sink.events_named("rag_pipeline_complete");
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].outputs["chunks_retrieved"], 3);
}

#[tokio::test]
async fn filtered_query_with_no_matches_returns_fallback() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let store = Arc::new(InMemoryFragmentStore::new(VOCAB.len()));
    load_directory(dir.path(), store.as_ref(), 1).await.unwrap();

    let orchestrator = orchestrator(store, InMemorySink::new()).await;
    let answer = orchestrator
        .answer(
            "funding",
            10,
            &FragmentFilter::new().category(Category::ActionItem).record_id("MTG_002"),
        )
        .await
        .unwrap();

    assert_eq!(answer.total_found, 0);
    assert_eq!(answer.generated_answer.answer, NO_INFORMATION_ANSWER);
    assert_eq!(answer.generated_answer.confidence, 0.0);
}

#[tokio::test]
async fn action_item_details_survive_loading() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let store = Arc::new(InMemoryFragmentStore::new(VOCAB.len()));
    load_directory(dir.path(), store.as_ref(), 100).await.unwrap();

    let results = store
        .search(&[0.0, 0.0, 1.0, 0.0], &FragmentFilter::new().category(Category::ActionItem), 5)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    let details = results[0].fragment.action_item_details().unwrap();
    assert_eq!(details.assigned_to.as_deref(), Some("Priya"));
    assert_eq!(results[0].fragment.text, "Submit deck before the deadline");
}

#[tokio::test]
async fn malformed_file_is_a_loader_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    let store = InMemoryFragmentStore::new(VOCAB.len());

    let err = load_directory(dir.path(), &store, 100).await.unwrap_err();
    assert!(matches!(err, RagError::LoaderError(_)));
}

#[tokio::test]
async fn failed_load_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    std::fs::write(dir.path().join("zz_broken.json"), "{ not json").unwrap();
    let store = InMemoryFragmentStore::new(VOCAB.len());

    let err = load_directory(dir.path(), &store, 1).await.unwrap_err();
    assert!(matches!(err, RagError::LoaderError(_)));
    assert_eq!(store.stats().await.unwrap().total_points, 0);

    std::fs::remove_file(dir.path().join("zz_broken.json")).unwrap();
    write_json(
        &dir.path().join("zz_short_vector.json"),
        json!([{
            "chunk_id": "MTG_003_00:01",
            "embedding": [1.0, 0.0],
            "metadata": { "meeting_id": "MTG_003", "type": "minute", "text": "Roadmap review." }
        }]),
    );

    let err = load_directory(dir.path(), &store, 1).await.unwrap_err();
    assert!(matches!(err, RagError::LoaderError(_)));
    assert_eq!(store.stats().await.unwrap().total_points, 0);
}

#[tokio::test]
async fn builder_requires_components() {
    assert!(matches!(RagOrchestrator::builder().build(), Err(RagError::ConfigError(_))));
}
