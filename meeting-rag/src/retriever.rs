//! Query → ranked fragments.

use std::sync::Arc;
use std::time::Instant;

use meeting_telemetry::{NoopSink, RunType, TelemetryEvent, TelemetrySink, emit};
use serde_json::json;
use tracing::{error, info};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::fragment::{FragmentFilter, RetrievalResult};
use crate::store::FragmentStore;

/// Embeds a query and ranks stored fragments against it.
///
/// Results are returned in non-increasing score order. The retriever applies
/// a stable sort on top of the store's ordering, so equal scores keep the
/// order the store produced them in.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn FragmentStore>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl Retriever {
    /// Create a retriever over the given embedder and store.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the embedder's dimensionality does
    /// not match the store's vector size.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn FragmentStore>) -> Result<Self> {
        if embedder.dimensions() != store.dimensions() {
            return Err(RagError::ConfigError(format!(
                "embedding dimensions ({}) do not match store vector size ({})",
                embedder.dimensions(),
                store.dimensions()
            )));
        }
        Ok(Self { embedder, store, telemetry: Arc::new(NoopSink) })
    }

    /// Attach a telemetry sink.
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }

    pub fn store(&self) -> &Arc<dyn FragmentStore> {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Retrieve up to `limit` fragments matching `filter`, best first.
    ///
    /// No match is an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidQuery`] for a blank query or zero limit, and
    /// [`RagError::PipelineError`] if embedding or search fails.
    pub async fn retrieve(
        &self,
        query: &str,
        limit: usize,
        filter: &FragmentFilter,
    ) -> Result<Vec<RetrievalResult>> {
        if query.trim().is_empty() {
            return Err(RagError::InvalidQuery("query must not be empty".into()));
        }
        if limit == 0 {
            return Err(RagError::InvalidQuery("limit must be greater than zero".into()));
        }

        let started = Instant::now();

        let query_embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during retrieval");
            RagError::PipelineError(format!("query embedding failed: {e}"))
        })?;

        let mut results = self.store.search(&query_embedding, filter, limit).await.map_err(|e| {
            error!(error = %e, "fragment store search failed");
            RagError::PipelineError(format!("search failed: {e}"))
        })?;

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit);

        let elapsed = started.elapsed();
        let top_score = results.first().map(|r| r.score).unwrap_or(0.0);
        info!(result_count = results.len(), top_score, elapsed_ms = elapsed.as_millis() as u64, "retrieval completed");

        emit(self.telemetry.as_ref(), || {
            TelemetryEvent::new("semantic_search_metrics", RunType::Retriever)
                .with_inputs(json!({
                    "query": query,
                    "limit": limit,
                    "chunk_type": filter.category,
                    "meeting_id": filter.record_id,
                }))
                .with_outputs(json!({
                    "results_count": results.len(),
                    "search_time": elapsed.as_secs_f64(),
                    "top_score": top_score,
                }))
        });

        Ok(results)
    }
}
