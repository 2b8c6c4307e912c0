//! Retrieve-then-synthesize orchestration.
//!
//! # Example
//!
//! ```rust,ignore
//! use meeting_rag::{AnswerSynthesizer, FragmentFilter, RagConfig, RagOrchestrator, Retriever};
//!
//! let orchestrator = RagOrchestrator::builder()
//!     .retriever(Arc::new(Retriever::new(embedder, store)?))
//!     .synthesizer(Arc::new(AnswerSynthesizer::new(generator, RagConfig::default())))
//!     .build()?;
//!
//! let answer = orchestrator.answer("What did investors say?", 10, &FragmentFilter::new()).await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use meeting_telemetry::{NoopSink, RunType, TelemetryEvent, TelemetrySink, emit};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::{RagError, Result};
use crate::fragment::{FragmentFilter, RetrievalResult};
use crate::retriever::Retriever;
use crate::synthesizer::{AnswerSynthesizer, GeneratedAnswer};

/// The unified result of one orchestrated query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagAnswer {
    pub query: String,
    pub generated_answer: GeneratedAnswer,
    pub retrieved: Vec<RetrievalResult>,
    pub total_found: usize,
}

/// Sequences the [`Retriever`] and the [`AnswerSynthesizer`].
///
/// Adds only timing and a summary telemetry event; failure semantics are
/// those of the two components. Construct one via [`RagOrchestrator::builder()`].
pub struct RagOrchestrator {
    retriever: Arc<Retriever>,
    synthesizer: Arc<AnswerSynthesizer>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl RagOrchestrator {
    /// Create a new [`RagOrchestratorBuilder`].
    pub fn builder() -> RagOrchestratorBuilder {
        RagOrchestratorBuilder::default()
    }

    pub fn retriever(&self) -> &Arc<Retriever> {
        &self.retriever
    }

    pub fn synthesizer(&self) -> &Arc<AnswerSynthesizer> {
        &self.synthesizer
    }

    /// Retrieve up to `limit` fragments and synthesize an answer from them.
    ///
    /// # Errors
    ///
    /// Propagates retrieval errors. Generation failures are folded into the
    /// returned [`GeneratedAnswer`].
    pub async fn answer(
        &self,
        query: &str,
        limit: usize,
        filter: &FragmentFilter,
    ) -> Result<RagAnswer> {
        let started = Instant::now();

        let retrieved = self.retriever.retrieve(query, limit, filter).await?;
        let generated_answer = self.synthesizer.synthesize(query, &retrieved).await;

        let total_time = started.elapsed();
        let total_found = retrieved.len();
        info!(
            total_found,
            sources_used = generated_answer.sources_used,
            confidence = generated_answer.confidence,
            total_ms = total_time.as_millis() as u64,
            "rag query completed"
        );

        emit(self.telemetry.as_ref(), || {
            TelemetryEvent::new("rag_pipeline_complete", RunType::Chain)
                .with_inputs(json!({
                    "query": query,
                    "limit": limit,
                    "chunk_type": filter.category,
                    "meeting_id": filter.record_id,
                }))
                .with_outputs(json!({
                    "total_time": total_time.as_secs_f64(),
                    "chunks_retrieved": total_found,
                    "confidence": generated_answer.confidence,
                    "answer_length": generated_answer.answer_length(),
                    "sources_used": generated_answer.sources_used,
                }))
        });

        Ok(RagAnswer { query: query.to_string(), generated_answer, retrieved, total_found })
    }
}

/// Builder for constructing a [`RagOrchestrator`].
///
/// `retriever` and `synthesizer` are required; telemetry defaults to a no-op sink.
#[derive(Default)]
pub struct RagOrchestratorBuilder {
    retriever: Option<Arc<Retriever>>,
    synthesizer: Option<Arc<AnswerSynthesizer>>,
    telemetry: Option<Arc<dyn TelemetrySink>>,
}

impl RagOrchestratorBuilder {
    pub fn retriever(mut self, retriever: Arc<Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn synthesizer(mut self, synthesizer: Arc<AnswerSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    /// Build the [`RagOrchestrator`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<RagOrchestrator> {
        let retriever = self
            .retriever
            .ok_or_else(|| RagError::ConfigError("retriever is required".to_string()))?;
        let synthesizer = self
            .synthesizer
            .ok_or_else(|| RagError::ConfigError("synthesizer is required".to_string()))?;

        Ok(RagOrchestrator {
            retriever,
            synthesizer,
            telemetry: self.telemetry.unwrap_or_else(|| Arc::new(NoopSink)),
        })
    }
}
