//! Runs a labeled query set through retrieval and the full pipeline, scores
//! every query, and aggregates the results into an [`EvaluationReport`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::{FutureExt, StreamExt, stream};
use meeting_rag::{FragmentFilter, RagOrchestrator};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EvalError, Result};
use crate::generation::score_generation;
use crate::query_spec::QuerySpec;
use crate::ranking::score_ranking;
use crate::relevance::score_relevance;
use crate::report::{EvaluationReport, QueryFailure, ScoreRecord};
use crate::weights::ScoringWeights;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Retrieval limit per query.
    pub limit: usize,
    /// Queries in flight at once. 1 processes the set sequentially.
    pub concurrency: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self { limit: 10, concurrency: 1 }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(EvalError::ConfigError("limit must be greater than zero".into()));
        }
        if self.concurrency == 0 {
            return Err(EvalError::ConfigError("concurrency must be greater than zero".into()));
        }
        Ok(())
    }
}

/// Evaluation harness over a configured [`RagOrchestrator`].
///
/// Retrieval-only inputs for the relevance and ranking scorers come from the
/// orchestrator's own retriever, so both paths see the same store and embedder.
pub struct EvaluationHarness {
    orchestrator: Arc<RagOrchestrator>,
    weights: ScoringWeights,
    config: HarnessConfig,
}

impl EvaluationHarness {
    pub fn new(orchestrator: Arc<RagOrchestrator>) -> Self {
        Self { orchestrator, weights: ScoringWeights::default(), config: HarnessConfig::default() }
    }

    /// # Errors
    ///
    /// Returns [`EvalError::ConfigError`] if the weights fail validation.
    pub fn with_weights(mut self, weights: ScoringWeights) -> Result<Self> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns [`EvalError::ConfigError`] for a zero limit or concurrency.
    pub fn with_config(mut self, config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Retrieve, answer, and score a single query.
    pub async fn evaluate_query(&self, spec: &QuerySpec) -> Result<ScoreRecord> {
        spec.validate()?;
        let filter = FragmentFilter::new();
        let limit = self.config.limit;

        let started = Instant::now();
        let results = self.orchestrator.retriever().retrieve(&spec.query, limit, &filter).await?;
        let retrieval_time = started.elapsed().as_secs_f64();

        let started = Instant::now();
        let rag_answer = self.orchestrator.answer(&spec.query, limit, &filter).await?;
        let generation_time = started.elapsed().as_secs_f64();

        let relevance = score_relevance(spec, &results, &self.weights.relevance);
        let ranking = score_ranking(&results);
        let generation = score_generation(spec, &rag_answer.generated_answer, &self.weights);

        Ok(ScoreRecord {
            query: spec.query.clone(),
            category: spec.category.clone(),
            retrieval_time,
            generation_time,
            num_retrieved: results.len(),
            top_score: results.first().map(|r| f64::from(r.score)).unwrap_or(0.0),
            confidence: generation.confidence,
            relevance,
            ranking,
            generation,
            answer: rag_answer.generated_answer.answer,
        })
    }

    /// Evaluate every query and build the report.
    ///
    /// A query that errors or panics is recorded as a [`QueryFailure`] and
    /// the run continues. Records keep the input order whatever the
    /// concurrency.
    pub async fn run(&self, specs: &[QuerySpec]) -> EvaluationReport {
        info!(queries = specs.len(), concurrency = self.config.concurrency, "starting evaluation");
        let started = Instant::now();

        let outcomes: Vec<_> = stream::iter(specs.iter().enumerate())
            .map(|(index, spec)| async move {
                let outcome = AssertUnwindSafe(self.evaluate_query(spec)).catch_unwind().await;
                (index, spec, outcome)
            })
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let mut records = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (index, spec, outcome) in outcomes {
            let error = match outcome {
                Ok(Ok(record)) => {
                    info!(
                        query = index + 1,
                        retrieval_time = record.retrieval_time,
                        generation_time = record.generation_time,
                        relevance = record.relevance.overall_relevance,
                        generation = record.generation.overall_quality,
                        "query evaluated"
                    );
                    records.push(record);
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(panic) => format!("panicked: {}", panic_message(panic.as_ref())),
            };
            warn!(query = index + 1, category = %spec.category, error = %error, "query evaluation failed");
            failures.push(QueryFailure {
                query: spec.query.clone(),
                category: spec.category.clone(),
                error,
            });
        }

        let report = EvaluationReport::from_records(records, failures);
        info!(
            run_id = %report.run_id,
            success_rate = report.overall_metrics.success_rate,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "evaluation completed"
        );
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
