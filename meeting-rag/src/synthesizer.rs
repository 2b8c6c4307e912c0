//! Answer synthesis from ranked fragments.
//!
//! The synthesizer renders the top-K results into a context block, sends one
//! generation request, and derives a confidence value from the retrieval
//! scores. Generation failures and timeouts come back as a degraded
//! [`GeneratedAnswer`] with zero confidence and an `error` descriptor; they
//! are never returned as `Err`.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use meeting_telemetry::{NoopSink, RunType, TelemetryEvent, TelemetrySink, emit};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::config::RagConfig;
use crate::error::RagError;
use crate::fragment::RetrievalResult;
use crate::generation::{GenerationRequest, TextGenerator};

/// Answer returned when retrieval produced nothing.
pub const NO_INFORMATION_ANSWER: &str =
    "I couldn't find any relevant information to answer your question.";

const PREAMBLE: &str = "You are an AI assistant helping analyze meeting data. Based on the \
retrieved meeting information below, provide a comprehensive and accurate answer to the user's question.";

const INSTRUCTIONS: &str = "Instructions:
- Provide a clear, comprehensive answer based only on the information provided
- If multiple perspectives are mentioned, include them in your response
- Cite specific meetings, speakers, or details when relevant
- If the information is insufficient to fully answer the question, state what you can determine and what limitations exist
- Be conversational but professional
- Focus on insights that would be valuable for business decision-making";

/// A synthesized answer and the evidence behind it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedAnswer {
    pub answer: String,
    /// Always within `[0, 1]`.
    pub confidence: f32,
    /// Number of fragments rendered into the context (the full result count on failure).
    pub sources_used: usize,
    /// Scores of the fragments used as sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_scores: Option<Vec<f32>>,
    /// Set when generation failed; the answer text then describes the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GeneratedAnswer {
    /// The fixed fallback for an empty result list.
    pub fn no_information() -> Self {
        Self {
            answer: NO_INFORMATION_ANSWER.to_string(),
            confidence: 0.0,
            sources_used: 0,
            retrieval_scores: None,
            error: None,
        }
    }

    fn failed(error: &RagError, sources_used: usize) -> Self {
        Self {
            answer: format!("Sorry, I encountered an error generating the response: {error}"),
            confidence: 0.0,
            sources_used,
            retrieval_scores: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// Answer length in characters.
    pub fn answer_length(&self) -> usize {
        self.answer.chars().count()
    }
}

/// Builds a context from top-ranked fragments and calls the generation capability.
pub struct AnswerSynthesizer {
    generator: Arc<dyn TextGenerator>,
    config: RagConfig,
    telemetry: Arc<dyn TelemetrySink>,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>, config: RagConfig) -> Self {
        Self { generator, config, telemetry: Arc::new(NoopSink) }
    }

    /// Attach a telemetry sink.
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    fn top_k<'a>(&self, results: &'a [RetrievalResult]) -> &'a [RetrievalResult] {
        &results[..results.len().min(self.config.context_window)]
    }

    /// Render the top-K fragments, in rank order, as the generation context.
    pub fn build_context(&self, results: &[RetrievalResult]) -> String {
        let mut context = String::new();
        for (i, result) in self.top_k(results).iter().enumerate() {
            let fragment = &result.fragment;
            let _ = writeln!(context, "Source {}:", i + 1);
            let _ = writeln!(context, "Meeting: {}", fragment.record_id);
            if let Some(speaker) = &fragment.speaker {
                match &fragment.role {
                    Some(role) => {
                        let _ = writeln!(context, "Speaker: {speaker} ({role})");
                    }
                    None => {
                        let _ = writeln!(context, "Speaker: {speaker}");
                    }
                }
            }
            let _ = writeln!(context, "Content: {}", fragment.text);
            context.push('\n');
        }
        context
    }

    /// Assemble the full prompt for one query.
    pub fn build_prompt(&self, query: &str, context: &str) -> String {
        format!(
            "{PREAMBLE}\n\nQuestion: {query}\n\nRetrieved Meeting Information:\n{context}\n{INSTRUCTIONS}\n\nAnswer:"
        )
    }

    /// Mean top-K score times the boost factor, clamped to `[0, 1]`. Non-finite
    /// scores give 0.0.
    pub fn confidence(&self, results: &[RetrievalResult]) -> f32 {
        let top = self.top_k(results);
        if top.is_empty() {
            return 0.0;
        }
        let mean = top.iter().map(|r| r.score).sum::<f32>() / top.len() as f32;
        let boosted = mean * self.config.confidence_boost;
        if !boosted.is_finite() {
            return 0.0;
        }
        boosted.clamp(0.0, 1.0)
    }

    /// Synthesize an answer for `query` from ranked `results`.
    pub async fn synthesize(&self, query: &str, results: &[RetrievalResult]) -> GeneratedAnswer {
        if results.is_empty() {
            info!("no retrieval results, returning fallback answer");
            return GeneratedAnswer::no_information();
        }

        let started = Instant::now();
        let top = self.top_k(results);
        let context = self.build_context(results);
        let request = GenerationRequest {
            prompt: self.build_prompt(query, &context),
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        };

        let outcome =
            tokio::time::timeout(self.config.generation_timeout, self.generator.complete(&request))
                .await
                .unwrap_or_else(|_| {
                    Err(RagError::GenerationError {
                        provider: self.generator.name().to_string(),
                        message: format!(
                            "timed out after {:.1}s",
                            self.config.generation_timeout.as_secs_f64()
                        ),
                    })
                });

        let answer = match outcome {
            Ok(text) => GeneratedAnswer {
                answer: text,
                confidence: self.confidence(results),
                sources_used: top.len(),
                retrieval_scores: Some(top.iter().map(|r| r.score).collect()),
                error: None,
            },
            Err(e) => {
                warn!(generator = self.generator.name(), error = %e, "generation failed, returning degraded answer");
                GeneratedAnswer::failed(&e, results.len())
            }
        };

        let elapsed = started.elapsed();
        info!(
            sources_used = answer.sources_used,
            confidence = answer.confidence,
            answer_length = answer.answer_length(),
            elapsed_ms = elapsed.as_millis() as u64,
            "answer synthesized"
        );

        emit(self.telemetry.as_ref(), || {
            TelemetryEvent::new("llm_generation_metrics", RunType::Llm)
                .with_inputs(json!({
                    "query": query,
                    "context_length": context.chars().count(),
                    "sources_count": top.len(),
                }))
                .with_outputs(json!({
                    "answer_length": answer.answer_length(),
                    "confidence": answer.confidence,
                    "generation_time": elapsed.as_secs_f64(),
                    "error": answer.error,
                }))
        });

        answer
    }
}
