//! Quality of a generated answer.

use meeting_rag::GeneratedAnswer;
use serde::{Deserialize, Serialize};

use crate::query_spec::QuerySpec;
use crate::relevance::lowercase_all;
use crate::weights::ScoringWeights;

/// Generation sub-scores. Everything but `answer_length` is in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationScore {
    pub confidence: f64,
    pub length_score: f64,
    pub keyword_coverage: f64,
    pub source_utilization: f64,
    pub overall_quality: f64,
    /// Answer length in characters.
    pub answer_length: usize,
}

/// Score a generated answer.
///
/// Unlike relevance, keyword coverage of an answer with no declared
/// keywords is 0.0: nothing was measured. A non-finite confidence counts as 0.0.
pub fn score_generation(
    spec: &QuerySpec,
    answer: &GeneratedAnswer,
    weights: &ScoringWeights,
) -> GenerationScore {
    let confidence = f64::from(answer.confidence);
    let confidence = if confidence.is_finite() { confidence.clamp(0.0, 1.0) } else { 0.0 };
    let answer_length = answer.answer_length();
    let length_score = weights.length.score(answer_length);

    let keyword_coverage = match spec.keywords() {
        Some(keywords) => {
            let text = answer.answer.to_lowercase();
            let found = lowercase_all(keywords).iter().filter(|k| text.contains(k.as_str())).count();
            found as f64 / keywords.len() as f64
        }
        None => 0.0,
    };

    let source_utilization =
        (answer.sources_used as f64 / weights.source_target as f64).min(1.0);

    let w = &weights.generation;
    let overall_quality = (w.confidence * confidence
        + w.length * length_score
        + w.keyword_coverage * keyword_coverage
        + w.source_utilization * source_utilization)
        .clamp(0.0, 1.0);

    GenerationScore {
        confidence,
        length_score,
        keyword_coverage,
        source_utilization,
        overall_quality,
        answer_length,
    }
}
