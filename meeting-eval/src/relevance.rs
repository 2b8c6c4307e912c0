//! Relevance of a retrieved set against a [`QuerySpec`]'s expectations.

use meeting_rag::RetrievalResult;
use serde::{Deserialize, Serialize};

use crate::query_spec::QuerySpec;
use crate::weights::RelevanceWeights;

/// Relevance sub-scores, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelevanceScore {
    pub type_accuracy: f64,
    pub keyword_relevance: f64,
    pub speaker_accuracy: f64,
    pub overall_relevance: f64,
}

/// Score `results` against the expectations in `spec`.
///
/// An empty result set scores 0.0 everywhere. Each undeclared expectation
/// scores 1.0 so it does not penalize the overall value.
pub fn score_relevance(
    spec: &QuerySpec,
    results: &[RetrievalResult],
    weights: &RelevanceWeights,
) -> RelevanceScore {
    if results.is_empty() {
        return RelevanceScore::default();
    }

    let type_accuracy = match spec.types() {
        Some(types) => fraction(results, |r| types.contains(&r.fragment.category())),
        None => 1.0,
    };

    let keyword_relevance = match spec.keywords() {
        Some(keywords) => {
            let keywords = lowercase_all(keywords);
            fraction(results, |r| contains_any(&r.fragment.text.to_lowercase(), &keywords))
        }
        None => 1.0,
    };

    let speaker_accuracy = match spec.speakers() {
        Some(speakers) => fraction(results, |r| {
            r.fragment.speaker.as_ref().is_some_and(|s| speakers.contains(s))
        }),
        None => 1.0,
    };

    let overall_relevance = (weights.type_match * type_accuracy
        + weights.keyword * keyword_relevance
        + weights.speaker * speaker_accuracy)
        .clamp(0.0, 1.0);

    RelevanceScore { type_accuracy, keyword_relevance, speaker_accuracy, overall_relevance }
}

fn fraction(results: &[RetrievalResult], pred: impl Fn(&RetrievalResult) -> bool) -> f64 {
    results.iter().filter(|r| pred(r)).count() as f64 / results.len() as f64
}

pub(crate) fn lowercase_all(keywords: &[String]) -> Vec<String> {
    keywords.iter().map(|k| k.to_lowercase()).collect()
}

pub(crate) fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meeting_rag::{ActionItemDetails, Category, Fragment};

    fn result(fragment: Fragment, score: f32) -> RetrievalResult {
        RetrievalResult { fragment, score }
    }

    #[test]
    fn each_result_counts_once_for_keywords() {
        let spec = QuerySpec::new("q", "c").with_expected_keywords(["high", "priority"]);
        let results = vec![
            result(Fragment::minute("a", "M1", "High priority, high urgency"), 0.9),
            result(Fragment::minute("b", "M1", "nothing relevant"), 0.8),
        ];
        let score = score_relevance(&spec, &results, &RelevanceWeights::default());
        assert_eq!(score.keyword_relevance, 0.5);
    }

    #[test]
    fn speaker_match_requires_a_speaker() {
        let spec = QuerySpec::new("q", "c")
            .with_expected_types([Category::Minute])
            .with_expected_speakers(["Arjun Vasanth"]);
        let results = vec![
            result(Fragment::minute("a", "M1", "x").with_speaker("Arjun Vasanth", None), 0.9),
            result(
                Fragment::action_item("b", "M1", "y", ActionItemDetails::default()),
                0.8,
            ),
        ];
        let score = score_relevance(&spec, &results, &RelevanceWeights::default());
        assert_eq!(score.type_accuracy, 0.5);
        assert_eq!(score.speaker_accuracy, 0.5);
        assert_eq!(score.keyword_relevance, 1.0);
        assert!((score.overall_relevance - (0.15 + 0.5 + 0.1)).abs() < 1e-9);
    }
}
