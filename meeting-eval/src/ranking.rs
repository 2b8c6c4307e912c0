//! Ordering and spread of a ranked result set.

use meeting_rag::RetrievalResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingScore {
    /// 1.0 when scores never increase down the list, otherwise 0.0.
    pub score_monotonicity: f64,
    /// `(max - min) / max`, in `[0, 1]`.
    pub score_distribution: f64,
}

/// Fewer than two results trivially score 1.0 on both dimensions.
pub fn score_ranking(results: &[RetrievalResult]) -> RankingScore {
    if results.len() < 2 {
        return RankingScore { score_monotonicity: 1.0, score_distribution: 1.0 };
    }

    let monotonic = results.windows(2).all(|pair| pair[0].score >= pair[1].score);

    let scores = results.iter().map(|r| f64::from(r.score));
    let max = scores.clone().fold(f64::NEG_INFINITY, f64::max);
    let min = scores.fold(f64::INFINITY, f64::min);
    // Non-positive maxima leave the ratio meaningless.
    let score_distribution = if max > 0.0 { ((max - min) / max).clamp(0.0, 1.0) } else { 0.0 };

    RankingScore { score_monotonicity: if monotonic { 1.0 } else { 0.0 }, score_distribution }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meeting_rag::Fragment;

    fn ranked(scores: &[f32]) -> Vec<RetrievalResult> {
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| RetrievalResult {
                fragment: Fragment::minute(format!("f{i}"), "M1", "text"),
                score: *s,
            })
            .collect()
    }

    #[test]
    fn short_inputs_are_trivially_ordered() {
        let expected = RankingScore { score_monotonicity: 1.0, score_distribution: 1.0 };
        assert_eq!(score_ranking(&[]), expected);
        assert_eq!(score_ranking(&ranked(&[0.4])), expected);
    }

    #[test]
    fn any_inversion_fails_monotonicity() {
        let score = score_ranking(&ranked(&[0.9, 0.5, 0.6]));
        assert_eq!(score.score_monotonicity, 0.0);
    }

    #[test]
    fn distribution_measures_spread() {
        let score = score_ranking(&ranked(&[0.8, 0.6, 0.4]));
        assert_eq!(score.score_monotonicity, 1.0);
        assert!((score.score_distribution - 0.5).abs() < 1e-6);

        let flat = score_ranking(&ranked(&[0.5, 0.5]));
        assert_eq!(flat.score_distribution, 0.0);

        let zero = score_ranking(&ranked(&[0.0, 0.0]));
        assert_eq!(zero.score_distribution, 0.0);

        let mixed_sign = score_ranking(&ranked(&[0.5, -0.5]));
        assert_eq!(mixed_sign.score_distribution, 1.0);
    }
}
