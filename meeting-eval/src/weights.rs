//! Named scoring constants.

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

const SUM_TOLERANCE: f64 = 1e-9;

/// Weights combining the relevance sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceWeights {
    pub type_match: f64,
    pub keyword: f64,
    pub speaker: f64,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self { type_match: 0.3, keyword: 0.5, speaker: 0.2 }
    }
}

impl RelevanceWeights {
    pub fn sum(&self) -> f64 {
        self.type_match + self.keyword + self.speaker
    }

    fn values(&self) -> [f64; 3] {
        [self.type_match, self.keyword, self.speaker]
    }
}

/// Weights combining the generation sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationWeights {
    pub confidence: f64,
    pub length: f64,
    pub keyword_coverage: f64,
    pub source_utilization: f64,
}

impl Default for GenerationWeights {
    fn default() -> Self {
        Self { confidence: 0.4, length: 0.2, keyword_coverage: 0.3, source_utilization: 0.1 }
    }
}

impl GenerationWeights {
    pub fn sum(&self) -> f64 {
        self.confidence + self.length + self.keyword_coverage + self.source_utilization
    }

    fn values(&self) -> [f64; 4] {
        [self.confidence, self.length, self.keyword_coverage, self.source_utilization]
    }
}

/// Answer-length policy, in characters.
///
/// Lengths inside `[min_chars, max_chars]` score 1.0. Shorter answers score
/// `len / scale_chars`, longer ones `max_chars / len`; both are capped at 1.0
/// and never drop below `floor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthPolicy {
    pub min_chars: usize,
    pub max_chars: usize,
    pub scale_chars: usize,
    pub floor: f64,
}

impl Default for LengthPolicy {
    fn default() -> Self {
        Self { min_chars: 50, max_chars: 1000, scale_chars: 500, floor: 0.3 }
    }
}

impl LengthPolicy {
    pub fn score(&self, length: usize) -> f64 {
        if (self.min_chars..=self.max_chars).contains(&length) {
            return 1.0;
        }
        let raw = if length < self.min_chars {
            length as f64 / self.scale_chars as f64
        } else {
            self.max_chars as f64 / length as f64
        };
        raw.min(1.0).max(self.floor)
    }
}

/// All tunable scoring constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub relevance: RelevanceWeights,
    pub generation: GenerationWeights,
    pub length: LengthPolicy,
    /// Number of sources at which source utilization saturates.
    pub source_target: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            relevance: RelevanceWeights::default(),
            generation: GenerationWeights::default(),
            length: LengthPolicy::default(),
            source_target: 3,
        }
    }
}

impl ScoringWeights {
    /// # Errors
    ///
    /// Returns [`EvalError::ConfigError`] if a weight is negative or
    /// non-finite, a weight group does not sum to 1.0, or the length policy
    /// is inconsistent.
    pub fn validate(&self) -> Result<()> {
        check_group("relevance", &self.relevance.values(), self.relevance.sum())?;
        check_group("generation", &self.generation.values(), self.generation.sum())?;

        let length = &self.length;
        if length.min_chars > length.max_chars {
            return Err(EvalError::ConfigError(format!(
                "length policy min_chars ({}) exceeds max_chars ({})",
                length.min_chars, length.max_chars
            )));
        }
        if length.scale_chars == 0 {
            return Err(EvalError::ConfigError("length policy scale_chars must be positive".into()));
        }
        if !(0.0..=1.0).contains(&length.floor) {
            return Err(EvalError::ConfigError(format!(
                "length policy floor must be in [0, 1], got {}",
                length.floor
            )));
        }
        if self.source_target == 0 {
            return Err(EvalError::ConfigError("source_target must be positive".into()));
        }
        Ok(())
    }
}

fn check_group(name: &str, values: &[f64], sum: f64) -> Result<()> {
    if values.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(EvalError::ConfigError(format!(
            "{name} weights must be finite and non-negative"
        )));
    }
    if (sum - 1.0).abs() > SUM_TOLERANCE {
        return Err(EvalError::ConfigError(format!("{name} weights sum to {sum}, expected 1.0")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weight_groups_sum_to_one() {
        let weights = ScoringWeights::default();
        assert!((weights.relevance.sum() - 1.0).abs() < 1e-9);
        assert!((weights.generation.sum() - 1.0).abs() < 1e-9);
        assert!(weights.validate().is_ok());
        assert_eq!(weights.source_target, 3);
    }

    #[test]
    fn unbalanced_weights_are_rejected() {
        let mut weights = ScoringWeights::default();
        weights.relevance.keyword = 0.6;
        assert!(matches!(weights.validate(), Err(EvalError::ConfigError(_))));

        let mut weights = ScoringWeights::default();
        weights.generation.confidence = -0.1;
        weights.generation.length = 0.7;
        assert!(weights.validate().is_err());
    }

    #[test]
    fn length_boundaries() {
        let policy = LengthPolicy::default();
        assert_eq!(policy.score(50), 1.0);
        assert_eq!(policy.score(1000), 1.0);

        let short = policy.score(49);
        assert!(short < 1.0 && short >= 0.3);
        let long = policy.score(1001);
        assert!(long < 1.0 && long >= 0.3);

        assert_eq!(policy.score(0), 0.3);
        assert_eq!(policy.score(10_000), 0.3);
    }
}
