//! Configuration for retrieval and answer synthesis.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters shared by the retriever, synthesizer, and orchestrator.
///
/// Generation parameters are held constant across calls so that answer
/// quality stays comparable between evaluation runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Number of results to retrieve when the caller does not pass a limit.
    pub default_limit: usize,
    /// Number of top-ranked fragments rendered into the generation context (K).
    pub context_window: usize,
    /// Multiplier applied to the mean top-K similarity before clamping to 1.0.
    pub confidence_boost: f32,
    /// Sampling temperature passed to the generation capability.
    pub temperature: f32,
    /// Maximum output length passed to the generation capability.
    pub max_output_tokens: u32,
    /// Upper bound on a single generation call. Expiry is treated as a generation failure.
    #[serde(with = "duration_secs")]
    pub generation_timeout: Duration,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            context_window: 5,
            confidence_boost: 1.2,
            temperature: 0.3,
            max_output_tokens: 1000,
            generation_timeout: Duration::from_secs(60),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// The caller's limit, or `default_limit` when none was given.
    pub fn limit_or_default(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit)
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the default retrieval limit.
    pub fn default_limit(mut self, limit: usize) -> Self {
        self.config.default_limit = limit;
        self
    }

    /// Set how many top-ranked fragments feed the generation context.
    pub fn context_window(mut self, k: usize) -> Self {
        self.config.context_window = k;
        self
    }

    /// Set the confidence boost factor.
    pub fn confidence_boost(mut self, boost: f32) -> Self {
        self.config.confidence_boost = boost;
        self
    }

    /// Set the generation temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the maximum number of generated tokens.
    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.config.max_output_tokens = tokens;
        self
    }

    /// Set the timeout applied to each generation call.
    pub fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.config.generation_timeout = timeout;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `default_limit == 0` or `context_window == 0`
    /// - `confidence_boost` is not a positive finite number
    /// - `temperature` is outside `[0, 2]`
    /// - `max_output_tokens == 0` or `generation_timeout` is zero
    pub fn build(self) -> Result<RagConfig> {
        let c = &self.config;
        if c.default_limit == 0 {
            return Err(RagError::ConfigError("default_limit must be greater than zero".into()));
        }
        if c.context_window == 0 {
            return Err(RagError::ConfigError("context_window must be greater than zero".into()));
        }
        if !c.confidence_boost.is_finite() || c.confidence_boost <= 0.0 {
            return Err(RagError::ConfigError(format!(
                "confidence_boost ({}) must be a positive finite number",
                c.confidence_boost
            )));
        }
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(RagError::ConfigError(format!(
                "temperature ({}) must be within [0, 2]",
                c.temperature
            )));
        }
        if c.max_output_tokens == 0 {
            return Err(RagError::ConfigError("max_output_tokens must be greater than zero".into()));
        }
        if c.generation_timeout.is_zero() {
            return Err(RagError::ConfigError("generation_timeout must be non-zero".into()));
        }
        Ok(self.config)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_parameters() {
        let config = RagConfig::default();
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.context_window, 5);
        assert!((config.confidence_boost - 1.2).abs() < f32::EPSILON);
        assert!((config.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.max_output_tokens, 1000);
    }

    #[test]
    fn builder_accepts_custom_values() {
        let config = RagConfig::builder()
            .default_limit(3)
            .context_window(2)
            .confidence_boost(1.0)
            .temperature(0.0)
            .generation_timeout(Duration::from_millis(250))
            .build()
            .unwrap();
        assert_eq!(config.default_limit, 3);
        assert_eq!(config.context_window, 2);
        assert_eq!(config.generation_timeout, Duration::from_millis(250));
    }

    #[test]
    fn requested_limit_overrides_default() {
        let config = RagConfig::builder().default_limit(7).build().unwrap();
        assert_eq!(config.limit_or_default(None), 7);
        assert_eq!(config.limit_or_default(Some(3)), 3);
        assert_eq!(RagConfig::default().limit_or_default(None), 10);
    }

    #[test]
    fn builder_rejects_invalid_values() {
        assert!(RagConfig::builder().default_limit(0).build().is_err());
        assert!(RagConfig::builder().context_window(0).build().is_err());
        assert!(RagConfig::builder().confidence_boost(0.0).build().is_err());
        assert!(RagConfig::builder().confidence_boost(f32::NAN).build().is_err());
        assert!(RagConfig::builder().temperature(2.5).build().is_err());
        assert!(RagConfig::builder().max_output_tokens(0).build().is_err());
        assert!(RagConfig::builder().generation_timeout(Duration::ZERO).build().is_err());
    }

    #[test]
    fn timeout_serializes_as_seconds() {
        let json = serde_json::to_value(RagConfig::default()).unwrap();
        assert_eq!(json["generation_timeout"], 60.0);
        let back: RagConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, RagConfig::default());
    }
}
