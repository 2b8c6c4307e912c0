//! Generation capability: prompt in, text out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// A text-generation backend.
///
/// Implementations report every failure (network, provider, quota, empty
/// response) as [`RagError::GenerationError`](crate::RagError::GenerationError).
/// Callers in this crate never let that error escape; see
/// [`AnswerSynthesizer`](crate::AnswerSynthesizer).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a completion for the request.
    async fn complete(&self, request: &GenerationRequest) -> Result<String>;

    /// A short name for logs and telemetry.
    fn name(&self) -> &str;
}
