//! Embedding provider for OpenAI-compatible `/v1/embeddings` endpoints.
//!
//! This module is only available when the `openai` feature is enabled. Any
//! server speaking the OpenAI embeddings protocol works (OpenAI itself, a
//! text-embeddings-inference deployment, Ollama, ...), which lets query
//! vectors come from the same model that produced the stored vectors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const PROVIDER: &str = "OpenAICompatible";

/// The default API base.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/v1";

/// The default model, matching the model used to embed stored fragments.
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// The default dimensionality for `all-MiniLM-L6-v2`.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// An [`EmbeddingProvider`] backed by an OpenAI-compatible embeddings API.
///
/// # Configuration
///
/// - `base_url` – defaults to [`DEFAULT_BASE_URL`]; `EMBEDDING_BASE_URL` in [`from_env`](Self::from_env).
/// - `model` – defaults to [`DEFAULT_MODEL`]; `EMBEDDING_MODEL`.
/// - `dimensions` – defaults to [`DEFAULT_DIMENSIONS`]; `EMBEDDING_DIMENSIONS`.
/// - `api_key` – optional; `EMBEDDING_API_KEY`.
pub struct OpenAICompatibleEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimensions: usize,
}

impl OpenAICompatibleEmbeddingProvider {
    /// Create a provider for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the URL is empty.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(RagError::ConfigError("embedding base URL must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a provider from `EMBEDDING_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `EMBEDDING_DIMENSIONS` is not a positive integer.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("EMBEDDING_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut provider = Self::new(base_url)?;

        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            provider = provider.with_model(model);
        }
        if let Ok(dims) = std::env::var("EMBEDDING_DIMENSIONS") {
            let dims: usize = dims.parse().ok().filter(|d| *d > 0).ok_or_else(|| {
                RagError::ConfigError(format!(
                    "EMBEDDING_DIMENSIONS must be a positive integer, got '{dims}'"
                ))
            })?;
            provider = provider.with_dimensions(dims);
        }
        if let Ok(key) = std::env::var("EMBEDDING_API_KEY") {
            provider = provider.with_api_key(key);
        }
        Ok(provider)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the expected output dimensions.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }
}

// ── API request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

fn embedding_error(message: impl Into<String>) -> RagError {
    RagError::EmbeddingError { provider: PROVIDER.into(), message: message.into() }
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for OpenAICompatibleEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| embedding_error("API returned empty response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = PROVIDER, batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body = EmbeddingRequest { model: &self.model, input: texts.to_vec() };

        let mut request = self.client.post(self.embeddings_url()).json(&request_body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "request failed");
            embedding_error(format!("request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(embedding_error(format!("API returned {status}: {detail}")));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            embedding_error(format!("failed to parse response: {e}"))
        })?;

        let vectors: Vec<Vec<f32>> =
            embedding_response.data.into_iter().map(|d| d.embedding).collect();
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimensions) {
            return Err(embedding_error(format!(
                "model returned {} dimensions, expected {}",
                bad.len(),
                self.dimensions
            )));
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
