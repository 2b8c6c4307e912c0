//! Text generation through the Mistral chat completions API.
//!
//! This module is only available when the `mistral` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};
use crate::generation::{GenerationRequest, TextGenerator};

const PROVIDER: &str = "Mistral";

/// The default Mistral API base.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

/// The default chat model.
pub const DEFAULT_MODEL: &str = "mistral-large-latest";

/// A [`TextGenerator`] backed by `POST /v1/chat/completions`.
///
/// The prompt is sent as a single user message.
///
/// # Example
///
/// ```rust,ignore
/// use meeting_rag::mistral::MistralGenerator;
///
/// let generator = MistralGenerator::from_env()?;
/// ```
pub struct MistralGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl MistralGenerator {
    /// Create a generator with the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RagError::ConfigError("Mistral API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
        })
    }

    /// Create a generator from `MISTRAL_API_KEY`, with optional
    /// `MISTRAL_MODEL` and `MISTRAL_BASE_URL` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `MISTRAL_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("MISTRAL_API_KEY").map_err(|_| {
            RagError::ConfigError("MISTRAL_API_KEY environment variable not set".into())
        })?;
        let mut generator = Self::new(api_key)?;
        if let Ok(model) = std::env::var("MISTRAL_MODEL") {
            generator = generator.with_model(model);
        }
        if let Ok(url) = std::env::var("MISTRAL_BASE_URL") {
            generator = generator.with_base_url(url);
        }
        Ok(generator)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

// ── API request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

fn generation_error(message: impl Into<String>) -> RagError {
    RagError::GenerationError { provider: PROVIDER.into(), message: message.into() }
}

#[async_trait]
impl TextGenerator for MistralGenerator {
    async fn complete(&self, request: &GenerationRequest) -> Result<String> {
        debug!(
            provider = PROVIDER,
            model = %self.model,
            prompt_len = request.prompt.len(),
            "requesting completion"
        );

        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: &request.prompt }],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                generation_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&text).map(|e| e.message).unwrap_or(text);

            error!(provider = PROVIDER, %status, "API error");
            return Err(generation_error(format!("API returned {status}: {detail}")));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            generation_error(format!("failed to parse response: {e}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| generation_error("API returned no completion text"))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
