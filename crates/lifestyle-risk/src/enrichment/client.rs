use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{GenerationError, TextGenerator};
use crate::config::EnrichmentConfig;

/// Client for an OpenAI-compatible `/v1/completions` endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    feedback_max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

impl CompletionClient {
    /// Request timeout matches the enrichment timeout.
    pub fn new(config: &EnrichmentConfig, api_key: &str) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/completions", config.base_url.trim_end_matches('/')),
            api_key: api_key.trim().to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            feedback_max_tokens: config.feedback_max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for CompletionClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.complete(prompt, self.max_tokens).await
    }

    async fn generate_feedback(&self, prompt: &str) -> Result<String, GenerationError> {
        self.complete(prompt, self.feedback_max_tokens).await
    }
}

impl CompletionClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        let body = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens,
            temperature: self.temperature,
        };

        debug!(endpoint = %self.endpoint, model = %self.model, max_tokens, "requesting completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!(status, "completion endpoint rejected request");
            return Err(GenerationError::Status { status, body });
        }

        let payload: CompletionResponse = response.json().await?;
        let text = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(text)
    }
}
