//! Optional AI text enrichment for assessment results.
//!
//! The scorer never depends on this module. Generation failures of any kind are absorbed here
//! and replaced with static fallback text.

mod client;
mod enricher;
mod prompts;

pub use client::CompletionClient;
pub use enricher::{RecommendationEnricher, RecommendationSource, Recommendations};
pub use prompts::{
    fallback_feedback, fallback_recommendations, PromptContext, FALLBACK_RECOMMENDATIONS,
};

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EnrichmentConfig;

/// External text-completion collaborator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Longer-form free-text feedback. Generators without a separate budget reuse `generate`.
    async fn generate_feedback(&self, prompt: &str) -> Result<String, GenerationError> {
        self.generate(prompt).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("text generation is not configured")]
    Disabled,
    #[error("text generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("completion transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion response contained no text")]
    EmptyResponse,
}

/// How generated text combines with the canned recommendations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentMode {
    /// Canned recommendations only; no external calls for the list.
    #[default]
    Off,
    /// Canned recommendations followed by generated (or fallback) items.
    Supplement,
    /// Generated (or fallback) items instead of the canned ones.
    Replace,
}

impl EnrichmentMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "disabled" | "canned" => Some(Self::Off),
            "supplement" | "append" => Some(Self::Supplement),
            "replace" | "ai" => Some(Self::Replace),
            _ => None,
        }
    }
}

impl fmt::Display for EnrichmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EnrichmentMode::Off => "off",
            EnrichmentMode::Supplement => "supplement",
            EnrichmentMode::Replace => "replace",
        };
        f.write_str(label)
    }
}

/// Generator selected from configuration: the HTTP client when an API key is present.
pub enum Generator {
    Completion(CompletionClient),
    Disabled,
}

impl Generator {
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, GenerationError> {
        match config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                Ok(Self::Completion(CompletionClient::new(config, key)?))
            }
            _ => Ok(Self::Disabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Generator::Completion(_))
    }
}

#[async_trait]
impl TextGenerator for Generator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        match self {
            Generator::Completion(client) => client.generate(prompt).await,
            Generator::Disabled => Err(GenerationError::Disabled),
        }
    }

    async fn generate_feedback(&self, prompt: &str) -> Result<String, GenerationError> {
        match self {
            Generator::Completion(client) => client.generate_feedback(prompt).await,
            Generator::Disabled => Err(GenerationError::Disabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_aliases() {
        assert_eq!(EnrichmentMode::parse("Replace"), Some(EnrichmentMode::Replace));
        assert_eq!(EnrichmentMode::parse(" append "), Some(EnrichmentMode::Supplement));
        assert_eq!(EnrichmentMode::parse("none"), Some(EnrichmentMode::Off));
        assert_eq!(EnrichmentMode::parse("sometimes"), None);
    }

    #[tokio::test]
    async fn generator_without_key_is_disabled() {
        let config = EnrichmentConfig::default();
        let generator = Generator::from_config(&config).expect("builds");

        assert!(!generator.is_enabled());
        assert!(matches!(
            generator.generate("hello").await,
            Err(GenerationError::Disabled)
        ));
    }
}
