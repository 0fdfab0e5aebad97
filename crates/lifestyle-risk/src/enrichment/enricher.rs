use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::prompts::{fallback_feedback, fallback_recommendations, split_lines, PromptContext};
use super::{EnrichmentMode, GenerationError, TextGenerator};

/// Where the final recommendation list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Canned,
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub items: Vec<String>,
    pub source: RecommendationSource,
}

/// Wraps a [`TextGenerator`] with a per-call timeout and static fallbacks.
pub struct RecommendationEnricher<G> {
    generator: Arc<G>,
    mode: EnrichmentMode,
    timeout: Duration,
}

impl<G> RecommendationEnricher<G>
where
    G: TextGenerator + 'static,
{
    pub fn new(generator: Arc<G>, mode: EnrichmentMode, timeout: Duration) -> Self {
        Self {
            generator,
            mode,
            timeout,
        }
    }

    pub fn mode(&self) -> EnrichmentMode {
        self.mode
    }

    /// Combines canned recommendations with generated text according to the mode.
    pub async fn recommendations(
        &self,
        context: &PromptContext,
        canned: Vec<String>,
    ) -> Recommendations {
        if self.mode == EnrichmentMode::Off {
            return Recommendations {
                items: canned,
                source: RecommendationSource::Canned,
            };
        }

        let prompt = context.recommendations_prompt();
        let (generated, source) = match self.call(self.generator.generate(&prompt)).await {
            Ok(text) => {
                let items = split_lines(&text);
                if items.is_empty() {
                    warn!("generated recommendations were blank; using fallback list");
                    (fallback_recommendations(), RecommendationSource::Fallback)
                } else {
                    (items, RecommendationSource::Generated)
                }
            }
            Err(err) => {
                warn!(error = %err, mode = %self.mode, "recommendation generation failed; using fallback list");
                (fallback_recommendations(), RecommendationSource::Fallback)
            }
        };

        let items = match self.mode {
            EnrichmentMode::Supplement => canned.into_iter().chain(generated).collect(),
            _ => generated,
        };

        Recommendations { items, source }
    }

    /// Personalised feedback on the free-text answers; `None` when none were sent.
    pub async fn feedback(&self, context: &PromptContext) -> Option<String> {
        if !context.has_free_text() {
            return None;
        }
        if self.mode == EnrichmentMode::Off {
            return Some(fallback_feedback(context));
        }

        let prompt = context.feedback_prompt();
        match self.call(self.generator.generate_feedback(&prompt)).await {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(error = %err, "feedback generation failed; using fallback text");
                Some(fallback_feedback(context))
            }
        }
    }

    async fn call<F>(&self, request: F) -> Result<String, GenerationError>
    where
        F: Future<Output = Result<String, GenerationError>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(text)) => {
                info!(chars = text.len(), "text generation succeeded");
                Ok(text)
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Err(GenerationError::Timeout(self.timeout)),
        }
    }
}
