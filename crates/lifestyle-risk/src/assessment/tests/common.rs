use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{json, Value};

use crate::assessment::{AnswerSet, AssessmentService, RiskScorer, RuleConfig};
use crate::enrichment::{EnrichmentMode, GenerationError, RecommendationEnricher, TextGenerator};

pub(super) fn healthy_answers() -> AnswerSet {
    serde_json::from_value(json!({
        "age": 22,
        "smoke": "No",
        "conditions": ["none"],
        "height": 170,
        "weight": 65,
        "stress": 3,
        "sleep": "7-8",
        "diet": "Good",
        "exercise": "Daily",
    }))
    .expect("healthy answers deserialize")
}

pub(super) fn high_risk_answers() -> AnswerSet {
    serde_json::from_value(json!({
        "age": 55,
        "smoke": "Yes",
        "smokeAmount": "More than 20",
        "conditions": ["diabetes", "hypertension"],
        "height": 160,
        "weight": 95,
        "stress": 9,
        "sleep": "Less than 5",
        "diet": "Poor",
        "exercise": "Never",
    }))
    .expect("high risk answers deserialize")
}

pub(super) fn scorer() -> RiskScorer {
    RiskScorer::new(RuleConfig::standard()).expect("standard rules validate")
}

/// Generator returning a fixed text and recording the prompts it saw.
#[derive(Default)]
pub(super) struct RecordingGenerator {
    pub(super) reply: String,
    pub(super) prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub(super) fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt mutex poisoned").clone()
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts
            .lock()
            .expect("prompt mutex poisoned")
            .push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

pub(super) struct UnavailableGenerator;

#[async_trait]
impl TextGenerator for UnavailableGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Status {
            status: 429,
            body: "quota exceeded".to_string(),
        })
    }
}

pub(super) fn build_service<G: TextGenerator + 'static>(
    generator: Arc<G>,
    mode: EnrichmentMode,
) -> AssessmentService<G> {
    let enricher = RecommendationEnricher::new(generator, mode, Duration::from_millis(200));
    AssessmentService::new(scorer(), enricher)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
