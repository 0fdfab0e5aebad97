use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::answers::AnswerSet;
use super::config::RuleConfig;
use super::{RiskAssessment, RiskScorer};
use crate::enrichment::{
    PromptContext, RecommendationEnricher, RecommendationSource, TextGenerator,
};

/// Service composing the scorer with the optional text enrichment step.
pub struct AssessmentService<G> {
    scorer: Arc<RiskScorer>,
    enricher: RecommendationEnricher<G>,
}

impl<G> AssessmentService<G>
where
    G: TextGenerator + 'static,
{
    pub fn new(scorer: RiskScorer, enricher: RecommendationEnricher<G>) -> Self {
        Self {
            scorer: Arc::new(scorer),
            enricher,
        }
    }

    pub fn rules(&self) -> &RuleConfig {
        self.scorer.config()
    }

    /// Scores the answers, then enriches. Enrichment failures degrade to fallback text.
    pub async fn assess(&self, answers: AnswerSet) -> AssessmentReport {
        let assessment = self.scorer.score(&answers);
        let context = PromptContext::from_answers(&answers, &assessment);

        let (recommendations, text_feedback) = tokio::join!(
            self.enricher
                .recommendations(&context, assessment.recommendations.clone()),
            self.enricher.feedback(&context),
        );

        info!(
            overall = assessment.overall,
            category = %assessment.category,
            mode = %self.enricher.mode(),
            source = ?recommendations.source,
            answered = answers.len(),
            "assessment completed"
        );

        AssessmentReport {
            assessment,
            recommendations: recommendations.items,
            recommendation_source: recommendations.source,
            text_feedback,
            assessed_at: Utc::now(),
        }
    }
}

/// Scored assessment plus the final (possibly enriched) texts.
#[derive(Debug, Clone)]
pub struct AssessmentReport {
    pub assessment: RiskAssessment,
    pub recommendations: Vec<String>,
    pub recommendation_source: RecommendationSource,
    pub text_feedback: Option<String>,
    pub assessed_at: DateTime<Utc>,
}

impl AssessmentReport {
    pub fn response(&self) -> AssessmentResponse {
        AssessmentResponse {
            status: "success",
            risk_score: self.assessment.overall,
            risk_category: self.assessment.category.clone(),
            physical_score: self.assessment.physical,
            mental_score: self.assessment.mental,
            lifestyle_score: self.assessment.lifestyle,
            recommendations: self.recommendations.clone(),
            text_feedback: self.text_feedback.clone(),
            assessed_at: self.assessed_at,
        }
    }
}

/// Client-facing success body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub status: &'static str,
    pub risk_score: f64,
    pub risk_category: String,
    pub physical_score: f64,
    pub mental_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifestyle_score: Option<f64>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_feedback: Option<String>,
    pub assessed_at: DateTime<Utc>,
}
