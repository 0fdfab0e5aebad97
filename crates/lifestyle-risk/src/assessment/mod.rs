//! Questionnaire risk scoring: a data-driven rule table evaluated against one answer set.
//!
//! Every request is scored from its own answers alone. The scorer holds only the immutable rule
//! table, so a single instance is shared across concurrent requests.

pub mod answers;
pub mod categories;
pub mod config;
pub mod profile;
pub mod router;
pub mod rules;
pub mod service;
mod standard;

#[cfg(test)]
mod tests;

pub use answers::{AnswerSet, AnswerValue};
pub use categories::{Band, CategoryTable};
pub use config::{DimensionSpec, DimensionTable, RuleConfig, RuleConfigError};
pub use profile::Profile;
pub use router::assessment_router;
pub use rules::{Condition, Delta, Dimension, Rule, Scale, ScoreComponent};
pub use service::{AssessmentReport, AssessmentResponse, AssessmentService};
pub use standard::HEALTHY_PROFILE_MESSAGE;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stateless evaluator applying a validated [`RuleConfig`] to answer sets.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    config: RuleConfig,
}

impl RiskScorer {
    pub fn new(config: RuleConfig) -> Result<Self, RuleConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn standard() -> Self {
        Self {
            config: RuleConfig::standard(),
        }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Scores one answer set. Total over partial input: never fails, never panics.
    pub fn score(&self, answers: &AnswerSet) -> RiskAssessment {
        let profile = Profile::normalize(answers, &self.config.defaults);
        let dimensions = &self.config.dimensions;

        let mut totals: [Option<f64>; 4] = [None; 4];
        for dimension in Dimension::ALL {
            totals[dimension.index()] = dimensions.get(dimension).map(|spec| spec.start);
        }

        let mut components = Vec::new();
        let mut recommendations = Vec::new();

        for rule in &self.config.rules {
            let Some(hit) = rule.apply(&profile) else {
                continue;
            };

            for component in hit.components {
                if let Some(total) = totals[component.dimension.index()].as_mut() {
                    *total += component.delta;
                    components.push(component);
                }
            }

            if let Some(text) = hit.recommendation {
                recommendations.push(text);
            }
        }

        let clamped = |dimension: Dimension| {
            let spec = dimensions.get(dimension)?;
            totals[dimension.index()].map(|total| spec.clamp(total))
        };

        let overall = clamped(Dimension::Overall).unwrap_or(dimensions.overall.min);
        let physical = clamped(Dimension::Physical).unwrap_or(dimensions.physical.min);
        let mental = clamped(Dimension::Mental).unwrap_or(dimensions.mental.min);
        let lifestyle = clamped(Dimension::Lifestyle);
        let category = self.config.categories.categorize(overall).to_string();

        if recommendations.is_empty() {
            recommendations.push(self.config.default_recommendation.clone());
        }

        debug!(
            overall,
            physical,
            mental,
            ?lifestyle,
            %category,
            fired = components.len(),
            "questionnaire scored"
        );

        RiskAssessment {
            overall,
            physical,
            mental,
            lifestyle,
            category,
            recommendations,
            components,
        }
    }
}

/// Scores, category and canned recommendations for one answer set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall: f64,
    pub physical: f64,
    pub mental: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<f64>,
    pub category: String,
    pub recommendations: Vec<String>,
    pub components: Vec<ScoreComponent>,
}
