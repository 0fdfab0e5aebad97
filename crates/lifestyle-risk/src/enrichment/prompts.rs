use crate::assessment::{AnswerSet, RiskAssessment};

pub const FALLBACK_RECOMMENDATIONS: [&str; 3] = [
    "Exercise regularly to improve physical health.",
    "Reduce stress through relaxation techniques.",
    "Get more sleep for better well-being.",
];

const NOT_PROVIDED: &str = "not provided";

/// Subset of the answers and scores forwarded to the text generator.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub feelings: Option<String>,
    pub environment: Option<String>,
    pub overall: f64,
    pub category: String,
}

impl PromptContext {
    pub fn from_answers(answers: &AnswerSet, assessment: &RiskAssessment) -> Self {
        Self {
            feelings: answers.text("feelings"),
            environment: answers.text("environment"),
            overall: assessment.overall,
            category: assessment.category.clone(),
        }
    }

    /// Free-text feedback only makes sense when the client sent free text.
    pub fn has_free_text(&self) -> bool {
        self.feelings.is_some() || self.environment.is_some()
    }

    fn feelings(&self) -> &str {
        self.feelings.as_deref().unwrap_or(NOT_PROVIDED)
    }

    fn environment(&self) -> &str {
        self.environment.as_deref().unwrap_or(NOT_PROVIDED)
    }

    pub fn recommendations_prompt(&self) -> String {
        format!(
            "Generate health recommendations based on the following input: \nFeelings: {}\nEnvironment: {}\nRisk category: {} (score {:.0})",
            self.feelings(),
            self.environment(),
            self.category,
            self.overall
        )
    }

    pub fn feedback_prompt(&self) -> String {
        format!(
            "Provide personalized feedback based on the following input:\nFeelings: {}\nEnvironment: {}",
            self.feelings(),
            self.environment()
        )
    }
}

pub fn fallback_recommendations() -> Vec<String> {
    FALLBACK_RECOMMENDATIONS
        .iter()
        .map(|item| item.to_string())
        .collect()
}

pub fn fallback_feedback(context: &PromptContext) -> String {
    format!(
        "Your emotional state in the past week has been described as: {}. You live in an environment where: {}. It would be beneficial to reflect on these and make adjustments to your lifestyle accordingly.",
        context.feelings(),
        context.environment()
    )
}

/// One recommendation per non-empty line, with list markers stripped.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}
