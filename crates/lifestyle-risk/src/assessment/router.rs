use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};

use super::answers::AnswerSet;
use super::config::RuleConfig;
use super::service::{AssessmentResponse, AssessmentService};
use crate::enrichment::TextGenerator;
use crate::error::AppError;

/// Router exposing the assessment endpoint under its canonical path and the legacy aliases
/// older questionnaire front-ends post to.
pub fn assessment_router<G>(service: Arc<AssessmentService<G>>) -> Router
where
    G: TextGenerator + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(assess_handler::<G>))
        .route("/assess", post(assess_handler::<G>))
        .route("/submit", post(assess_handler::<G>))
        .route("/calculate", post(assess_handler::<G>))
        .route("/api/v1/rules", get(rules_handler::<G>))
        .with_state(service)
}

pub(crate) async fn assess_handler<G>(
    State(service): State<Arc<AssessmentService<G>>>,
    payload: Result<Json<AnswerSet>, JsonRejection>,
) -> Result<Json<AssessmentResponse>, AppError>
where
    G: TextGenerator + 'static,
{
    let Json(answers) = payload?;
    let report = service.assess(answers).await;
    Ok(Json(report.response()))
}

pub(crate) async fn rules_handler<G>(
    State(service): State<Arc<AssessmentService<G>>>,
) -> Json<RuleConfig>
where
    G: TextGenerator + 'static,
{
    Json(service.rules().clone())
}
