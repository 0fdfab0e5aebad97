use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::{build_service, read_json_body, RecordingGenerator};
use crate::assessment::assessment_router;
use crate::enrichment::EnrichmentMode;
use crate::error::GENERIC_FAILURE_MESSAGE;

fn router() -> axum::Router {
    let generator = Arc::new(RecordingGenerator::replying("unused"));
    assessment_router(Arc::new(build_service(generator, EnrichmentMode::Off)))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn assessment_endpoint_returns_success_payload() {
    let body = json!({
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
    })
    .to_string();

    let response = router()
        .oneshot(post_json("/api/v1/assessments", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "success");
    assert_eq!(payload["riskScore"], 1000.0);
    assert_eq!(payload["riskCategory"], "Very High Risk");
    assert_eq!(payload["physicalScore"], 0.0);
    assert_eq!(payload["mentalScore"], 380.0);
    assert_eq!(payload["lifestyleScore"], 1000.0);
    assert_eq!(payload["recommendations"].as_array().map(Vec::len), Some(7));
    assert!(payload.get("textFeedback").is_none());
    assert!(payload["assessedAt"].is_string());
}

#[tokio::test]
async fn legacy_aliases_share_the_handler() {
    for uri in ["/assess", "/submit", "/calculate"] {
        let response = router()
            .oneshot(post_json(uri, r#"{"age": 22, "exercise": "Daily"}"#))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK, "alias {uri}");
        let payload = read_json_body(response).await;
        assert_eq!(payload["riskCategory"], "Very Low Risk");
    }
}

#[tokio::test]
async fn free_text_answers_produce_feedback() {
    let body = r#"{"feelings": "tired lately", "environment": "open-plan office"}"#;
    let response = router()
        .oneshot(post_json("/api/v1/assessments", body))
        .await
        .expect("response");

    let payload = read_json_body(response).await;
    let feedback = payload["textFeedback"].as_str().expect("feedback text");
    assert!(feedback.contains("tired lately"));
}

#[tokio::test]
async fn malformed_body_returns_generic_failure() {
    for body in ["{not json", "[1, 2, 3]"] {
        let response = router()
            .oneshot(post_json("/api/v1/assessments", body))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let payload = read_json_body(response).await;
        assert_eq!(
            payload,
            json!({ "status": "error", "message": GENERIC_FAILURE_MESSAGE })
        );
    }
}

#[tokio::test]
async fn rules_endpoint_exposes_active_table() {
    let request = Request::builder()
        .uri("/api/v1/rules")
        .body(Body::empty())
        .expect("request");
    let response = router().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let payload: Value = read_json_body(response).await;
    assert_eq!(payload["dimensions"]["overall"]["max"], 1000.0);
    assert_eq!(payload["rules"][0]["id"], "age_senior");
    assert_eq!(payload["categories"][0]["label"], "Very Low Risk");
}
