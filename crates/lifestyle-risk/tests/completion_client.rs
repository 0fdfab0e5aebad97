//! Completion client against a mocked OpenAI-compatible endpoint.
use std::sync::Arc;
use std::time::Duration;

use lifestyle_risk::config::EnrichmentConfig;
use lifestyle_risk::enrichment::{
    CompletionClient, EnrichmentMode, GenerationError, Generator, PromptContext,
    RecommendationEnricher, RecommendationSource, TextGenerator, FALLBACK_RECOMMENDATIONS,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> EnrichmentConfig {
    EnrichmentConfig {
        mode: EnrichmentMode::Replace,
        api_key: Some("sk-test".to_string()),
        base_url: server.uri(),
        model: "test-model".to_string(),
        timeout: Duration::from_millis(500),
        max_tokens: 64,
        feedback_max_tokens: 96,
        temperature: 0.2,
    }
}

fn context() -> PromptContext {
    PromptContext {
        feelings: Some("restless".to_string()),
        environment: None,
        overall: 640.0,
        category: "Moderate Risk".to_string(),
    }
}

#[tokio::test]
async fn returns_trimmed_completion_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "test-model", "max_tokens": 64 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "text": "\n\nTake short walks after meals.\n" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let generator = Generator::from_config(&config_for(&server)).expect("client builds");
    assert!(generator.is_enabled());

    let text = generator.generate("hello").await.expect("completion");
    assert_eq!(text, "Take short walks after meals.");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let generator = Generator::from_config(&config_for(&server)).expect("client builds");
    let err = generator.generate("hello").await.expect_err("should fail");

    match err {
        GenerationError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream down");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_choices_count_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let generator = Generator::from_config(&config_for(&server)).expect("client builds");
    assert!(matches!(
        generator.generate("hello").await,
        Err(GenerationError::EmptyResponse)
    ));
}

#[tokio::test]
async fn enricher_splits_generated_lines() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "text": "Sleep by eleven\n- Drink more water\n* Stretch daily" }]
        })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let generator = Arc::new(Generator::from_config(&config).expect("client builds"));
    let enricher = RecommendationEnricher::new(generator, config.mode, config.timeout);

    let result = enricher
        .recommendations(&context(), vec!["canned".to_string()])
        .await;
    assert_eq!(result.source, RecommendationSource::Generated);
    assert_eq!(
        result.items,
        vec!["Sleep by eleven", "Drink more water", "Stretch daily"]
    );
}

#[tokio::test]
async fn slow_endpoint_falls_back_within_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({ "choices": [{ "text": "late" }] })),
        )
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.timeout = Duration::from_millis(100);
    let generator = Arc::new(Generator::from_config(&config).expect("client builds"));
    let enricher = RecommendationEnricher::new(generator, EnrichmentMode::Replace, config.timeout);

    let started = std::time::Instant::now();
    let result = enricher.recommendations(&context(), Vec::new()).await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(result.source, RecommendationSource::Fallback);
    assert_eq!(result.items, FALLBACK_RECOMMENDATIONS.to_vec());
}

#[test]
fn endpoint_joins_base_url_without_double_slash() {
    let config = EnrichmentConfig {
        base_url: "http://completions.local/".to_string(),
        ..EnrichmentConfig::default()
    };
    let client = CompletionClient::new(&config, "sk-test").expect("client builds");

    assert_eq!(client.endpoint(), "http://completions.local/v1/completions");
}

#[tokio::test]
async fn feedback_uses_its_own_token_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_partial_json(json!({ "max_tokens": 96 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "text": "You sound restless; try an evening wind-down routine." }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_partial_json(json!({ "max_tokens": 64 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "text": "Walk after dinner" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let generator = Arc::new(Generator::from_config(&config).expect("client builds"));
    let enricher = RecommendationEnricher::new(generator, config.mode, config.timeout);

    let feedback = enricher.feedback(&context()).await;
    let recommendations = enricher.recommendations(&context(), Vec::new()).await;

    assert_eq!(
        feedback.as_deref(),
        Some("You sound restless; try an evening wind-down routine.")
    );
    assert_eq!(recommendations.items, vec!["Walk after dinner"]);
}
