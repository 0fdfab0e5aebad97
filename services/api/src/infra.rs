use crate::cli::RuleSourceArgs;
use lifestyle_risk::assessment::{AssessmentService, RiskScorer, RuleConfig};
use lifestyle_risk::config::{EnrichmentConfig, ScoringConfig};
use lifestyle_risk::enrichment::{EnrichmentMode, Generator, RecommendationEnricher};
use lifestyle_risk::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Command-line selection wins over the environment; otherwise the configured source is used.
pub(crate) fn resolve_rules(
    source: &RuleSourceArgs,
    scoring: &ScoringConfig,
) -> Result<RuleConfig, AppError> {
    let rules = match (&source.rules, &source.preset) {
        (Some(path), _) => RuleConfig::from_path(path)?,
        (None, Some(preset)) => RuleConfig::preset(preset)?,
        (None, None) => scoring.load_rules()?,
    };
    Ok(rules)
}

pub(crate) fn build_service(
    rules: RuleConfig,
    enrichment: &EnrichmentConfig,
    mode: EnrichmentMode,
) -> Result<AssessmentService<Generator>, AppError> {
    let scorer = RiskScorer::new(rules)?;
    let generator = Generator::from_config(enrichment)?;

    if mode != EnrichmentMode::Off && !generator.is_enabled() {
        warn!(%mode, "enrichment requested without an API key; fallback text will be used");
    }
    let endpoint = match &generator {
        Generator::Completion(client) => client.endpoint(),
        Generator::Disabled => "disabled",
    };
    info!(
        %mode,
        rules = scorer.config().rules.len(),
        endpoint,
        "assessment service configured"
    );

    let enricher = RecommendationEnricher::new(Arc::new(generator), mode, enrichment.timeout);
    Ok(AssessmentService::new(scorer, enricher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifestyle_risk::assessment::RuleConfigError;

    #[test]
    fn preset_argument_overrides_configured_source() {
        let source = RuleSourceArgs {
            rules: None,
            preset: Some("compact".to_string()),
        };
        let rules = resolve_rules(&source, &ScoringConfig::default()).expect("preset loads");
        assert_eq!(rules.dimensions.overall.max, 100.0);

        let original = RuleSourceArgs {
            rules: None,
            preset: Some("original".to_string()),
        };
        let rules = resolve_rules(&original, &ScoringConfig::default()).expect("preset loads");
        assert_eq!(rules.dimensions.overall.start, 1000.0);
    }

    #[test]
    fn missing_rule_file_surfaces_as_rules_error() {
        let source = RuleSourceArgs {
            rules: Some("/no/such/rules.json".into()),
            preset: None,
        };
        let err = resolve_rules(&source, &ScoringConfig::default()).expect_err("missing file");
        assert!(matches!(err, AppError::Rules(RuleConfigError::Io { .. })));
    }

    #[tokio::test]
    async fn service_without_key_still_scores() {
        let service = build_service(
            RuleConfig::standard(),
            &EnrichmentConfig::default(),
            EnrichmentMode::Replace,
        )
        .expect("service builds");

        let report = service.assess(Default::default()).await;
        assert_eq!(report.assessment.category, "Very Low Risk");
        assert_eq!(report.recommendations.len(), 3);
    }
}
