use crate::cli::{RuleSourceArgs, ServeArgs};
use crate::infra::{build_service, resolve_rules, AppState};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lifestyle_risk::config::AppConfig;
use lifestyle_risk::error::AppError;
use lifestyle_risk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let rules = resolve_rules(&RuleSourceArgs::default(), &config.scoring)?;
    let service = Arc::new(build_service(
        rules,
        &config.enrichment,
        config.enrichment.mode,
    )?);

    let app = with_assessment_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, enrichment = %config.enrichment.mode, "risk assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
