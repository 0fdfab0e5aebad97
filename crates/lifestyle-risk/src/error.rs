use crate::assessment::RuleConfigError;
use crate::config::ConfigError;
use crate::enrichment::GenerationError;
use crate::telemetry::TelemetryError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

/// The only failure text a client ever sees.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "We could not process your assessment. Please try again later.";

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Rules(RuleConfigError),
    Enrichment(GenerationError),
    Io(std::io::Error),
    MalformedPayload(JsonRejection),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Rules(err) => write!(f, "rule table error: {}", err),
            AppError::Enrichment(err) => write!(f, "enrichment error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::MalformedPayload(err) => write!(f, "malformed payload: {}", err.body_text()),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Rules(err) => Some(err),
            AppError::Enrichment(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::MalformedPayload(err) => Some(err),
        }
    }
}

/// Every failure maps to a 500 with the fixed message; details stay in the logs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::MalformedPayload(_) => warn!(error = %self, "rejected assessment payload"),
            _ => error!(error = %self, "assessment request failed"),
        }

        let body = Json(json!({
            "status": "error",
            "message": GENERIC_FAILURE_MESSAGE,
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<RuleConfigError> for AppError {
    fn from(value: RuleConfigError) -> Self {
        Self::Rules(value)
    }
}

impl From<GenerationError> for AppError {
    fn from(value: GenerationError) -> Self {
        Self::Enrichment(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        Self::MalformedPayload(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn responses_never_leak_internal_details() {
        let err = AppError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk /var/secret exploded",
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("read body");
        let text = String::from_utf8(body.to_vec()).expect("utf8");
        assert!(!text.contains("secret"));
        assert!(text.contains(GENERIC_FAILURE_MESSAGE));
    }
}
