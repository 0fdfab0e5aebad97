use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::assessment::{RuleConfig, RuleConfigError};
use crate::enrichment::EnrichmentMode;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
    pub enrichment: EnrichmentConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            Err(_) => LogFormat::Compact,
        };

        let scoring = ScoringConfig {
            rules_path: non_empty_var("RISK_RULES_PATH").map(PathBuf::from),
            preset: non_empty_var("RISK_RULES_PRESET").unwrap_or_else(|| "standard".to_string()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            scoring,
            enrichment: EnrichmentConfig::from_env()?,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty_var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        None => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" | "" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Which rule table the scorer runs with.
#[derive(Debug, Clone, Default)]
pub struct ScoringConfig {
    pub rules_path: Option<PathBuf>,
    pub preset: String,
}

impl ScoringConfig {
    /// A rule file takes precedence over the named preset.
    pub fn load_rules(&self) -> Result<RuleConfig, RuleConfigError> {
        match &self.rules_path {
            Some(path) => RuleConfig::from_path(path),
            None => RuleConfig::preset(&self.preset),
        }
    }
}

/// Settings for the external text-completion collaborator.
#[derive(Clone)]
pub struct EnrichmentConfig {
    pub mode: EnrichmentMode,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    /// Token budget for the recommendation list.
    pub max_tokens: u32,
    /// Token budget for free-text feedback.
    pub feedback_max_tokens: u32,
    pub temperature: f32,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            mode: EnrichmentMode::Off,
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo-instruct".to_string(),
            timeout: Duration::from_millis(8_000),
            max_tokens: 150,
            feedback_max_tokens: 200,
            temperature: 0.7,
        }
    }
}

impl EnrichmentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let api_key = non_empty_var("OPENAI_API_KEY");

        let mode = match non_empty_var("ENRICHMENT_MODE") {
            Some(raw) => {
                EnrichmentMode::parse(&raw).ok_or(ConfigError::InvalidEnrichmentMode(raw))?
            }
            None if api_key.is_some() => EnrichmentMode::Replace,
            None => EnrichmentMode::Off,
        };

        Ok(Self {
            mode,
            api_key,
            base_url: non_empty_var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: non_empty_var("OPENAI_MODEL").unwrap_or(defaults.model),
            timeout: Duration::from_millis(parsed_var("ENRICHMENT_TIMEOUT_MS", 8_000u64)?),
            max_tokens: parsed_var("ENRICHMENT_MAX_TOKENS", defaults.max_tokens)?,
            feedback_max_tokens: parsed_var(
                "ENRICHMENT_FEEDBACK_MAX_TOKENS",
                defaults.feedback_max_tokens,
            )?,
            temperature: parsed_var("ENRICHMENT_TEMPERATURE", defaults.temperature)?,
        })
    }
}

impl fmt::Debug for EnrichmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnrichmentConfig")
            .field("mode", &self.mode)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("feedback_max_tokens", &self.feedback_max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidEnrichmentMode(String),
    InvalidNumber { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json' (got '{value}')")
            }
            ConfigError::InvalidEnrichmentMode(value) => write!(
                f,
                "ENRICHMENT_MODE must be 'off', 'supplement' or 'replace' (got '{value}')"
            ),
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be numeric (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "RISK_RULES_PATH",
            "RISK_RULES_PRESET",
            "ENRICHMENT_MODE",
            "OPENAI_API_KEY",
            "OPENAI_BASE_URL",
            "OPENAI_MODEL",
            "ENRICHMENT_TIMEOUT_MS",
            "ENRICHMENT_MAX_TOKENS",
            "ENRICHMENT_FEEDBACK_MAX_TOKENS",
            "ENRICHMENT_TEMPERATURE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.log_format, LogFormat::Compact);
        assert_eq!(config.scoring.preset, "standard");
        assert_eq!(config.enrichment.mode, EnrichmentMode::Off);
        assert_eq!(config.enrichment.timeout, Duration::from_millis(8_000));
        assert_eq!(config.enrichment.max_tokens, 150);
        assert_eq!(config.enrichment.feedback_max_tokens, 200);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn api_key_enables_replace_mode_by_default() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("ENRICHMENT_TIMEOUT_MS", "250");
        env::set_var("ENRICHMENT_FEEDBACK_MAX_TOKENS", "320");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.enrichment.mode, EnrichmentMode::Replace);
        assert_eq!(config.enrichment.timeout, Duration::from_millis(250));
        assert_eq!(config.enrichment.feedback_max_tokens, 320);
        assert!(!format!("{:?}", config.enrichment).contains("sk-test"));
    }

    #[test]
    fn rejects_unknown_enrichment_mode() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ENRICHMENT_MODE", "sometimes");
        let result = AppConfig::load();
        reset_env();

        assert!(matches!(result, Err(ConfigError::InvalidEnrichmentMode(_))));
    }

    #[test]
    fn rule_file_takes_precedence_over_preset() {
        let scoring = ScoringConfig {
            rules_path: Some(PathBuf::from("/definitely/missing/rules.json")),
            preset: "compact".to_string(),
        };
        assert!(matches!(
            scoring.load_rules(),
            Err(RuleConfigError::Io { .. })
        ));
    }
}
