use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::decisions::EligibilityConfig;

const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.75;

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

/// Top-level configuration for the decision service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
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

        let risk_adjustment_cap = match env::var("DECISION_RISK_ADJUSTMENT_CAP") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_risk_cap(&raw)?),
            _ => None,
        };

        let confidence_threshold = match env::var("DECISION_CONFIDENCE_THRESHOLD") {
            Ok(raw) if !raw.trim().is_empty() => parse_confidence_threshold(&raw)?,
            _ => DEFAULT_CONFIDENCE_THRESHOLD,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            engine: EngineConfig {
                risk_adjustment_cap,
                confidence_threshold,
                eligibility: EligibilityConfig::default(),
            },
        })
    }
}

fn parse_risk_cap(raw: &str) -> Result<f64, ConfigError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 1.0 => Ok(value),
        _ => Err(ConfigError::InvalidRiskCap {
            value: raw.to_string(),
        }),
    }
}

fn parse_confidence_threshold(raw: &str) -> Result<f64, ConfigError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Ok(value),
        _ => Err(ConfigError::InvalidConfidenceThreshold {
            value: raw.to_string(),
        }),
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs injected into the scoring engines.
///
/// `risk_adjustment_cap` is `None` by default, which leaves the surgical risk multiplier
/// unbounded. Deployments that want a clamp opt in through `DECISION_RISK_ADJUSTMENT_CAP`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub risk_adjustment_cap: Option<f64>,
    pub confidence_threshold: f64,
    pub eligibility: EligibilityConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk_adjustment_cap: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            eligibility: EligibilityConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRiskCap { value: String },
    InvalidConfidenceThreshold { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRiskCap { value } => write!(
                f,
                "DECISION_RISK_ADJUSTMENT_CAP must be a finite number >= 1.0 (found '{value}')"
            ),
            ConfigError::InvalidConfidenceThreshold { value } => write!(
                f,
                "DECISION_CONFIDENCE_THRESHOLD must be within [0, 1] (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidRiskCap { .. }
            | ConfigError::InvalidConfidenceThreshold { .. } => None,
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
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("DECISION_RISK_ADJUSTMENT_CAP");
        env::remove_var("DECISION_CONFIDENCE_THRESHOLD");
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
        assert_eq!(config.engine, EngineConfig::default());
        assert!(config.engine.risk_adjustment_cap.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_engine_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        env::set_var("DECISION_RISK_ADJUSTMENT_CAP", "3.0");
        env::set_var("DECISION_CONFIDENCE_THRESHOLD", "0.6");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.engine.risk_adjustment_cap, Some(3.0));
        assert_eq!(config.engine.confidence_threshold, 0.6);
        reset_env();
    }

    #[test]
    fn rejects_risk_cap_below_baseline() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DECISION_RISK_ADJUSTMENT_CAP", "0.5");
        let err = AppConfig::load().expect_err("cap below 1.0 is rejected");
        assert!(matches!(err, ConfigError::InvalidRiskCap { .. }));
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_confidence_threshold() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DECISION_CONFIDENCE_THRESHOLD", "1.5");
        let err = AppConfig::load().expect_err("threshold above 1.0 is rejected");
        assert!(err.to_string().contains("DECISION_CONFIDENCE_THRESHOLD"));
        reset_env();
    }
}
