//! Configuration loading from the environment and from disk.

use std::path::Path;
use std::str::FromStr;

use crate::config::schema::{FailoverContract, LogFormat, ServiceConfig};
use crate::config::validation::{validate_contract, validate_service_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Env {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ServiceConfig {
    /// Load and validate configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load and validate configuration from an arbitrary key lookup.
    ///
    /// Unset and empty variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = ServiceConfig::default();

        if let Some(host) = get("BIND_HOST") {
            config.listener.host = host;
        }
        if let Some(port) = get("PORT") {
            config.listener.port = parse_env("PORT", &port)?;
        }
        if let Some(pool) = get("APP_POOL") {
            config.identity.app_pool = pool;
        }
        if let Some(release) = get("RELEASE_ID") {
            config.identity.release_id = release;
        }
        if let Some(delay) = get("CHAOS_DELAY_SECS") {
            config.chaos.delay_secs = parse_env("CHAOS_DELAY_SECS", &delay)?;
        }
        if let Some(timeout) = get("REQUEST_TIMEOUT_SECS") {
            config.timeouts.request_secs = parse_env("REQUEST_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(format) = get("LOG_FORMAT") {
            config.observability.log_format = match format.to_ascii_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::Env {
                        key: "LOG_FORMAT",
                        value: format,
                        reason: "expected 'pretty' or 'json'".to_string(),
                    })
                }
            };
        }
        config.observability.metrics_address = get("METRICS_ADDRESS")
            .map(|addr| parse_env("METRICS_ADDRESS", &addr))
            .transpose()?;

        validate_service_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

fn parse_env<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Load and validate a failover contract from a TOML file.
pub fn load_contract(path: &Path) -> Result<FailoverContract, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let contract: FailoverContract = toml::from_str(&content)?;

    validate_contract(&contract).map_err(ConfigError::Validation)?;

    Ok(contract)
}
