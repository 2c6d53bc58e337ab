//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (parsing handles syntax)
//! - Keep the server request deadline above the chaos delay
//! - Keep the assumed proxy check timeout below the chaos delay
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function over the config value
//! - Runs before the config is accepted into the system

use crate::config::schema::{FailoverContract, ServiceConfig};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("port must be non-zero")]
    ZeroPort,

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error(
        "request timeout ({request_secs}s) must exceed the chaos delay ({delay_secs}s)"
    )]
    RequestTimeoutTooShort { request_secs: u64, delay_secs: u64 },

    #[error(
        "probe timeout ({timeout_ms}ms) must be shorter than the chaos delay ({delay_secs}s) to detect timeout mode"
    )]
    ProbeTimeoutTooLong { timeout_ms: u64, delay_secs: u64 },

    #[error("probe path must start with '/': {0:?}")]
    InvalidPath(String),

    #[error("primary and backup must point at different pools ({0})")]
    SamePool(String),
}

/// Validate a backend instance configuration.
pub fn validate_service_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "BIND_HOST" });
    }
    if config.identity.app_pool.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "APP_POOL" });
    }
    if config.identity.release_id.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "RELEASE_ID" });
    }
    if config.chaos.delay_secs == 0 {
        errors.push(ValidationError::NotPositive { field: "CHAOS_DELAY_SECS" });
    }
    if config.timeouts.request_secs <= config.chaos.delay_secs {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request_secs: config.timeouts.request_secs,
            delay_secs: config.chaos.delay_secs,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a failover contract.
pub fn validate_contract(contract: &FailoverContract) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let probe = &contract.probe;

    if probe.interval_ms == 0 {
        errors.push(ValidationError::NotPositive { field: "probe.interval_ms" });
    }
    if probe.timeout_ms == 0 {
        errors.push(ValidationError::NotPositive { field: "probe.timeout_ms" });
    }
    if probe.unhealthy_threshold == 0 {
        errors.push(ValidationError::NotPositive { field: "probe.unhealthy_threshold" });
    }
    if probe.healthy_threshold == 0 {
        errors.push(ValidationError::NotPositive { field: "probe.healthy_threshold" });
    }
    if !probe.path.starts_with('/') {
        errors.push(ValidationError::InvalidPath(probe.path.clone()));
    }
    if contract.chaos_delay_secs == 0 {
        errors.push(ValidationError::NotPositive { field: "chaos_delay_secs" });
    }
    if probe.timeout_ms >= contract.chaos_delay_secs.saturating_mul(1_000) {
        errors.push(ValidationError::ProbeTimeoutTooLong {
            timeout_ms: probe.timeout_ms,
            delay_secs: contract.chaos_delay_secs,
        });
    }
    if contract.primary.url == contract.backup.url {
        errors.push(ValidationError::SamePool(contract.primary.url.to_string()));
    }
    if contract.primary.name.trim().is_empty() || contract.backup.name.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "pool name" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
