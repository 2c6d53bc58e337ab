//! Configuration schema definitions.
//!
//! `ServiceConfig` configures one backend instance. `FailoverContract`
//! describes how the fronting proxy is assumed to check the two pools.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

/// Default suspension applied to health/version requests in `Timeout` mode.
pub const DEFAULT_CHAOS_DELAY_SECS: u64 = 30;

/// Value reported for pool name and release id when unset.
pub const UNKNOWN: &str = "unknown";

/// Root configuration for a backend instance.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Build identity reported by `/version`.
    pub identity: IdentityConfig,

    /// Chaos behaviour.
    pub chaos: ChaosConfig,

    /// Server-side timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host to bind (`BIND_HOST`).
    pub host: String,

    /// Port to bind (`PORT`).
    pub port: u16,
}

impl ListenerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Application identity reported to callers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct IdentityConfig {
    /// Pool name, e.g. `blue` or `green` (`APP_POOL`).
    pub app_pool: String,

    /// Release identifier (`RELEASE_ID`).
    pub release_id: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            app_pool: UNKNOWN.to_string(),
            release_id: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChaosConfig {
    /// Suspension in `Timeout` mode, in seconds (`CHAOS_DELAY_SECS`).
    pub delay_secs: u64,
}

impl ChaosConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            delay_secs: DEFAULT_CHAOS_DELAY_SECS,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for one request, in seconds (`REQUEST_TIMEOUT_SECS`).
    /// Must exceed the chaos delay.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log format (`LOG_FORMAT`).
    pub log_format: LogFormat,

    /// Prometheus exporter bind address (`METRICS_ADDRESS`). Disabled when unset.
    pub metrics_address: Option<SocketAddr>,
}

/// One upstream pool as seen by the fronting proxy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PoolTarget {
    /// Pool name used in logs and metrics.
    pub name: String,

    /// Base URL of the pool member, e.g. `http://127.0.0.1:8081`.
    pub url: Url,
}

/// Health check parameters assumed for the fronting proxy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    /// Path to probe.
    pub path: String,

    /// Interval between check rounds in milliseconds.
    pub interval_ms: u64,

    /// Per-check timeout in milliseconds.
    pub timeout_ms: u64,

    /// Consecutive failures before a pool is withdrawn.
    pub unhealthy_threshold: u32,

    /// Consecutive successes before a pool is restored.
    pub healthy_threshold: u32,
}

impl ProbeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            path: "/healthz".to_string(),
            interval_ms: 5_000,
            timeout_ms: 2_000,
            unhealthy_threshold: 1,
            healthy_threshold: 1,
        }
    }
}

/// Failover contract between the two pools and the fronting proxy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FailoverContract {
    /// Preferred pool.
    pub primary: PoolTarget,

    /// Pool that takes traffic while primary is withdrawn.
    pub backup: PoolTarget,

    #[serde(default)]
    pub probe: ProbeConfig,

    /// Chaos delay the backends are running with, in seconds.
    #[serde(default = "default_chaos_delay_secs")]
    pub chaos_delay_secs: u64,
}

fn default_chaos_delay_secs() -> u64 {
    DEFAULT_CHAOS_DELAY_SECS
}

impl FailoverContract {
    /// Contract with default probe parameters.
    pub fn new(primary: PoolTarget, backup: PoolTarget) -> Self {
        Self {
            primary,
            backup,
            probe: ProbeConfig::default(),
            chaos_delay_secs: DEFAULT_CHAOS_DELAY_SECS,
        }
    }
}
