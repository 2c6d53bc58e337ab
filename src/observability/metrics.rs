//! Metrics collection and exposition.
//!
//! # Metrics
//! - `chaos_requests_total` (counter): health/version requests by endpoint, mode, status
//! - `chaos_mode` (gauge): 0=none, 1=error, 2=timeout
//! - `chaos_mode_transitions_total` (counter): control calls by target mode
//! - `failover_probe_total` (counter): probe outcomes by pool
//! - `failover_active_pool` (gauge): 1 for the pool currently selected
//!
//! # Design Decisions
//! - Exposed through the Prometheus HTTP exporter on its own listener
//! - Labels kept low-cardinality (fixed endpoint and pool names)

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

use crate::chaos::ChaosMode;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    register_metric_descriptions();
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

fn register_metric_descriptions() {
    describe_counter!(
        "chaos_requests_total",
        "Health and version requests by endpoint, chaos mode and status"
    );
    describe_gauge!("chaos_mode", "Active chaos mode (0=none, 1=error, 2=timeout)");
    describe_counter!(
        "chaos_mode_transitions_total",
        "Chaos control calls by target mode"
    );
    describe_counter!("failover_probe_total", "Failover probe outcomes by pool");
    describe_gauge!("failover_active_pool", "1 for the pool the proxy should route to");
}

/// Record a served health/version request.
pub fn record_request(endpoint: &'static str, mode: ChaosMode, status: u16) {
    counter!(
        "chaos_requests_total",
        "endpoint" => endpoint,
        "mode" => mode.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a chaos mode transition.
pub fn record_mode_transition(to: ChaosMode) {
    counter!("chaos_mode_transitions_total", "to" => to.as_str()).increment(1);
    gauge!("chaos_mode").set(f64::from(to as u8));
}

/// Record one probe result for a pool.
pub fn record_probe(pool: &str, healthy: bool) {
    let outcome = if healthy { "success" } else { "failure" };
    counter!(
        "failover_probe_total",
        "pool" => pool.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record which pool is currently selected.
pub fn record_active_pool(pool: &str, active: bool) {
    gauge!("failover_active_pool", "pool" => pool.to_string()).set(if active { 1.0 } else { 0.0 });
}
