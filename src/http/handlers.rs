//! Health and version endpoints.
//!
//! # Responsibilities
//! - Report liveness (`/healthz`) and build identity (`/version`)
//! - Shape both from a single chaos mode read taken on arrival
//!
//! # Chaos Behaviour
//! ```text
//! None    → 200 immediately
//! Error   → 500 {"error": "Chaos: Simulated error"} immediately
//! Timeout → no bytes for the chaos delay, then 200 as if None
//! ```
//!
//! # Design Decisions
//! - The timeout suspension is a per-request `tokio::time::sleep`; other
//!   requests keep being served
//! - A client disconnect drops the handler future, which cancels the sleep
//! - A mode change during the suspension does not affect the suspended request

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::chaos::ChaosMode;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

pub const X_APP_POOL: HeaderName = HeaderName::from_static("x-app-pool");
pub const X_RELEASE_ID: HeaderName = HeaderName::from_static("x-release-id");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReport {
    pub app: String,
    pub release: String,
    pub timestamp: String,
}

/// `GET /healthz`
pub async fn healthz(State(state): State<AppState>) -> Response {
    respond_with_chaos(&state, "healthz", || {
        Json(HealthReport {
            status: "healthy".to_string(),
        })
        .into_response()
    })
    .await
}

/// `GET /version`
pub async fn version(State(state): State<AppState>) -> Response {
    respond_with_chaos(&state, "version", || version_response(&state)).await
}

fn version_response(state: &AppState) -> Response {
    let identity = &state.identity;
    let report = VersionReport {
        app: identity.app_pool.clone(),
        release: identity.release_id.clone(),
        timestamp: state.clock.now_rfc3339(),
    };

    let mut response = Json(report).into_response();
    let headers = response.headers_mut();
    // Values that are not valid header text are still reported in the body
    if let Ok(pool) = HeaderValue::from_str(&identity.app_pool) {
        headers.insert(X_APP_POOL, pool);
    }
    if let Ok(release) = HeaderValue::from_str(&identity.release_id) {
        headers.insert(X_RELEASE_ID, release);
    }
    response
}

/// Read the chaos mode once, enforce it, and record the outcome.
///
/// `respond` builds the normal payload; it runs only when the request is
/// allowed to succeed.
async fn respond_with_chaos<F>(state: &AppState, endpoint: &'static str, respond: F) -> Response
where
    F: FnOnce() -> Response,
{
    let mode = state.chaos.current_mode();

    let response = match mode {
        ChaosMode::None => respond(),
        ChaosMode::Error => {
            tracing::warn!(endpoint, "Chaos: responding with simulated error");
            ApiError::SimulatedError.into_response()
        }
        ChaosMode::Timeout => {
            tracing::warn!(
                endpoint,
                delay_secs = state.chaos_delay.as_secs(),
                "Chaos: suspending response"
            );
            tokio::time::sleep(state.chaos_delay).await;
            tracing::info!(endpoint, "Chaos: suspension elapsed, responding normally");
            respond()
        }
    };

    metrics::record_request(endpoint, mode, response.status().as_u16());
    response
}
