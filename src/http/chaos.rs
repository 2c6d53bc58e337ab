//! Chaos control endpoints.
//!
//! Unauthenticated and idempotent; meant for trusted test networks only.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::chaos::{ChaosMode, InvalidModeError};
use crate::http::response::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct StartParams {
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosStarted {
    pub status: String,
    pub mode: ChaosMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosStopped {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosStatus {
    pub mode: ChaosMode,
}

/// `POST /chaos/start?mode=error|timeout`
pub async fn start(
    State(state): State<AppState>,
    params: Result<Query<StartParams>, QueryRejection>,
) -> Result<Json<ChaosStarted>, ApiError> {
    let input = match params {
        Ok(Query(params)) => params.mode.unwrap_or_default(),
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Malformed chaos start query");
            return Err(InvalidModeError::new("").into());
        }
    };

    let mode = ChaosMode::parse_injectable(&input).map_err(|e| {
        tracing::warn!(mode = %e.input, "Rejected chaos mode");
        e
    })?;
    state.chaos.set_mode(mode)?;

    Ok(Json(ChaosStarted {
        status: "chaos started".to_string(),
        mode,
    }))
}

/// `POST /chaos/stop`
pub async fn stop(State(state): State<AppState>) -> Json<ChaosStopped> {
    state.chaos.clear_mode();
    Json(ChaosStopped {
        status: "chaos stopped".to_string(),
    })
}

/// `GET /chaos`
pub async fn status(State(state): State<AppState>) -> Json<ChaosStatus> {
    Json(ChaosStatus {
        mode: state.chaos.current_mode(),
    })
}
