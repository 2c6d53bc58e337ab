//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with health, version and chaos handlers
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Bind server to listener and serve until shutdown

use axum::{
    body::Body,
    http::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::chaos::ChaosState;
use crate::config::{IdentityConfig, ServiceConfig};
use crate::http::clock::MonotonicClock;
use crate::http::request::{request_id, RequestUuid, X_REQUEST_ID};
use crate::http::{chaos, handlers, response};
use crate::lifecycle::shutdown::ShutdownSignal;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub chaos: Arc<ChaosState>,
    pub identity: Arc<IdentityConfig>,
    pub chaos_delay: Duration,
    pub clock: Arc<MonotonicClock>,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            chaos: Arc::new(ChaosState::new()),
            identity: Arc::new(config.identity.clone()),
            chaos_delay: config.chaos.delay(),
            clock: Arc::new(MonotonicClock::new()),
        }
    }
}

/// HTTP server for one backend instance.
#[derive(Debug)]
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let state = AppState::new(&config);
        let router = build_router(state.clone(), Duration::from_secs(config.timeouts.request_secs));
        Self {
            router,
            config,
            state,
        }
    }

    /// Handle to the shared state (chaos flag, identity).
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Router with all middleware applied, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// In-flight requests are drained after shutdown is signalled.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            app_pool = %self.config.identity.app_pool,
            release_id = %self.config.identity.release_id,
            chaos_delay_secs = self.config.chaos.delay_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, RequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/version", get(handlers::version))
        .route("/chaos", get(chaos::status))
        .route("/chaos/start", post(chaos::start))
        .route("/chaos/stop", post(chaos::stop))
        .fallback(response::not_found)
        .method_not_allowed_fallback(response::method_not_allowed)
        .with_state(state)
        .layer(middleware)
}
