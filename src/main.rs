//! Blue/green failover chaos backend.
//!
//! One instance runs per pool member behind a primary/backup reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────┐
//!   client ──────▶│      reverse proxy       │
//!                 │  primary ▸ backup groups │
//!                 └─────┬──────────────┬─────┘
//!           GET /healthz│              │GET /healthz
//!                       ▼              ▼
//!             ┌──────────────┐  ┌──────────────┐
//!             │ blue (this)  │  │ green (this) │
//!             │ ChaosState   │  │ ChaosState   │
//!             └──────▲───────┘  └──────────────┘
//!                    │ POST /chaos/start?mode=error|timeout
//!                 operator / chaosctl
//! ```
//!
//! Configuration comes from the environment: `PORT`, `APP_POOL`, `RELEASE_ID`,
//! `CHAOS_DELAY_SECS`, `REQUEST_TIMEOUT_SECS`, `BIND_HOST`, `METRICS_ADDRESS`,
//! `LOG_FORMAT`, `RUST_LOG`.

use tokio::net::TcpListener;

use bluegreen_chaos::config::ServiceConfig;
use bluegreen_chaos::http::HttpServer;
use bluegreen_chaos::lifecycle::{wait_for_signal, Shutdown};
use bluegreen_chaos::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env()?;

    logging::init_logging(
        config.observability.log_format,
        "bluegreen_chaos=info,tower_http=info",
    );
    tracing::info!("bluegreen-chaos v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        app_pool = %config.identity.app_pool,
        release_id = %config.identity.release_id,
        chaos_delay_secs = config.chaos.delay_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if let Some(addr) = config.observability.metrics_address {
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
