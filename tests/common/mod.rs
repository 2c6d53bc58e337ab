//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

use bluegreen_chaos::config::ServiceConfig;
use bluegreen_chaos::http::{AppState, HttpServer};
use bluegreen_chaos::lifecycle::Shutdown;

/// A backend instance running on an ephemeral local port.
#[allow(dead_code)]
pub struct TestBackend {
    pub addr: SocketAddr,
    pub state: AppState,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestBackend {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a backend reporting `pool`/`release` with the given chaos delay.
pub async fn start_backend(pool: &str, release: &str, delay: Duration) -> TestBackend {
    let mut config = ServiceConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.identity.app_pool = pool.into();
    config.identity.release_id = release.into();
    config.chaos.delay_secs = delay.as_secs().max(1);
    config.timeouts.request_secs = config.chaos.delay_secs + 30;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config);
    let state = server.state().clone();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    TestBackend {
        addr,
        state,
        shutdown,
    }
}

/// Client that never reuses connections between tests.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
