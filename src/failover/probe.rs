//! Single health check against one pool.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::{Duration, Instant};
use tokio::time;
use url::Url;

use crate::config::PoolTarget;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid probe target: {0}")]
    InvalidTarget(String),

    #[error("connection error: {0}")]
    Transport(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("non-success status {0}")]
    Status(StatusCode),
}

/// HTTP prober shared by both pools.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: Client<HttpConnector, Body>,
    path: String,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(path: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            path: path.into(),
            timeout,
        }
    }

    /// Probe one pool. `Ok` carries the round-trip latency.
    pub async fn check(&self, target: &PoolTarget) -> Result<Duration, ProbeError> {
        let uri = probe_uri(&target.url, &self.path)?;
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header("user-agent", "bluegreen-failover-probe")
            .body(Body::empty())
            .map_err(|e| ProbeError::InvalidTarget(e.to_string()))?;

        let started = Instant::now();
        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if status.is_success() {
                    Ok(started.elapsed())
                } else {
                    Err(ProbeError::Status(status))
                }
            }
            Ok(Err(e)) => Err(ProbeError::Transport(e.to_string())),
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }
}

fn probe_uri(base: &Url, path: &str) -> Result<String, ProbeError> {
    base.join(path)
        .map(String::from)
        .map_err(|e| ProbeError::InvalidTarget(format!("{base} + {path}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_uri_replaces_path() {
        let base: Url = "http://127.0.0.1:8081".parse().unwrap();
        assert_eq!(probe_uri(&base, "/healthz").unwrap(), "http://127.0.0.1:8081/healthz");

        let nested: Url = "http://blue.internal:3000/app/".parse().unwrap();
        assert_eq!(probe_uri(&nested, "/healthz").unwrap(), "http://blue.internal:3000/healthz");
    }

    #[tokio::test]
    async fn test_unreachable_pool_is_transport_error() {
        // bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = HealthProbe::new("/healthz", Duration::from_secs(2));
        let target = PoolTarget {
            name: "blue".into(),
            url: format!("http://{addr}").parse().unwrap(),
        };

        let err = probe.check(&target).await.unwrap_err();
        assert!(matches!(err, ProbeError::Transport(_)), "{err}");
    }
}
