//! Blue/green failover chaos backend library.

pub mod chaos;
pub mod config;
pub mod failover;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use chaos::{ChaosMode, ChaosState};
pub use config::{FailoverContract, ServiceConfig};
pub use failover::FailoverMonitor;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
