//! Failover contract verification.
//!
//! Models how the fronting proxy is expected to react to the backends, so a
//! drill can tell which pool should be receiving traffic at any moment.
//!
//! # Data Flow
//! ```text
//! Periodic timer (monitor.rs)
//!     → probe.rs (GET <pool>/healthz with the contract timeout)
//!     → state.rs (per-pool hysteresis)
//!     → selection: primary unless withdrawn, else backup, else none
//!     → published on a watch channel, transitions logged
//! ```
//!
//! # Design Decisions
//! - Non-2xx is a failure; exceeding the probe timeout is a failure
//! - Both pools are probed concurrently each round
//! - An abandoned probe drops its connection, which also releases the
//!   suspended request on a backend in timeout mode

pub mod monitor;
pub mod probe;
pub mod state;

pub use monitor::{FailoverMonitor, FailoverStatus, PoolRole};
pub use probe::{HealthProbe, ProbeError};
pub use state::{HealthState, PoolHealth};
