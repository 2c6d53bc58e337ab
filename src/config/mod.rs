//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! Service (bluegreen-chaos):
//!     process environment (PORT, APP_POOL, RELEASE_ID, ...)
//!     → loader.rs (read & parse, documented defaults)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!
//! Drill (chaosctl watch):
//!     contract file (TOML) or CLI flags
//!     → loader.rs (deserialize)
//!     → validation.rs
//!     → FailoverContract
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload
//! - All service fields have defaults so an empty environment is valid
//! - Validation separates syntactic (parse) from semantic checks and
//!   reports every problem at once

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_contract, ConfigError};
pub use schema::{
    ChaosConfig, FailoverContract, IdentityConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, PoolTarget, ProbeConfig, ServiceConfig, TimeoutConfig,
};
pub use validation::ValidationError;
