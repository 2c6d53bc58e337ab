//! Chaos injection subsystem.
//!
//! # Data Flow
//! ```text
//! POST /chaos/start?mode=error|timeout
//!     → mode.rs (parse & validate requested mode)
//!     → state.rs (atomic swap, transition logged)
//!
//! GET /healthz, GET /version
//!     → state.rs (single read per request)
//!     → handlers shape the response from that read
//! ```
//!
//! # Design Decisions
//! - One mode per process, held in an owned `ChaosState` shared via `Arc`
//! - No history: the previous mode is only reported in the transition log
//! - Nothing is persisted; a restart always comes back in `None`

pub mod mode;
pub mod state;

pub use mode::{ChaosMode, InvalidModeError};
pub use state::ChaosState;
