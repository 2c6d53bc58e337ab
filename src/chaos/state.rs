//! Process-owned chaos mode flag.
//!
//! # Responsibilities
//! - Hold the single active `ChaosMode`
//! - Provide linearizable read/write access under concurrent requests
//! - Log every transition
//!
//! # Design Decisions
//! - Stored as one `AtomicU8`; a read can never observe a torn value
//! - Writes use `swap` so racing control calls are serialized and the
//!   previous mode is known for the transition log
//! - `SeqCst` ordering: a write is visible to every request arriving after it

use std::sync::atomic::{AtomicU8, Ordering};

use crate::chaos::mode::{ChaosMode, InvalidModeError};
use crate::observability::metrics;

/// Shared chaos state injected into request handlers.
#[derive(Debug, Default)]
pub struct ChaosState {
    mode: AtomicU8,
}

impl ChaosState {
    /// Create a state in `ChaosMode::None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate a failure mode. Returns the mode that was active before.
    ///
    /// `ChaosMode::None` is rejected; use [`ChaosState::clear_mode`].
    pub fn set_mode(&self, mode: ChaosMode) -> Result<ChaosMode, InvalidModeError> {
        if !mode.is_active() {
            return Err(InvalidModeError::new(mode.as_str()));
        }
        Ok(self.transition(mode))
    }

    /// Reset to `ChaosMode::None`. Returns the mode that was active before.
    pub fn clear_mode(&self) -> ChaosMode {
        self.transition(ChaosMode::None)
    }

    /// Current mode. Never blocks.
    pub fn current_mode(&self) -> ChaosMode {
        ChaosMode::from(self.mode.load(Ordering::SeqCst))
    }

    fn transition(&self, to: ChaosMode) -> ChaosMode {
        let from = ChaosMode::from(self.mode.swap(to as u8, Ordering::SeqCst));
        if from == to {
            tracing::debug!(mode = %to, "Chaos mode unchanged");
        } else {
            tracing::info!(from = %from, to = %to, "Chaos mode transition");
        }
        metrics::record_mode_transition(to);
        from
    }
}
