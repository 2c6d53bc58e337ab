//! Pool health state machine.
//!
//! # States
//! - Unknown: not probed yet, still eligible for traffic
//! - Healthy: receives traffic
//! - Unhealthy: withdrawn from rotation
//!
//! # State Transitions
//! ```text
//! Unknown   → Healthy:   first success
//! Unknown   → Unhealthy: first failure
//! Healthy   → Unhealthy: consecutive failures >= unhealthy_threshold
//! Unhealthy → Healthy:   consecutive successes >= healthy_threshold
//! ```
//!
//! Counters reset on every transition.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl HealthState {
    /// Unknown and Healthy pools are eligible for traffic.
    pub fn is_eligible(self) -> bool {
        self != HealthState::Unhealthy
    }
}

/// Health bookkeeping for one pool.
#[derive(Debug, Clone)]
pub struct PoolHealth {
    name: String,
    state: HealthState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    unhealthy_threshold: u32,
    healthy_threshold: u32,
}

impl PoolHealth {
    pub fn new(name: impl Into<String>, unhealthy_threshold: u32, healthy_threshold: u32) -> Self {
        Self {
            name: name.into(),
            state: HealthState::Unknown,
            consecutive_failures: 0,
            consecutive_successes: 0,
            unhealthy_threshold: unhealthy_threshold.max(1),
            healthy_threshold: healthy_threshold.max(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    /// Record a passed check. Returns the new state on transition.
    pub fn mark_success(&mut self) -> Option<HealthState> {
        self.consecutive_failures = 0;
        self.consecutive_successes += 1;

        let transition = match self.state {
            HealthState::Healthy => None,
            HealthState::Unknown => Some(HealthState::Healthy),
            HealthState::Unhealthy if self.consecutive_successes >= self.healthy_threshold => {
                Some(HealthState::Healthy)
            }
            HealthState::Unhealthy => None,
        };
        self.apply(transition)
    }

    /// Record a failed check. Returns the new state on transition.
    pub fn mark_failure(&mut self) -> Option<HealthState> {
        self.consecutive_successes = 0;
        self.consecutive_failures += 1;

        let transition = match self.state {
            HealthState::Unhealthy => None,
            HealthState::Unknown => Some(HealthState::Unhealthy),
            HealthState::Healthy if self.consecutive_failures >= self.unhealthy_threshold => {
                Some(HealthState::Unhealthy)
            }
            HealthState::Healthy => None,
        };
        self.apply(transition)
    }

    fn apply(&mut self, transition: Option<HealthState>) -> Option<HealthState> {
        if let Some(next) = transition {
            tracing::info!(pool = %self.name, from = ?self.state, to = ?next, "Pool health transition");
            self.state = next;
            self.consecutive_failures = 0;
            self.consecutive_successes = 0;
        }
        transition
    }
}
