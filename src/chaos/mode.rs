//! Failure-simulation modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Active failure-simulation mode.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChaosMode {
    /// Normal operation.
    #[default]
    None = 0,
    /// Health and version fail fast with 500.
    Error = 1,
    /// Health and version stall for the chaos delay, then succeed.
    Timeout = 2,
}

impl ChaosMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ChaosMode::None => "none",
            ChaosMode::Error => "error",
            ChaosMode::Timeout => "timeout",
        }
    }

    /// Parse a mode that may be injected through the control interface.
    ///
    /// Only `error` and `timeout` are accepted; `none` is reachable through
    /// `/chaos/stop` alone.
    pub fn parse_injectable(input: &str) -> Result<Self, InvalidModeError> {
        match input.parse::<ChaosMode>()? {
            ChaosMode::None => Err(InvalidModeError::new(input)),
            mode => Ok(mode),
        }
    }

    pub fn is_active(self) -> bool {
        self != ChaosMode::None
    }
}

impl From<u8> for ChaosMode {
    fn from(val: u8) -> Self {
        match val {
            1 => ChaosMode::Error,
            2 => ChaosMode::Timeout,
            _ => ChaosMode::None,
        }
    }
}

impl FromStr for ChaosMode {
    type Err = InvalidModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ChaosMode::None),
            "error" => Ok(ChaosMode::Error),
            "timeout" => Ok(ChaosMode::Timeout),
            other => Err(InvalidModeError::new(other)),
        }
    }
}

impl fmt::Display for ChaosMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected chaos mode input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid chaos mode {input:?}, expected 'error' or 'timeout'")]
pub struct InvalidModeError {
    pub input: String,
}

impl InvalidModeError {
    pub fn new(input: impl Into<String>) -> Self {
        Self { input: input.into() }
    }
}
