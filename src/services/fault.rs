//! Edge-triggered fault tracking for the monitor's failure classes.
//!
//! Each class (device unreachable, kiosk process unhealthy) is a tiny
//! two-state machine: NORMAL until the first failure, FLAGGED until the
//! next success. Only the edges produce notifications, so an outage of
//! any length costs exactly one problem and one resolved message.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// State of one fault class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultState {
    /// Everything observed healthy.
    Normal,
    /// At least one failure seen; waiting for recovery.
    Flagged,
}

/// A state change produced by an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultTransition {
    /// First failure after healthy operation.
    Raised,
    /// First success after a failure run.
    Cleared,
}

/// One debounced fault class.
#[derive(Debug, Clone)]
pub struct FaultFlag {
    name: &'static str,
    state: FaultState,
}

impl FaultFlag {
    pub const fn new(name: &'static str) -> Self {
        Self { name, state: FaultState::Normal }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn state(&self) -> FaultState {
        self.state
    }

    pub const fn is_flagged(&self) -> bool {
        matches!(self.state, FaultState::Flagged)
    }

    /// Record one observation. Returns `Some` only on an edge; repeated
    /// failures and repeated successes are silent.
    pub fn observe(&mut self, healthy: bool) -> Option<FaultTransition> {
        match (self.state, healthy) {
            (FaultState::Normal, false) => {
                self.state = FaultState::Flagged;
                warn!(fault = self.name, "Fault raised");
                Some(FaultTransition::Raised)
            }
            (FaultState::Flagged, true) => {
                self.state = FaultState::Normal;
                info!(fault = self.name, "Fault cleared");
                Some(FaultTransition::Cleared)
            }
            _ => None,
        }
    }
}
