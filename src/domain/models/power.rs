//! Display power state model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Power state of the HDMI CEC display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    /// Confirmed on, including a display still warming up.
    On,
    /// Confirmed standby, including a display on its way there.
    Standby,
    /// No confirmed state.
    Unknown,
}

impl PowerState {
    /// Map a raw `power status:` value reported by `cec-client`.
    ///
    /// Transitional states count as the side they are moving toward, so a
    /// display warming up is not sent a second power-on command.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "on" | "in transition from standby to on" => Self::On,
            "standby" | "in transition from on to standby" => Self::Standby,
            _ => Self::Unknown,
        }
    }

    /// Whether this is a confirmed (non-`Unknown`) state.
    pub const fn is_confirmed(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Standby => "standby",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
