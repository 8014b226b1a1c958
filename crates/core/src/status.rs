//! The four-state lifecycle of a voice call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a call session.
///
/// The only legal flow is `Inactive`/`Finished` → `Connecting` (on a
/// call request) → `Active` (on the gateway's call-start event) →
/// `Finished` (on the gateway's call-end event or a local disconnect).
/// A session never returns to `Inactive`; a fresh session value is the
/// only way back.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Inactive,
    Connecting,
    Active,
    Finished,
}

impl CallStatus {
    /// Whether a new call may be requested from this state.
    pub fn can_start(&self) -> bool {
        matches!(self, CallStatus::Inactive | CallStatus::Finished)
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallStatus::Inactive => write!(f, "inactive"),
            CallStatus::Connecting => write!(f, "connecting"),
            CallStatus::Active => write!(f, "active"),
            CallStatus::Finished => write!(f, "finished"),
        }
    }
}
