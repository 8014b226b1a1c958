//! The render-ready snapshot of a call session.

use prepcall_core::status::CallStatus;

/// Everything the call view needs for one render: the two cards, the
/// most recent transcript line, and the action control. A set fatal
/// error replaces the whole view with an error panel offering a
/// reload.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub status: CallStatus,
    pub user_name: Option<String>,
    /// Drives the speaking indicator on the assistant card.
    pub assistant_speaking: bool,
    pub last_message: Option<String>,
    pub fatal_error: Option<String>,
}

/// The single action control shown below the call view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallControl {
    /// The "Call" affordance; pulses while the session is connecting.
    Dial { pulsing: bool },
    /// The "End" affordance, shown while the call is active.
    HangUp,
}

impl ViewState {
    /// The control to render, or `None` when the error panel has
    /// replaced the call view.
    pub fn control(&self) -> Option<CallControl> {
        if self.fatal_error.is_some() {
            return None;
        }
        match self.status {
            CallStatus::Active => Some(CallControl::HangUp),
            status => Some(CallControl::Dial {
                pulsing: status == CallStatus::Connecting,
            }),
        }
    }
}
