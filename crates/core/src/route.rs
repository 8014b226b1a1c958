//! Navigation targets emitted when a call session concludes.

use std::fmt;

/// Where the UI should go after a session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The home route, `/`.
    Home,
    /// The feedback page for a finished interview.
    InterviewFeedback { interview_id: String },
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::InterviewFeedback { interview_id } => {
                write!(f, "/interview/{interview_id}/feedback")
            }
        }
    }
}
