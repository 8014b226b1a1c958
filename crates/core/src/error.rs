//! The fatal-error taxonomy surfaced to the user.
//!
//! Every variant is terminal for the session that raised it: the only
//! recovery affordance is a full reload. The display strings are the
//! exact user-facing messages.

/// Fallback text for gateway errors that arrive without a message.
pub const GENERIC_SDK_ERROR: &str =
    "An error occurred with the AI Interviewer. Please try again or contact support.";

/// A terminal error for the current call session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FatalError {
    /// Configuration guard: no workflow id for a generate session.
    #[error("Interview workflow is not configured. Please contact support.")]
    WorkflowNotConfigured,
    /// Configuration guard: no assistant id for a generate session.
    #[error("Assistant is not configured. Please contact support.")]
    AssistantNotConfigured,
    /// Configuration guard: user name or id is unknown.
    #[error("User information missing. Please login again.")]
    MissingUserIdentity,
    /// Configuration guard: no interviewer persona for a review session.
    #[error("No interviewer configured. Please contact support.")]
    InterviewerNotConfigured,
    /// Requesting a call from the gateway failed.
    #[error("Failed to start interview. Please check your internet connection or contact support.")]
    ConnectFailed,
    /// The gateway reported a runtime error during the call.
    #[error("{0}")]
    Sdk(String),
    /// The feedback collaborator returned an unsuccessful result.
    #[error("Error saving feedback. Redirecting to home.")]
    FeedbackRejected,
    /// The feedback collaborator failed outright.
    #[error("Unexpected error saving feedback.")]
    FeedbackFailed,
}

impl FatalError {
    /// Builds the gateway-error variant, substituting the generic
    /// fallback when the event carried no message.
    pub fn from_sdk_message(message: Option<String>) -> Self {
        FatalError::Sdk(message.unwrap_or_else(|| GENERIC_SDK_ERROR.to_string()))
    }
}
