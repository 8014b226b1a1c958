//! The feedback-creation collaborator invoked after review sessions.
//!
//! One POST per finished review call; no retry, no cancellation. The
//! collaborator computes the actual feedback from the transcript.

use async_trait::async_trait;
use prepcall_core::transcript::SavedMessage;
use serde::{Deserialize, Serialize};

/// Payload handed to the feedback collaborator.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub interview_id: String,
    pub user_id: String,
    pub transcript: Vec<SavedMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<String>,
}

/// Result returned by the feedback collaborator.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackOutcome {
    pub success: bool,
    #[serde(default)]
    pub feedback_id: Option<String>,
}

/// A client capable of creating feedback from a finished transcript.
#[async_trait]
pub trait FeedbackService: Send + Sync {
    async fn create(&self, request: FeedbackRequest) -> anyhow::Result<FeedbackOutcome>;
}

/// HTTP implementation posting to the configured feedback endpoint.
pub struct HttpFeedbackService {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpFeedbackService {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl FeedbackService for HttpFeedbackService {
    async fn create(&self, request: FeedbackRequest) -> anyhow::Result<FeedbackOutcome> {
        let outcome = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<FeedbackOutcome>()
            .await?;
        Ok(outcome)
    }
}
