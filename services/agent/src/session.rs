//! The call-session controller.
//!
//! Owns the local state of one interview call (status, transcript log,
//! speaking flag, fatal error), folds gateway events into it, and runs
//! the post-call pipeline exactly once when the call finishes.

use crate::{
    client::{
        AssistantOverrides, AssistantSelector, CallEvent, CallMessage, StartRequest,
        TranscriptType, VoiceClient,
    },
    config::Config,
    feedback::{FeedbackRequest, FeedbackService},
    view::ViewState,
};
use prepcall_core::{
    error::FatalError,
    interview::{AssistantDefinition, CallKind, format_questions},
    route::Route,
    status::CallStatus,
    transcript::{SavedMessage, TranscriptLog},
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Result of folding one gateway event into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    /// The session just entered `Finished`. The post-call reaction
    /// runs once for this edge; repeating the event is a no-op.
    Finished,
}

/// Identity and purpose of one interview session.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub kind: CallKind,
    pub user_name: Option<String>,
    pub user_id: Option<String>,
    pub interview_id: Option<String>,
    pub feedback_id: Option<String>,
    /// Questions asked during review sessions.
    pub questions: Vec<String>,
    /// Inline interviewer persona used by review sessions.
    pub interviewer: Option<AssistantDefinition>,
}

/// One voice interview from call request to conclusion.
pub struct CallSession {
    client: Arc<dyn VoiceClient>,
    feedback: Arc<dyn FeedbackService>,
    config: Arc<Config>,
    params: SessionParams,
    status: CallStatus,
    transcript: TranscriptLog,
    assistant_speaking: bool,
    fatal: Option<FatalError>,
    events: Option<broadcast::Receiver<CallEvent>>,
    outcome: Option<Route>,
}

impl CallSession {
    pub fn new(
        client: Arc<dyn VoiceClient>,
        feedback: Arc<dyn FeedbackService>,
        config: Arc<Config>,
        params: SessionParams,
    ) -> Self {
        Self {
            client,
            feedback,
            config,
            params,
            status: CallStatus::Inactive,
            transcript: TranscriptLog::new(),
            assistant_speaking: false,
            fatal: None,
            events: None,
            outcome: None,
        }
    }

    /// Subscribes to the client's event stream. Any previous
    /// subscription is dropped first, so repeated attaches never
    /// accumulate duplicate deliveries.
    pub fn attach(&mut self) {
        self.events = Some(self.client.subscribe());
    }

    /// Drops the event subscription. After this, no gateway event can
    /// mutate the session.
    pub fn detach(&mut self) {
        self.events = None;
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn transcript(&self) -> &TranscriptLog {
        &self.transcript
    }

    pub fn fatal(&self) -> Option<&FatalError> {
        self.fatal.as_ref()
    }

    pub fn is_assistant_speaking(&self) -> bool {
        self.assistant_speaking
    }

    /// Render-ready snapshot of the session.
    pub fn view(&self) -> ViewState {
        ViewState {
            status: self.status,
            user_name: self.params.user_name.clone(),
            assistant_speaking: self.assistant_speaking,
            last_message: self.transcript.last().map(|m| m.content.clone()),
            fatal_error: self.fatal.as_ref().map(|f| f.to_string()),
        }
    }

    /// Folds one gateway event into the session state.
    pub fn apply(&mut self, event: CallEvent) -> Transition {
        match event {
            CallEvent::CallStart => {
                info!("call started");
                self.status = CallStatus::Active;
                Transition::None
            }
            CallEvent::CallEnd => {
                info!("call ended");
                self.finish()
            }
            CallEvent::Message { message } => {
                if let CallMessage::Transcript {
                    transcript_type: TranscriptType::Final,
                    role,
                    transcript,
                } = message
                {
                    self.transcript.push(SavedMessage {
                        role,
                        content: transcript,
                    });
                }
                Transition::None
            }
            CallEvent::SpeechStart => {
                self.assistant_speaking = true;
                Transition::None
            }
            CallEvent::SpeechEnd => {
                self.assistant_speaking = false;
                Transition::None
            }
            CallEvent::Error { message } => {
                error!(message = ?message, "gateway reported an error");
                self.fatal = Some(FatalError::from_sdk_message(message));
                Transition::None
            }
        }
    }

    /// Requests a call from the gateway.
    ///
    /// The status moves to `Connecting` synchronously. Configuration
    /// guards run before any client call: a failed guard sets the
    /// specific fatal error, resets the status to `Inactive`, and
    /// makes zero calls to the gateway.
    pub async fn start_call(&mut self) {
        if !self.status.can_start() {
            warn!(status = %self.status, "call requested while one is underway");
            return;
        }
        self.status = CallStatus::Connecting;

        let request = match self.build_start_request() {
            Ok(request) => request,
            Err(fatal) => {
                self.abort_start(fatal);
                return;
            }
        };

        if let Err(e) = self.client.start(request).await {
            error!("failed to start the call: {e}");
            self.abort_start(FatalError::ConnectFailed);
        }
    }

    /// Ends the call locally, then asks the gateway to stop.
    ///
    /// `Finished` is set before the stop request resolves: the
    /// post-call reaction is driven by the local transition, and the
    /// gateway's own call-end event afterwards hits the idempotent
    /// edge and does nothing.
    pub async fn end_call(&mut self) -> Option<Route> {
        let transition = self.finish();
        if let Err(e) = self.client.stop().await {
            warn!("failed to stop the call cleanly: {e}");
        }
        match transition {
            Transition::Finished => Some(self.conclude().await),
            Transition::None => None,
        }
    }

    /// Drives the attached subscription until the call finishes
    /// (returning the route to navigate to) or a fatal error ends the
    /// session (returning `None`).
    pub async fn run(&mut self) -> Option<Route> {
        loop {
            let event = self.next_event().await?;
            debug!(event = ?event, "gateway event");
            match self.apply(event) {
                Transition::Finished => return Some(self.conclude().await),
                Transition::None => {
                    if self.fatal.is_some() {
                        return None;
                    }
                }
            }
        }
    }

    /// Receives the next event from the subscription, or `None` when
    /// the session is detached or the stream has closed.
    pub async fn next_event(&mut self) -> Option<CallEvent> {
        let events = self.events.as_mut()?;
        loop {
            match events.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Post-call reaction, run once per session with the final message
    /// log: generate sessions go home with no feedback call; review
    /// sessions create feedback and navigate to its page, falling back
    /// to home (with a fatal error) when the pipeline fails. Calling
    /// this again returns the already-computed route.
    pub async fn conclude(&mut self) -> Route {
        if let Some(route) = &self.outcome {
            return route.clone();
        }
        let route = self.run_post_call().await;
        self.outcome = Some(route.clone());
        route
    }

    async fn run_post_call(&mut self) -> Route {
        if self.params.kind == CallKind::Generate {
            info!("practice session finished; returning home");
            return Route::Home;
        }

        let (Some(interview_id), Some(user_id)) = (
            self.params.interview_id.clone(),
            self.params.user_id.clone(),
        ) else {
            error!("cannot create feedback without an interview id and user id");
            self.fatal = Some(FatalError::FeedbackFailed);
            return Route::Home;
        };

        let request = FeedbackRequest {
            interview_id: interview_id.clone(),
            user_id,
            transcript: self.transcript.as_slice().to_vec(),
            feedback_id: self.params.feedback_id.clone(),
        };

        match self.feedback.create(request).await {
            Ok(outcome) if outcome.success && outcome.feedback_id.is_some() => {
                info!(interview_id = %interview_id, "feedback created");
                Route::InterviewFeedback { interview_id }
            }
            Ok(_) => {
                warn!("feedback collaborator rejected the transcript");
                self.fatal = Some(FatalError::FeedbackRejected);
                Route::Home
            }
            Err(e) => {
                error!("feedback creation failed: {e}");
                self.fatal = Some(FatalError::FeedbackFailed);
                Route::Home
            }
        }
    }

    fn finish(&mut self) -> Transition {
        if self.status == CallStatus::Finished {
            return Transition::None;
        }
        self.status = CallStatus::Finished;
        Transition::Finished
    }

    fn abort_start(&mut self, fatal: FatalError) {
        self.fatal = Some(fatal);
        self.status = CallStatus::Inactive;
    }

    fn build_start_request(&self) -> Result<StartRequest, FatalError> {
        match self.params.kind {
            CallKind::Generate => {
                let workflow_id = self
                    .config
                    .workflow_id
                    .clone()
                    .ok_or(FatalError::WorkflowNotConfigured)?;
                let assistant_id = self
                    .config
                    .assistant_id
                    .clone()
                    .ok_or(FatalError::AssistantNotConfigured)?;
                let (Some(user_name), Some(user_id)) = (
                    self.params.user_name.clone(),
                    self.params.user_id.clone(),
                ) else {
                    return Err(FatalError::MissingUserIdentity);
                };

                let mut variables = HashMap::new();
                variables.insert("username".to_string(), user_name);
                variables.insert("userid".to_string(), user_id);

                Ok(StartRequest {
                    assistant: AssistantSelector::Id(assistant_id),
                    overrides: None,
                    metadata: None,
                    workflow_id: Some(workflow_id),
                    variable_values: Some(variables),
                })
            }
            CallKind::Review => {
                let interviewer = self
                    .params
                    .interviewer
                    .clone()
                    .ok_or(FatalError::InterviewerNotConfigured)?;

                let mut variables = HashMap::new();
                variables.insert(
                    "questions".to_string(),
                    format_questions(&self.params.questions),
                );

                Ok(StartRequest {
                    assistant: AssistantSelector::Inline(interviewer),
                    overrides: Some(AssistantOverrides {
                        variable_values: variables,
                    }),
                    metadata: None,
                    workflow_id: None,
                    variable_values: None,
                })
            }
        }
    }
}
