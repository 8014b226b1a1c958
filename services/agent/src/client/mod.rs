//! The vendor voice-gateway seam: call events, the client trait, and
//! the process-wide shared client instance.

pub mod gateway;

pub use gateway::GatewayClient;

use async_trait::async_trait;
use prepcall_core::interview::AssistantDefinition;
use prepcall_core::transcript::MessageRole;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast;
use tracing::warn;

/// Environment variable holding the gateway web access token.
pub const WEB_TOKEN_VAR: &str = "VOICE_WEB_TOKEN";
/// Environment variable overriding the gateway endpoint.
pub const GATEWAY_URL_VAR: &str = "VOICE_GATEWAY_URL";

const DEFAULT_GATEWAY_URL: &str = "wss://gateway.prepcall.dev/call";

/// Finality of a transcript fragment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptType {
    Partial,
    Final,
}

/// Payload of a gateway `message` event. Only transcript messages are
/// consumed; everything else decodes to `Other` and is ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CallMessage {
    Transcript {
        #[serde(rename = "transcriptType")]
        transcript_type: TranscriptType,
        role: MessageRole,
        transcript: String,
    },
    #[serde(other)]
    Other,
}

/// Events emitted by the voice gateway during a call, one variant per
/// wire frame kind.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CallEvent {
    CallStart,
    CallEnd,
    Message {
        message: CallMessage,
    },
    SpeechStart,
    SpeechEnd,
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// Selects which conversational agent definition the gateway runs.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum AssistantSelector {
    /// A preconfigured assistant id.
    Id(String),
    /// An inline assistant definition.
    Inline(AssistantDefinition),
}

/// Per-call overrides applied on top of an assistant definition.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssistantOverrides {
    pub variable_values: HashMap<String, String>,
}

/// Everything the gateway needs to begin a call session.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub assistant: AssistantSelector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<AssistantOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_values: Option<HashMap<String, String>>,
}

/// Errors raised by the gateway client itself.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("gateway web token is not configured")]
    MissingToken,
    #[error("a call is already in progress")]
    CallInProgress,
    #[error("no active call")]
    NotConnected,
    #[error("websocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("failed to encode client frame: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The vendor call client as consumed by the session controller.
///
/// Event delivery uses per-subscriber broadcast receivers: dropping a
/// receiver disposes exactly that registration, so one subscriber can
/// never clobber listeners owned by unrelated code.
#[async_trait]
pub trait VoiceClient: Send + Sync {
    /// Requests that the gateway start a call session.
    async fn start(&self, request: StartRequest) -> Result<(), ClientError>;
    /// Requests that the gateway stop the active call. A no-op when no
    /// call is active.
    async fn stop(&self) -> Result<(), ClientError>;
    /// Registers a new event subscription.
    fn subscribe(&self) -> broadcast::Receiver<CallEvent>;
}

static SHARED: OnceLock<Arc<GatewayClient>> = OnceLock::new();

/// Returns the process-wide gateway client, constructing it on first
/// access from the environment-provided token.
///
/// Safe to call any number of times; every call returns the same
/// instance. A missing token logs a warning instead of failing here —
/// starting a call without one is what errors.
pub fn shared() -> Arc<GatewayClient> {
    SHARED
        .get_or_init(|| {
            let token = std::env::var(WEB_TOKEN_VAR).ok();
            if token.is_none() {
                warn!("{WEB_TOKEN_VAR} is not set; calls will fail until it is provided");
            }
            let url = std::env::var(GATEWAY_URL_VAR)
                .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string());
            Arc::new(GatewayClient::new(token, url))
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_start_frame_decodes() {
        let event: CallEvent = serde_json::from_str(r#"{"type":"call-start"}"#).unwrap();
        assert_eq!(event, CallEvent::CallStart);
    }

    #[test]
    fn test_final_transcript_frame_decodes() {
        let frame = r#"{
            "type": "message",
            "message": {
                "type": "transcript",
                "transcriptType": "final",
                "role": "assistant",
                "transcript": "Tell me about a project you are proud of."
            }
        }"#;
        let event: CallEvent = serde_json::from_str(frame).unwrap();
        assert_eq!(
            event,
            CallEvent::Message {
                message: CallMessage::Transcript {
                    transcript_type: TranscriptType::Final,
                    role: MessageRole::Assistant,
                    transcript: "Tell me about a project you are proud of.".to_string(),
                }
            }
        );
    }

    #[test]
    fn test_non_transcript_message_decodes_to_other() {
        let frame = r#"{"type":"message","message":{"type":"function-call"}}"#;
        let event: CallEvent = serde_json::from_str(frame).unwrap();
        assert_eq!(
            event,
            CallEvent::Message {
                message: CallMessage::Other
            }
        );
    }

    #[test]
    fn test_speech_frames_decode() {
        let start: CallEvent = serde_json::from_str(r#"{"type":"speech-start"}"#).unwrap();
        let end: CallEvent = serde_json::from_str(r#"{"type":"speech-end"}"#).unwrap();
        assert_eq!(start, CallEvent::SpeechStart);
        assert_eq!(end, CallEvent::SpeechEnd);
    }

    #[test]
    fn test_error_frame_message_is_optional() {
        let with: CallEvent =
            serde_json::from_str(r#"{"type":"error","message":"meeting ended"}"#).unwrap();
        let without: CallEvent = serde_json::from_str(r#"{"type":"error"}"#).unwrap();
        assert_eq!(
            with,
            CallEvent::Error {
                message: Some("meeting ended".to_string())
            }
        );
        assert_eq!(without, CallEvent::Error { message: None });
    }

    #[test]
    fn test_start_request_serializes_camel_case() {
        let mut variables = HashMap::new();
        variables.insert("username".to_string(), "Ada".to_string());
        let request = StartRequest {
            assistant: AssistantSelector::Id("asst_1".to_string()),
            overrides: None,
            metadata: None,
            workflow_id: Some("wf_1".to_string()),
            variable_values: Some(variables),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["assistant"], "asst_1");
        assert_eq!(json["workflowId"], "wf_1");
        assert_eq!(json["variableValues"]["username"], "Ada");
        assert!(json.get("overrides").is_none());
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_inline_assistant_serializes_untagged() {
        let request = StartRequest {
            assistant: AssistantSelector::Inline(AssistantDefinition::interviewer()),
            overrides: Some(AssistantOverrides::default()),
            metadata: None,
            workflow_id: None,
            variable_values: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["assistant"]["name"], "Interviewer");
        assert!(json.get("workflowId").is_none());
    }

    #[test]
    fn test_shared_client_is_a_singleton() {
        let first = shared();
        let second = shared();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
