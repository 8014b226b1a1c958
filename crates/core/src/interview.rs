//! Interview plans and the inline interviewer persona.

use serde::{Deserialize, Serialize};

/// The purpose of a call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Open-ended practice session that produces a new interview; the
    /// transcript is discarded and the user is sent home afterwards.
    Generate,
    /// Question-driven review session; the transcript feeds the
    /// feedback pipeline when the call ends.
    Review,
}

/// Formats interview questions into the block handed to the assistant:
/// one dash-prefixed question per line, empty string when there are
/// no questions.
pub fn format_questions(questions: &[String]) -> String {
    questions
        .iter()
        .map(|question| format!("- {question}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// An inline assistant definition passed to the gateway when no
/// preconfigured assistant id is used.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssistantDefinition {
    pub name: String,
    pub first_message: String,
    pub instructions: String,
    pub model: String,
    pub voice: String,
}

impl AssistantDefinition {
    /// The stock interviewer persona used by review sessions. The
    /// `{{questions}}` placeholder is filled from the session's
    /// variable bag by the gateway.
    pub fn interviewer() -> Self {
        Self {
            name: "Interviewer".to_string(),
            first_message: "Hello! Thank you for taking the time to speak with me today. \
                            I'm excited to learn more about you and your experience."
                .to_string(),
            instructions: "You are a professional job interviewer conducting a real-time \
                           voice interview with a candidate. Ask the following questions \
                           one at a time, listen actively, and keep your responses short \
                           and conversational:\n{{questions}}"
                .to_string(),
            model: "gpt-4".to_string(),
            voice: "sarah".to_string(),
        }
    }
}
