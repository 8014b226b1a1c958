//! The append-only message log built from finalized transcript fragments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a transcript fragment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    System,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::System => write!(f, "system"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A finalized transcript fragment committed to the log.
///
/// Immutable once appended; partial (interim) fragments never become
/// `SavedMessage`s.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SavedMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Ordered log of saved messages, in arrival order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct TranscriptLog(Vec<SavedMessage>);

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finalized fragment. Ordering is arrival order.
    pub fn push(&mut self, message: SavedMessage) {
        self.0.push(message);
    }

    /// The most recently appended message, if any.
    pub fn last(&self) -> Option<&SavedMessage> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SavedMessage> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[SavedMessage] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<SavedMessage> {
        self.0
    }
}
