//! Transcript entry types.

use serde::{Deserialize, Serialize};

/// Who produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The human on the call.
    User,
    /// The voice assistant.
    Assistant,
    /// Lifecycle markers written by the client itself.
    System,
}

impl Speaker {
    /// Maps an SDK message role to a speaker. Only `"user"` is the human;
    /// every other role is the assistant.
    pub fn from_role(role: Option<&str>) -> Self {
        match role {
            Some("user") => Self::User,
            _ => Self::Assistant,
        }
    }
}

/// One line of a call transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    /// Monotonically increasing index assigned at append time.
    pub seq: u64,
}

impl std::fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.speaker {
            Speaker::User => write!(f, "You: {}", self.text),
            Speaker::Assistant => write!(f, "Assistant: {}", self.text),
            Speaker::System => f.write_str(&self.text),
        }
    }
}
