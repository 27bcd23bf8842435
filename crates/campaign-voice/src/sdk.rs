//! Capabilities through which the console reaches the vendor SDK.
//!
//! The SDK lives outside the process's control: it is fetched as a script,
//! attaches a global handle whenever it likes, and pushes events through
//! callbacks. Each of those touch points is a trait here so the rest of the
//! crate can be driven by fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Message type carrying a transcript fragment.
pub const MESSAGE_TRANSCRIPT: &str = "transcript";

/// Message type carrying an assistant function call.
pub const MESSAGE_FUNCTION_CALL: &str = "function-call";

/// The single ordered inbox SDK callbacks push into.
pub type SdkInbox = mpsc::UnboundedSender<SdkEvent>;

/// A script element injected into the host document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptTag {
    id: Uuid,
    src: String,
}

impl ScriptTag {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            src: src.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn src(&self) -> &str {
        &self.src
    }
}

/// The document the SDK bundle is loaded into.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// Appends a script element for `src` and returns its handle.
    fn inject(&self, src: &str) -> ScriptTag;

    /// Resolves when the element fires `load` (`Ok`) or `error` (`Err`).
    async fn wait_loaded(&self, tag: &ScriptTag) -> Result<(), String>;

    /// Detaches the element. Removing an already-removed tag is a no-op.
    fn remove(&self, tag: &ScriptTag);

    /// Returns the global SDK handle if it is attached.
    fn sdk(&self) -> Option<Arc<dyn VoiceSdk>>;
}

/// The SDK's `run(config)` entry point.
pub trait VoiceSdk: Send + Sync {
    /// Starts a call. Events for the call must be pushed into `inbox` in the
    /// order the SDK delivers them.
    fn run(&self, config: &RunConfig, inbox: SdkInbox) -> Result<Box<dyn SdkSession>, String>;
}

/// A call started through [`VoiceSdk::run`].
pub trait SdkSession: Send + Sync {
    /// Asks the SDK to hang up.
    fn stop(&self);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonConfig {
    pub off_text: String,
    pub on_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    pub button_config: ButtonConfig,
}

/// Configuration passed to [`VoiceSdk::run`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub api_key: String,
    pub assistant: String,
    pub config: RunOptions,
}

impl RunConfig {
    pub fn new(api_key: &str, assistant: &str, button_config: ButtonConfig) -> Self {
        Self {
            api_key: api_key.to_string(),
            assistant: assistant.to_string(),
            config: RunOptions { button_config },
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("api_key", &"[REDACTED]")
            .field("assistant", &self.assistant)
            .field("config", &self.config)
            .finish()
    }
}

/// A `message` event payload as the SDK delivers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(
        default,
        rename = "functionCall",
        skip_serializing_if = "Option::is_none"
    )]
    pub function_call: Option<serde_json::Value>,
}

impl SdkMessage {
    /// Builds a transcript message.
    pub fn transcript(role: &str, text: &str) -> Self {
        Self {
            kind: MESSAGE_TRANSCRIPT.to_string(),
            role: Some(role.to_string()),
            transcript: Some(text.to_string()),
            function_call: None,
        }
    }

    pub fn is_transcript(&self) -> bool {
        self.kind == MESSAGE_TRANSCRIPT
    }

    pub fn is_function_call(&self) -> bool {
        self.kind == MESSAGE_FUNCTION_CALL
    }
}

/// Everything the SDK can report about a call.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkEvent {
    /// `call-start`. The vendor normally assigns an id, but it may be absent.
    CallStarted { call_id: Option<String> },
    /// `call-end`.
    CallEnded,
    /// `message`.
    Message(SdkMessage),
    /// `error`. Non-string error payloads arrive without a message.
    Error { message: Option<String> },
}

impl SdkEvent {
    pub fn call_started(call_id: &str) -> Self {
        Self::CallStarted {
            call_id: Some(call_id.to_string()),
        }
    }

    pub fn error(message: &str) -> Self {
        Self::Error {
            message: Some(message.to_string()),
        }
    }

    /// Returns the event name used in the diagnostic event log.
    pub fn kind(&self) -> &str {
        match self {
            Self::CallStarted { .. } => "call-start",
            Self::CallEnded => "call-end",
            Self::Message(message) => &message.kind,
            Self::Error { .. } => "error",
        }
    }
}
