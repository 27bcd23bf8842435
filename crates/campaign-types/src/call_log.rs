//! Diagnostic event records and the call-log submission body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw lifecycle or message event as seen from the SDK.
///
/// Kept for display only, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    /// `call-start`, `call-end`, `error`, or the message type.
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl EventRecord {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: kind.into(),
            call_id: None,
            role: None,
        }
    }

    pub fn with_call_id(mut self, call_id: Option<String>) -> Self {
        self.call_id = call_id;
        self
    }

    pub fn with_role(mut self, role: Option<String>) -> Self {
        self.role = role;
        self
    }
}

/// Body of the write to the internal log store.
///
/// Serialized as `{ "callId", "logs", "timestamp" }`. Written once per call;
/// the log store owns it after a successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLogSubmission {
    pub call_id: String,
    /// The vendor's call detail record, forwarded verbatim.
    pub logs: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl CallLogSubmission {
    pub fn new(call_id: impl Into<String>, logs: serde_json::Value) -> Self {
        Self {
            call_id: call_id.into(),
            logs,
            timestamp: Utc::now(),
        }
    }
}
