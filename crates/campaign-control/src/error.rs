//! Error types for the control client.

use crate::config::ConfigError;
use campaign_voice::VoiceError;
use thiserror::Error;

/// Shown when a backend rejects a request without a `detail` field.
pub const UNKNOWN_DETAIL: &str = "Unknown error";

#[derive(Error, Debug)]
pub enum ControlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialize tracing: {0}")]
    Tracing(String),

    #[error("Please enter a phone number")]
    EmptyPhoneNumber,

    #[error("Please enter both product name and URL")]
    MissingProductDetails,

    /// The backend answered with a non-2xx status.
    #[error("Failed: {detail}")]
    Rejected { status: u16, detail: String },

    /// The request never got an answer.
    #[error("Error: {0}")]
    Unreachable(reqwest::Error),

    /// The backend answered 2xx with a body we could not read.
    #[error("Error: {0}")]
    Decode(reqwest::Error),

    #[error(transparent)]
    Voice(#[from] VoiceError),
}

impl ControlError {
    /// Builds a `Rejected` from a backend error body of the form
    /// `{"detail": "..."}`.
    pub(crate) fn rejected(status: u16, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            detail: Option<serde_json::Value>,
        }

        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .map(|d| match d {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| UNKNOWN_DETAIL.to_string());

        Self::Rejected { status, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_uses_the_detail_field() {
        let err = ControlError::rejected(422, r#"{"detail":"Invalid phone number"}"#);
        assert_eq!(err.to_string(), "Failed: Invalid phone number");
    }

    #[test]
    fn rejected_without_detail_is_unknown() {
        assert_eq!(
            ControlError::rejected(500, "Internal Server Error").to_string(),
            "Failed: Unknown error"
        );
        assert_eq!(
            ControlError::rejected(500, r#"{"error":"boom"}"#).to_string(),
            "Failed: Unknown error"
        );
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let err = ControlError::rejected(422, r#"{"detail":[{"msg":"field required"}]}"#);
        assert_eq!(err.to_string(), r#"Failed: [{"msg":"field required"}]"#);
    }
}
