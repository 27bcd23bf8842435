use campaign_types::{CallState, SdkLoadState};
use thiserror::Error;

/// User-visible failures of the voice subsystem.
///
/// None of these are fatal to the host; each one ends up as an error flag or
/// message the presentation layer can show.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoiceError {
    #[error("missing voice credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("voice SDK is not ready (state: {0:?})")]
    SdkNotReady(SdkLoadState),

    #[error("voice SDK handle not found")]
    SdkUnavailable,

    #[error("a call is already {0}")]
    CallInProgress(CallState),

    #[error("voice runtime error: {0}")]
    Runtime(String),
}

/// Failures while fetching or forwarding a call record.
///
/// These never reach the call state machine; the console converts them into
/// transcript warnings or log lines.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("call record request failed: {0}")]
    VendorUnreachable(#[source] reqwest::Error),

    #[error("vendor returned {status} for call record: {body}")]
    VendorRejected { status: u16, body: String },

    #[error("call record is not valid JSON: {0}")]
    VendorDecode(#[source] reqwest::Error),

    #[error("log store returned {0}")]
    StoreRejected(u16),

    #[error("log store unreachable: {0}")]
    StoreUnreachable(#[source] reqwest::Error),

    #[error("persistence task failed: {0}")]
    Task(String),
}

impl PersistError {
    /// Returns the warning to append to the transcript, if this failure is
    /// one the user should see. Vendor-side failures are only logged since
    /// nothing was submitted.
    pub fn transcript_warning(&self) -> Option<&'static str> {
        match self {
            Self::StoreRejected(_) => Some("Warning: Failed to save logs to server"),
            Self::StoreUnreachable(_) => Some("Warning: Could not connect to log server"),
            Self::VendorUnreachable(_)
            | Self::VendorRejected { .. }
            | Self::VendorDecode(_)
            | Self::Task(_) => None,
        }
    }
}
