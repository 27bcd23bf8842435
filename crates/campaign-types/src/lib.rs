//! Shared types for the campaign control client.
//!
//! This crate holds the data model shared between the voice orchestration
//! crate and the host-side control crate: SDK load states, call states,
//! transcript entries, diagnostic event records, and the call-log submission
//! forwarded to the log store.
//!
//! Nothing here performs I/O. Every type is serde-serializable so the host
//! can hand state to a presentation layer verbatim.

use serde::{Deserialize, Serialize};

mod call_log;
mod transcript;

pub use call_log::{CallLogSubmission, EventRecord};
pub use transcript::{Speaker, TranscriptEntry};

/// Why the voice SDK failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailure {
    /// Neither the primary nor the fallback source could be fetched.
    BothSourcesFailed,
    /// The SDK handle never appeared before the load deadline.
    Timeout,
}

impl LoadFailure {
    /// Returns the user-facing reason string.
    pub fn reason(self) -> &'static str {
        match self {
            Self::BothSourcesFailed => "both CDNs failed",
            Self::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Load state of the external voice SDK bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SdkLoadState {
    /// Nothing has been injected yet (or a retry reset the loader).
    #[default]
    Unloaded,
    /// A script source is being fetched or the handle is being polled for.
    Loading,
    /// The SDK handle is present and usable.
    Ready,
    /// Loading gave up. Only an explicit retry leaves this state.
    Failed(LoadFailure),
}

impl SdkLoadState {
    /// Returns `true` for `Ready` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }

    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }

    /// Returns the failure, if any.
    pub fn failure(self) -> Option<LoadFailure> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Lifecycle state of a live call session.
///
/// Exactly one session is live at a time. `Ended` is transient: the session
/// returns to `Idle` right after the call record has been handed off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    #[default]
    Idle,
    Starting,
    Active,
    Ending,
    Ended,
}

impl CallState {
    /// Returns the canonical label for this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Active => "active",
            Self::Ending => "ending",
            Self::Ended => "ended",
        }
    }

    /// Returns `true` while a call occupies the single live-call slot.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Starting | Self::Active | Self::Ending)
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
