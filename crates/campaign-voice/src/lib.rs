//! Voice-call orchestration for the campaign control client.
//!
//! The client embeds a third-party voice-assistant SDK to run live demo
//! calls. This crate owns everything around that SDK that has real state:
//!
//! - [`ScriptLoader`] fetches the SDK bundle from a primary source with a
//!   single fallback, polls for the SDK handle, and gives up after a
//!   deadline. Retrying is an explicit operation.
//! - [`CallSession`] is the call lifecycle state machine
//!   (`Idle → Starting → Active → Ending → Ended → Idle`).
//! - [`Transcript`] and [`EventLog`] aggregate what the SDK reports.
//! - [`CallRecordPersister`] fetches the vendor's call record after a call
//!   and forwards it to the internal log store.
//! - [`SdkUiBridge`] relocates the control the SDK injects into the page.
//! - [`VoiceConsole`] wires these together around a single ordered inbox of
//!   [`SdkEvent`]s.
//!
//! The SDK, the document, and the injected control are reached only through
//! the capability traits in [`sdk`] and [`bridge`], so every component can be
//! driven by fakes.

pub mod bridge;
pub mod config;
pub mod console;
pub mod error;
pub mod event_log;
pub mod loader;
pub mod persist;
pub mod sdk;
pub mod session;
pub mod task;
pub mod transcript;

pub use bridge::{ElementHandle, InjectedControlDom, SdkUiBridge, INJECTED_CONTROL_SELECTORS};
pub use config::VapiConfig;
pub use console::VoiceConsole;
pub use error::{PersistError, VoiceError};
pub use event_log::EventLog;
pub use loader::{LoaderTiming, ScriptLoader, SdkSources};
pub use persist::{CallRecordPersister, Persister};
pub use sdk::{
    ButtonConfig, RunConfig, ScriptHost, ScriptTag, SdkEvent, SdkInbox, SdkMessage, SdkSession,
    VoiceSdk,
};
pub use session::{CallSession, CallTransition};
pub use task::ScheduledTask;
pub use transcript::Transcript;
