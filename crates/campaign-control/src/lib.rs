//! Host-side glue for the campaign control client.
//!
//! Loads configuration, initializes tracing, talks to the dialer and pitch
//! backends, and drives the unified dialer button on top of
//! [`campaign_voice::VoiceConsole`].

pub mod config;
pub mod dialer;
pub mod error;
pub mod panel;
pub mod pitch;
pub mod telemetry;

pub use config::{load_config, Config, ConfigError, LoggingConfig, ServicesConfig};
pub use dialer::{normalize_phone_number, DialOutcome, DialerClient};
pub use error::ControlError;
pub use panel::{ControlPanel, DialerAction, PanelView};
pub use pitch::PitchClient;
