//! Tracing subscriber setup.

use crate::config::LoggingConfig;
use crate::error::ControlError;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// An unparseable level falls back to `info`. Fails if a global subscriber
/// is already installed.
pub fn init_tracing(logging: &LoggingConfig) -> Result<(), ControlError> {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    installed.map_err(|e| ControlError::Tracing(e.to_string()))
}
