//! Client configuration loading from file and environment variables.

use campaign_voice::VapiConfig;
use serde::Deserialize;
use thiserror::Error;

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Voice SDK credentials and endpoints.
    #[serde(default)]
    pub vapi: VapiConfig,

    /// Dialer and pitch backends.
    #[serde(default)]
    pub services: ServicesConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Base URLs of the calling and prompt-generation backends.
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    /// Places outbound phone calls (`POST /start-call`).
    #[serde(default = "default_dialer_url")]
    pub dialer_url: String,

    /// Generates sales-pitch system prompts (`POST /generate-prompt`).
    #[serde(default = "default_pitch_url")]
    pub pitch_url: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "campaign_voice=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_dialer_url() -> String {
    "http://localhost:8002".to_string()
}

fn default_pitch_url() -> String {
    "http://localhost:8003".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            dialer_url: default_dialer_url(),
            pitch_url: default_pitch_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `VAPI_API_KEY` overrides `vapi.api_key`
/// - `VAPI_ASSISTANT_ID` overrides `vapi.assistant_id`
/// - `CAMPAIGN_LOG_STORE_URL` overrides `vapi.log_store_url`
/// - `CAMPAIGN_DIALER_URL` overrides `services.dialer_url`
/// - `CAMPAIGN_PITCH_URL` overrides `services.pitch_url`
/// - `CAMPAIGN_LOG_LEVEL` overrides `logging.level`
/// - `CAMPAIGN_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// Blank credentials are not a load error. They are reported by
/// [`VapiConfig::missing_credentials`] and block demo calls only.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// [`load_config`] with an explicit environment lookup.
pub fn load_config_with<F>(path: Option<&str>, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, env);
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut Config, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = env("VAPI_API_KEY") {
        config.vapi.api_key = key;
    }
    if let Some(id) = env("VAPI_ASSISTANT_ID") {
        config.vapi.assistant_id = id;
    }
    if let Some(url) = env("CAMPAIGN_LOG_STORE_URL") {
        config.vapi.log_store_url = url;
    }
    if let Some(url) = env("CAMPAIGN_DIALER_URL") {
        config.services.dialer_url = url;
    }
    if let Some(url) = env("CAMPAIGN_PITCH_URL") {
        config.services.pitch_url = url;
    }
    if let Some(level) = env("CAMPAIGN_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = env("CAMPAIGN_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}
