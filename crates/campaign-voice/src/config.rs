use crate::loader::{LoaderTiming, SdkSources};
use crate::sdk::{ButtonConfig, RunConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_PRIMARY_SDK_URL: &str =
    "https://cdn.jsdelivr.net/gh/VapiAI/html-script-tag@latest/dist/assets/index.js";
pub const DEFAULT_FALLBACK_SDK_URL: &str =
    "https://unpkg.com/@vapi-ai/web@latest/dist/index.umd.js";
pub const DEFAULT_VENDOR_API_URL: &str = "https://api.vapi.ai";
pub const DEFAULT_LOG_STORE_URL: &str = "http://localhost:8004";

fn default_primary_sdk_url() -> String {
    DEFAULT_PRIMARY_SDK_URL.to_string()
}

fn default_fallback_sdk_url() -> String {
    DEFAULT_FALLBACK_SDK_URL.to_string()
}

fn default_vendor_api_url() -> String {
    DEFAULT_VENDOR_API_URL.to_string()
}

fn default_log_store_url() -> String {
    DEFAULT_LOG_STORE_URL.to_string()
}

fn default_sdk_poll_interval_ms() -> u64 {
    500
}

fn default_sdk_load_timeout_ms() -> u64 {
    12_000
}

fn default_control_probe_interval_ms() -> u64 {
    100
}

fn default_control_recheck_delay_ms() -> u64 {
    500
}

fn default_event_log_capacity() -> usize {
    25
}

fn default_button_on_text() -> String {
    "Start Call".to_string()
}

fn default_button_off_text() -> String {
    "End Call".to_string()
}

/// Settings for the voice SDK, the vendor API, and the log store.
#[derive(Clone, Serialize, Deserialize)]
pub struct VapiConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default)]
    pub assistant_id: String,
    #[serde(default = "default_primary_sdk_url")]
    pub primary_sdk_url: String,
    #[serde(default = "default_fallback_sdk_url")]
    pub fallback_sdk_url: String,
    /// Base URL of the vendor's call-detail API.
    #[serde(default = "default_vendor_api_url")]
    pub vendor_api_url: String,
    /// Base URL of the internal log-storage service.
    #[serde(default = "default_log_store_url")]
    pub log_store_url: String,
    #[serde(default = "default_sdk_poll_interval_ms")]
    pub sdk_poll_interval_ms: u64,
    /// Deadline for the SDK handle to appear, counted from the first load.
    #[serde(default = "default_sdk_load_timeout_ms")]
    pub sdk_load_timeout_ms: u64,
    #[serde(default = "default_control_probe_interval_ms")]
    pub control_probe_interval_ms: u64,
    #[serde(default = "default_control_recheck_delay_ms")]
    pub control_recheck_delay_ms: u64,
    /// How many raw SDK events are kept for display.
    #[serde(default = "default_event_log_capacity")]
    pub event_log_capacity: usize,
    #[serde(default = "default_button_on_text")]
    pub button_on_text: String,
    #[serde(default = "default_button_off_text")]
    pub button_off_text: String,
}

impl Default for VapiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            assistant_id: String::new(),
            primary_sdk_url: default_primary_sdk_url(),
            fallback_sdk_url: default_fallback_sdk_url(),
            vendor_api_url: default_vendor_api_url(),
            log_store_url: default_log_store_url(),
            sdk_poll_interval_ms: default_sdk_poll_interval_ms(),
            sdk_load_timeout_ms: default_sdk_load_timeout_ms(),
            control_probe_interval_ms: default_control_probe_interval_ms(),
            control_recheck_delay_ms: default_control_recheck_delay_ms(),
            event_log_capacity: default_event_log_capacity(),
            button_on_text: default_button_on_text(),
            button_off_text: default_button_off_text(),
        }
    }
}

impl fmt::Debug for VapiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapiConfig")
            .field("api_key", &"[REDACTED]")
            .field("assistant_id", &self.assistant_id)
            .field("primary_sdk_url", &self.primary_sdk_url)
            .field("fallback_sdk_url", &self.fallback_sdk_url)
            .field("vendor_api_url", &self.vendor_api_url)
            .field("log_store_url", &self.log_store_url)
            .field("sdk_poll_interval_ms", &self.sdk_poll_interval_ms)
            .field("sdk_load_timeout_ms", &self.sdk_load_timeout_ms)
            .field("event_log_capacity", &self.event_log_capacity)
            .finish_non_exhaustive()
    }
}

impl VapiConfig {
    pub fn new(api_key: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            assistant_id: assistant_id.into(),
            ..Self::default()
        }
    }

    /// Returns the names of the required credentials that are blank.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.trim().is_empty() {
            missing.push("api_key");
        }
        if self.assistant_id.trim().is_empty() {
            missing.push("assistant_id");
        }
        missing
    }

    pub fn sources(&self) -> SdkSources {
        SdkSources {
            primary: self.primary_sdk_url.clone(),
            fallback: self.fallback_sdk_url.clone(),
        }
    }

    pub fn loader_timing(&self) -> LoaderTiming {
        LoaderTiming {
            poll_interval: Duration::from_millis(self.sdk_poll_interval_ms),
            load_timeout: Duration::from_millis(self.sdk_load_timeout_ms),
        }
    }

    pub fn control_probe_interval(&self) -> Duration {
        Duration::from_millis(self.control_probe_interval_ms)
    }

    pub fn control_recheck_delay(&self) -> Duration {
        Duration::from_millis(self.control_recheck_delay_ms)
    }

    /// Builds the configuration handed to the SDK's `run` entry point.
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(
            &self.api_key,
            &self.assistant_id,
            ButtonConfig {
                off_text: self.button_off_text.clone(),
                on_text: self.button_on_text.clone(),
            },
        )
    }
}
