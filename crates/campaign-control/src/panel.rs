//! The unified dialer button.
//!
//! One host button serves both the in-page demo call and outbound phone
//! calls. Which of the two it does depends on whether a number has been
//! typed, whether a demo call is live, and how the SDK load went.

use crate::config::Config;
use crate::dialer::{DialerClient, DIALING_MESSAGE};
use crate::error::ControlError;
use crate::pitch::PitchClient;
use campaign_types::CallState;
use campaign_voice::VoiceConsole;
use tracing::{debug, info};

/// What pressing the button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialerAction {
    EndDemoCall,
    RetrySdk,
    StartDemoCall,
    CallNumber,
}

/// The inputs the button is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelView {
    pub call_active: bool,
    /// A demo call was requested but has not connected yet.
    pub call_pending: bool,
    pub dialing: bool,
    pub has_number: bool,
    /// The SDK's injected control is mounted in the host container.
    pub control_visible: bool,
    pub sdk_error: bool,
    pub sdk_ready: bool,
}

impl PanelView {
    /// `None` while a demo call is connecting or a dial request is in flight.
    pub fn action(&self) -> Option<DialerAction> {
        if self.call_active {
            Some(DialerAction::EndDemoCall)
        } else if self.call_pending || self.dialing {
            None
        } else if self.has_number {
            Some(DialerAction::CallNumber)
        } else if self.sdk_error {
            Some(DialerAction::RetrySdk)
        } else {
            Some(DialerAction::StartDemoCall)
        }
    }

    pub fn label(&self) -> &'static str {
        if self.call_active {
            "End Demo Call"
        } else if self.dialing {
            "Calling..."
        } else if self.call_pending {
            "Start Demo Call"
        } else if self.has_number {
            "Call Now"
        } else if self.control_visible {
            "Start Demo Call"
        } else if self.sdk_error {
            "Retry Demo (SDK Error)"
        } else if !self.sdk_ready {
            "Loading SDK..."
        } else {
            "Start Demo Call"
        }
    }

    /// The host button steps aside for the SDK's own control when no number
    /// is typed, and is disabled while a call connects or dials.
    pub fn host_button_interactive(&self) -> bool {
        !self.dialing && !self.call_pending && !(self.control_visible && !self.has_number)
    }
}

pub struct ControlPanel {
    console: VoiceConsole,
    dialer: DialerClient,
    pitch: PitchClient,
    phone_number: String,
    dialing: bool,
    status: Option<String>,
}

impl ControlPanel {
    pub fn new(console: VoiceConsole, dialer: DialerClient, pitch: PitchClient) -> Self {
        Self {
            console,
            dialer,
            pitch,
            phone_number: String::new(),
            dialing: false,
            status: None,
        }
    }

    pub fn from_config(config: &Config, console: VoiceConsole) -> Self {
        Self::new(
            console,
            DialerClient::new(&config.services.dialer_url),
            PitchClient::new(&config.services.pitch_url),
        )
    }

    pub fn console(&self) -> &VoiceConsole {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut VoiceConsole {
        &mut self.console
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn set_phone_number(&mut self, number: impl Into<String>) {
        self.phone_number = number.into();
    }

    /// The last dial status line, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn view(&self) -> PanelView {
        let state = self.console.state();
        PanelView {
            call_active: state == CallState::Active,
            call_pending: state.is_busy() && state != CallState::Active,
            dialing: self.dialing,
            has_number: !self.phone_number.trim().is_empty(),
            control_visible: self.console.control_visible(),
            sdk_error: self.console.has_error(),
            sdk_ready: self.console.sdk_state().is_ready(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.view().label()
    }

    /// Performs whatever the button currently stands for. Returns the action
    /// taken, or `None` when the press was a no-op.
    pub async fn press(&mut self) -> Result<Option<DialerAction>, ControlError> {
        let view = self.view();
        let Some(action) = view.action() else {
            debug!(state = %self.console.state(), dialing = self.dialing, "button press ignored");
            return Ok(None);
        };

        match action {
            DialerAction::EndDemoCall => {
                if !self.console.stop_call() {
                    return Ok(None);
                }
            }
            DialerAction::RetrySdk => {
                info!("retrying voice sdk from the dialer button");
                self.console.retry_sdk().await;
            }
            DialerAction::StartDemoCall => {
                if !view.sdk_ready {
                    debug!(sdk_state = ?self.console.sdk_state(), "sdk still loading");
                    return Ok(None);
                }
                self.console.start_call()?;
            }
            DialerAction::CallNumber => self.dial().await?,
        }
        Ok(Some(action))
    }

    async fn dial(&mut self) -> Result<(), ControlError> {
        self.dialing = true;
        self.status = Some(DIALING_MESSAGE.to_string());

        let result = self.dialer.start_call(&self.phone_number).await;
        self.dialing = false;
        match result {
            Ok(outcome) => {
                self.status = Some(outcome.message());
                Ok(())
            }
            Err(err) => {
                self.status = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Asks the prompt backend for a sales-pitch system prompt.
    pub async fn generate_pitch(
        &self,
        product_name: &str,
        product_url: &str,
    ) -> Result<String, ControlError> {
        self.pitch.generate_prompt(product_name, product_url).await
    }
}

impl std::fmt::Debug for ControlPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPanel")
            .field("console", &self.console)
            .field("phone_number", &self.phone_number)
            .field("dialing", &self.dialing)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
