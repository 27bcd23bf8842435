//! The voice console: one live call, driven by an ordered event inbox.
//!
//! SDK callbacks push [`SdkEvent`]s into a single unbounded inbox. The
//! console consumes them strictly in delivery order through
//! [`VoiceConsole::dispatch`], which is the only place call state, the
//! transcript, and the event log change. Persistence of a finished call runs
//! as a spawned task and reports back through a second channel, so a slow or
//! failing log store never holds up the state machine.

use crate::bridge::SdkUiBridge;
use crate::config::VapiConfig;
use crate::error::{PersistError, VoiceError};
use crate::event_log::EventLog;
use crate::loader::ScriptLoader;
use crate::persist::Persister;
use crate::sdk::{ScriptHost, SdkEvent, SdkInbox, SdkMessage, SdkSession};
use crate::session::{CallSession, CallTransition};
use crate::transcript::Transcript;
use campaign_types::{CallLogSubmission, CallState, EventRecord, SdkLoadState, Speaker};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, warn};

pub const CALL_STARTED_MARKER: &str = "Call started...";
pub const CALL_ENDED_MARKER: &str = "Call ended";
pub const LOGS_SAVED_MARKER: &str = "Call logs saved to server";

/// Shown when the SDK reports an error without a message.
const RUNTIME_ERROR_FALLBACK: &str = "Voice runtime error occurred.";

#[derive(Debug)]
struct PersistReport {
    call_id: String,
    outcome: Result<CallLogSubmission, PersistError>,
}

pub struct VoiceConsole {
    config: VapiConfig,
    loader: ScriptLoader,
    persister: Arc<dyn Persister>,
    bridge: Option<SdkUiBridge>,
    session: CallSession,
    transcript: Transcript,
    events: EventLog,
    active_sdk: Option<Box<dyn SdkSession>>,
    inbox_tx: SdkInbox,
    inbox_rx: mpsc::UnboundedReceiver<SdkEvent>,
    reports_tx: mpsc::UnboundedSender<PersistReport>,
    reports_rx: mpsc::UnboundedReceiver<PersistReport>,
    persisting: usize,
    config_error: Option<VoiceError>,
    last_error: Option<String>,
}

impl VoiceConsole {
    /// Creates a console. Credentials are checked here, before any SDK load
    /// is attempted; a missing credential is reported once and blocks
    /// [`VoiceConsole::start_call`] but not SDK loading.
    pub fn new(config: VapiConfig, loader: ScriptLoader, persister: Arc<dyn Persister>) -> Self {
        let missing = config.missing_credentials();
        let config_error = if missing.is_empty() {
            None
        } else {
            let err = VoiceError::MissingCredentials(missing);
            error!(error = %err, "demo calls are disabled until credentials are configured");
            Some(err)
        };

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();

        Self {
            events: EventLog::with_capacity(config.event_log_capacity),
            config,
            loader,
            persister,
            bridge: None,
            session: CallSession::new(),
            transcript: Transcript::new(),
            active_sdk: None,
            inbox_tx,
            inbox_rx,
            reports_tx,
            reports_rx,
            persisting: 0,
            config_error,
            last_error: None,
        }
    }

    /// Builds the loader from the configured sources and timing.
    pub fn from_host(
        config: VapiConfig,
        host: Arc<dyn ScriptHost>,
        persister: Arc<dyn Persister>,
    ) -> Self {
        let loader = ScriptLoader::new(host, config.sources(), config.loader_timing());
        Self::new(config, loader, persister)
    }

    /// Attaches the injected-control bridge and starts probing.
    pub fn with_bridge(mut self, mut bridge: SdkUiBridge) -> Self {
        bridge.start();
        self.bridge = Some(bridge);
        self
    }

    pub fn state(&self) -> CallState {
        self.session.state()
    }

    pub fn call_id(&self) -> Option<&str> {
        self.session.id()
    }

    pub fn sdk_state(&self) -> SdkLoadState {
        self.loader.state()
    }

    pub fn loader(&self) -> &ScriptLoader {
        &self.loader
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn config_error(&self) -> Option<&VoiceError> {
        self.config_error.as_ref()
    }

    /// The most recent user-visible error message, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns `true` when the host should offer a retry instead of a start.
    pub fn has_error(&self) -> bool {
        self.config_error.is_some() || self.last_error.is_some()
    }

    /// Number of call records still being fetched or forwarded.
    pub fn persisting(&self) -> usize {
        self.persisting
    }

    pub fn subscribe_transitions(&self) -> broadcast::Receiver<CallTransition> {
        self.session.subscribe()
    }

    /// A sender into the event inbox, for hosts that relay SDK callbacks
    /// themselves.
    pub fn inbox(&self) -> SdkInbox {
        self.inbox_tx.clone()
    }

    pub fn control_visible(&self) -> bool {
        self.bridge.as_ref().is_some_and(SdkUiBridge::is_visible)
    }

    pub fn control_visibility(&self) -> Option<watch::Receiver<bool>> {
        self.bridge.as_ref().map(SdkUiBridge::visibility)
    }

    /// Loads the SDK, or waits for the load already in progress.
    pub async fn prepare_sdk(&mut self) -> SdkLoadState {
        let state = self.loader.load().await;
        self.note_load_outcome(state);
        state
    }

    /// Clears the last error and reloads the SDK from scratch.
    pub async fn retry_sdk(&mut self) -> SdkLoadState {
        self.last_error = None;
        let state = self.loader.retry().await;
        self.note_load_outcome(state);
        state
    }

    fn note_load_outcome(&mut self, state: SdkLoadState) {
        match state {
            SdkLoadState::Failed(reason) => {
                self.last_error = Some(format!("Failed to load voice SDK: {reason}"));
            }
            SdkLoadState::Ready => self.last_error = None,
            SdkLoadState::Unloaded | SdkLoadState::Loading => {}
        }
    }

    /// Requests a new call. Rejected while credentials are missing, while
    /// the SDK is not ready, or while another call holds the live slot.
    pub fn start_call(&mut self) -> Result<(), VoiceError> {
        if let Some(err) = &self.config_error {
            return Err(err.clone());
        }

        let sdk_state = self.loader.state();
        if !sdk_state.is_ready() {
            return Err(VoiceError::SdkNotReady(sdk_state));
        }

        self.session.begin().inspect_err(|err| {
            debug!(error = %err, "start request rejected");
        })?;

        let Some(sdk) = self.loader.sdk() else {
            self.session.abort();
            return Err(self.surface(VoiceError::SdkUnavailable));
        };

        info!(assistant = %self.config.assistant_id, "starting demo call");
        match sdk.run(&self.config.run_config(), self.inbox_tx.clone()) {
            Ok(handle) => {
                self.active_sdk = Some(handle);
                Ok(())
            }
            Err(message) => {
                self.session.abort();
                Err(self.surface(VoiceError::Runtime(message)))
            }
        }
    }

    /// Hangs up. Only honored while the call is active.
    pub fn stop_call(&mut self) -> bool {
        if self.session.state() != CallState::Active {
            debug!(state = %self.session.state(), "stop ignored outside of an active call");
            return false;
        }
        info!(call_id = ?self.session.id(), "stopping demo call");
        if let Some(handle) = self.active_sdk.as_ref() {
            handle.stop();
        }
        self.finish_call();
        true
    }

    /// Empties the transcript without touching the call.
    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    /// Applies one SDK event.
    pub fn dispatch(&mut self, event: SdkEvent) {
        let record = match &event {
            SdkEvent::CallStarted { call_id } => {
                EventRecord::new(event.kind()).with_call_id(call_id.clone())
            }
            SdkEvent::CallEnded => {
                EventRecord::new(event.kind()).with_call_id(self.session.id().map(str::to_owned))
            }
            SdkEvent::Message(message) => {
                EventRecord::new(event.kind()).with_role(message.role.clone())
            }
            SdkEvent::Error { .. } => EventRecord::new(event.kind()),
        };
        self.events.record(record);

        match event {
            SdkEvent::CallStarted { call_id } => self.on_call_started(call_id),
            SdkEvent::CallEnded => self.on_call_ended(),
            SdkEvent::Message(message) => self.on_message(message),
            SdkEvent::Error { message } => self.on_error(message),
        }
    }

    /// Handles everything already queued, SDK events first. Returns how many
    /// items were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            if let Ok(event) = self.inbox_rx.try_recv() {
                self.dispatch(event);
            } else if let Ok(report) = self.reports_rx.try_recv() {
                self.apply_report(report);
            } else {
                return handled;
            }
            handled += 1;
        }
    }

    /// Waits for the next SDK event or persistence report and handles it.
    pub async fn step(&mut self) {
        tokio::select! {
            biased;
            Some(event) = self.inbox_rx.recv() => self.dispatch(event),
            Some(report) = self.reports_rx.recv() => self.apply_report(report),
            else => {}
        }
    }

    /// Waits until every spawned persistence task has reported.
    pub async fn settle_persistence(&mut self) {
        while self.persisting > 0 {
            match self.reports_rx.recv().await {
                Some(report) => self.apply_report(report),
                None => break,
            }
        }
    }

    fn on_call_started(&mut self, call_id: Option<String>) {
        if !self.session.activate(call_id.clone()) {
            warn!(state = %self.session.state(), ?call_id, "ignoring call-start outside of a pending call");
            return;
        }
        info!(?call_id, "demo call started");
        self.transcript.clear();
        self.transcript.append(Speaker::System, CALL_STARTED_MARKER);
    }

    fn on_call_ended(&mut self) {
        if self.session.state() != CallState::Active {
            debug!(state = %self.session.state(), "ignoring call-end without an active call");
            return;
        }
        info!(call_id = ?self.session.id(), "demo call ended");
        self.finish_call();
    }

    fn on_message(&mut self, message: SdkMessage) {
        if message.is_transcript() {
            // A stopped session may still flush speech after "Call ended".
            if !matches!(self.session.state(), CallState::Starting | CallState::Active) {
                debug!(state = %self.session.state(), "ignoring transcript outside of a live call");
                return;
            }
            if let Some(text) = message.transcript.as_deref() {
                let speaker = Speaker::from_role(message.role.as_deref());
                self.transcript.append(speaker, text);
            }
        } else if message.is_function_call() {
            info!(function_call = ?message.function_call, "assistant function call");
        } else {
            debug!(kind = %message.kind, "sdk message");
        }
    }

    fn on_error(&mut self, message: Option<String>) {
        let text = message.unwrap_or_else(|| RUNTIME_ERROR_FALLBACK.to_string());
        error!(error = %text, call_id = ?self.session.id(), "voice sdk reported an error");

        self.transcript.append(Speaker::System, format!("Error: {text}"));
        self.last_error = Some(text);
        if let Some(handle) = self.active_sdk.take() {
            handle.stop();
        }
        self.session.abort();
    }

    /// Active → Ending → Ended → Idle. The call record is handed to the
    /// persister while Ending; the state machine does not wait for it.
    fn finish_call(&mut self) {
        self.session.end();
        self.transcript.append(Speaker::System, CALL_ENDED_MARKER);

        match self.session.id().map(str::to_owned) {
            Some(call_id) => self.spawn_persist(call_id),
            None => warn!("call ended without a vendor call id, skipping call record"),
        }

        self.session.finish();
        self.session.reset();
        self.active_sdk = None;
        if let Some(bridge) = self.bridge.as_mut() {
            bridge.recheck();
        }
    }

    fn spawn_persist(&mut self, call_id: String) {
        let persister = Arc::clone(&self.persister);
        let reports = self.reports_tx.clone();
        self.persisting += 1;

        tokio::spawn(async move {
            let id = call_id.clone();
            let outcome = match tokio::spawn(async move { persister.persist(&id).await }).await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(PersistError::Task(join_error.to_string())),
            };
            // The console may be gone by now; the remote write stands either way.
            let _ = reports.send(PersistReport { call_id, outcome });
        });
    }

    fn apply_report(&mut self, report: PersistReport) {
        self.persisting = self.persisting.saturating_sub(1);
        match report.outcome {
            Ok(_) => {
                self.transcript.append(Speaker::System, LOGS_SAVED_MARKER);
            }
            Err(err) => {
                warn!(call_id = %report.call_id, error = %err, "call record not saved");
                if let Some(warning) = err.transcript_warning() {
                    self.transcript.append(Speaker::System, warning);
                }
            }
        }
    }

    fn surface(&mut self, err: VoiceError) -> VoiceError {
        warn!(error = %err, "demo call failed to start");
        self.last_error = Some(err.to_string());
        err
    }
}

impl std::fmt::Debug for VoiceConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceConsole")
            .field("state", &self.session.state())
            .field("call_id", &self.session.id())
            .field("sdk_state", &self.loader.state())
            .field("transcript_len", &self.transcript.len())
            .field("persisting", &self.persisting)
            .finish_non_exhaustive()
    }
}
