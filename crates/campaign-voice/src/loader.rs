//! Loading the vendor SDK bundle.
//!
//! A load injects the primary source and, if that errors, the fallback
//! source. Independently of script `load` events, the SDK handle is polled
//! for on a fixed interval because the bundle may attach its handle after
//! `load` fires. Whichever signal sees the handle first wins. A deadline,
//! counted from the start of the load, turns a load that never produced a
//! handle into `Failed(Timeout)`.
//!
//! The poll interval and the deadline belong to the load task; they are
//! released on every exit path, and disposing the loader aborts the task.

use crate::sdk::{ScriptHost, ScriptTag, VoiceSdk};
use crate::task::ScheduledTask;
use campaign_types::{LoadFailure, SdkLoadState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Where to fetch the SDK bundle from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkSources {
    pub primary: String,
    pub fallback: String,
}

/// Poll cadence and deadline for a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderTiming {
    pub poll_interval: Duration,
    pub load_timeout: Duration,
}

impl Default for LoaderTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            load_timeout: Duration::from_secs(12),
        }
    }
}

struct Shared {
    host: Arc<dyn ScriptHost>,
    state: watch::Sender<SdkLoadState>,
    script: Mutex<Option<ScriptTag>>,
    /// Bumped by retry and dispose so a superseded load cannot publish.
    generation: AtomicU64,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn supersede(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn track(&self, tag: ScriptTag) {
        *self.script.lock().unwrap_or_else(|e| e.into_inner()) = Some(tag);
    }

    fn detach_script(&self) {
        let tag = self.script.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(tag) = tag {
            debug!(src = tag.src(), "removing sdk script tag");
            self.host.remove(&tag);
        }
    }

    fn handle_present(&self) -> bool {
        self.host.sdk().is_some()
    }
}

/// Owns the SDK load state and the SDK handle capability.
///
/// Only the loader decides whether the SDK is present; callers receive the
/// handle through [`ScriptLoader::sdk`] once the state is `Ready`.
pub struct ScriptLoader {
    shared: Arc<Shared>,
    sources: SdkSources,
    timing: LoaderTiming,
    task: Mutex<Option<ScheduledTask>>,
}

impl ScriptLoader {
    pub fn new(host: Arc<dyn ScriptHost>, sources: SdkSources, timing: LoaderTiming) -> Self {
        let (state, _) = watch::channel(SdkLoadState::Unloaded);
        Self {
            shared: Arc::new(Shared {
                host,
                state,
                script: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
            sources,
            timing,
            task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SdkLoadState {
        *self.shared.state.borrow()
    }

    /// Watches state changes.
    pub fn subscribe(&self) -> watch::Receiver<SdkLoadState> {
        self.shared.state.subscribe()
    }

    /// Returns the script tag the loader currently owns, if any.
    pub fn script(&self) -> Option<ScriptTag> {
        self.shared
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Hands out the SDK handle. `None` unless the state is `Ready`.
    pub fn sdk(&self) -> Option<Arc<dyn VoiceSdk>> {
        if self.state().is_ready() {
            self.shared.host.sdk()
        } else {
            None
        }
    }

    /// Starts a load if none has happened yet and resolves once the state
    /// leaves `Loading`.
    ///
    /// Calling this while `Loading` or `Ready` starts nothing. A `Failed`
    /// loader stays failed; use [`ScriptLoader::retry`].
    pub async fn load(&self) -> SdkLoadState {
        let mut rx = self.shared.state.subscribe();
        self.begin();
        let settled = match rx.wait_for(|state| *state != SdkLoadState::Loading).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        settled
    }

    /// Discards the previous attempt and loads again from the primary source.
    pub async fn retry(&self) -> SdkLoadState {
        self.shared.supersede();
        self.halt();
        self.shared.detach_script();
        self.shared.state.send_replace(SdkLoadState::Unloaded);
        info!("retrying voice sdk load");
        self.load().await
    }

    /// Cancels any running load, removes the injected script, and returns to
    /// `Unloaded`.
    pub fn dispose(&self) {
        self.shared.supersede();
        self.halt();
        self.shared.detach_script();
        self.shared.state.send_replace(SdkLoadState::Unloaded);
    }

    fn begin(&self) {
        let started = self.shared.state.send_if_modified(|state| {
            if *state == SdkLoadState::Unloaded {
                *state = SdkLoadState::Loading;
                true
            } else {
                false
            }
        });
        if !started {
            return;
        }

        info!(
            primary = %self.sources.primary,
            fallback = %self.sources.fallback,
            timeout_ms = self.timing.load_timeout.as_millis() as u64,
            "loading voice sdk"
        );
        let generation = self.shared.generation.load(Ordering::SeqCst);
        let task = ScheduledTask::spawn(
            "sdk-load",
            drive(
                Arc::clone(&self.shared),
                self.sources.clone(),
                self.timing,
                generation,
            ),
        );
        *self.task.lock().unwrap_or_else(|e| e.into_inner()) = Some(task);
    }

    fn halt(&self) {
        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            task.cancel();
        }
    }
}

impl Drop for ScriptLoader {
    fn drop(&mut self) {
        self.shared.supersede();
        self.halt();
        self.shared.detach_script();
    }
}

impl std::fmt::Debug for ScriptLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptLoader")
            .field("state", &self.state())
            .field("sources", &self.sources)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

async fn drive(shared: Arc<Shared>, sources: SdkSources, timing: LoaderTiming, generation: u64) {
    let outcome = race(&shared, &sources, timing).await;
    if !shared.is_current(generation) {
        debug!(?outcome, "discarding superseded sdk load");
        return;
    }
    match outcome {
        SdkLoadState::Failed(reason) => {
            warn!(%reason, "voice sdk failed to load");
            shared.detach_script();
        }
        _ => info!("voice sdk ready"),
    }
    shared.state.send_if_modified(|state| {
        if shared.is_current(generation) {
            *state = outcome;
            true
        } else {
            false
        }
    });
}

async fn race(shared: &Shared, sources: &SdkSources, timing: LoaderTiming) -> SdkLoadState {
    let deadline = time::sleep(timing.load_timeout);
    tokio::pin!(deadline);

    let mut poll = time::interval(timing.poll_interval.max(MIN_POLL_INTERVAL));
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let scripts = inject_sources(shared, sources);
    tokio::pin!(scripts);
    let mut scripts_settled = false;

    // Biased so the script is always injected before the first poll, and a
    // script load wins a tie with the poll.
    loop {
        tokio::select! {
            biased;
            loaded = &mut scripts, if !scripts_settled => {
                scripts_settled = true;
                match loaded {
                    Some(origin) if shared.handle_present() => {
                        debug!(origin, "sdk handle present on script load");
                        return SdkLoadState::Ready;
                    }
                    Some(origin) => {
                        debug!(origin, "script loaded before sdk handle attached");
                    }
                    None => return SdkLoadState::Failed(LoadFailure::BothSourcesFailed),
                }
            }
            _ = poll.tick() => {
                if shared.handle_present() {
                    debug!("sdk handle detected by poll");
                    return SdkLoadState::Ready;
                }
            }
            () = &mut deadline => {
                return if shared.handle_present() {
                    SdkLoadState::Ready
                } else {
                    SdkLoadState::Failed(LoadFailure::Timeout)
                };
            }
        }
    }
}

/// Injects the primary source, then the fallback if the primary errors.
/// Returns which source loaded, or `None` when both failed. At most one
/// script tag is attached at any time.
async fn inject_sources(shared: &Shared, sources: &SdkSources) -> Option<&'static str> {
    for (origin, src) in [("primary", &sources.primary), ("fallback", &sources.fallback)] {
        let tag = shared.host.inject(src);
        shared.track(tag.clone());

        match shared.host.wait_loaded(&tag).await {
            Ok(()) => {
                info!(origin, src = %src, "voice sdk script loaded");
                return Some(origin);
            }
            Err(error) => {
                warn!(origin, src = %src, %error, "voice sdk script failed to load");
                shared.detach_script();
            }
        }
    }
    None
}
