//! Adapter for the control element the SDK injects into the page.
//!
//! The SDK renders its own call button outside the host's control. The
//! bridge probes for it, moves it into the host's container once, and keeps
//! a visibility flag the host consults so the host's own button and the
//! SDK's button are never both interactive.

use crate::config::VapiConfig;
use crate::task::ScheduledTask;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// Identifiers the SDK is known to give its injected control.
pub const INJECTED_CONTROL_SELECTORS: &[&str] = &["#vapi-support-btn", ".vapi-btn"];

/// Opaque reference to a document element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub String);

/// The slice of the document the bridge needs.
pub trait InjectedControlDom: Send + Sync {
    /// Returns the first element matching any of `selectors`.
    fn locate(&self, selectors: &[&str]) -> Option<ElementHandle>;

    /// Moves `control` into the host container. Returns `false` when the
    /// container is not mounted yet.
    fn adopt(&self, control: &ElementHandle) -> bool;
}

pub struct SdkUiBridge {
    dom: Arc<dyn InjectedControlDom>,
    probe_interval: Duration,
    recheck_delay: Duration,
    visible: Arc<watch::Sender<bool>>,
    probe: Option<ScheduledTask>,
    recheck: Option<ScheduledTask>,
}

impl SdkUiBridge {
    pub fn new(
        dom: Arc<dyn InjectedControlDom>,
        probe_interval: Duration,
        recheck_delay: Duration,
    ) -> Self {
        let (visible, _) = watch::channel(false);
        Self {
            dom,
            probe_interval: probe_interval.max(Duration::from_millis(1)),
            recheck_delay,
            visible: Arc::new(visible),
            probe: None,
            recheck: None,
        }
    }

    pub fn from_config(dom: Arc<dyn InjectedControlDom>, config: &VapiConfig) -> Self {
        Self::new(
            dom,
            config.control_probe_interval(),
            config.control_recheck_delay(),
        )
    }

    /// Starts probing for the injected control. Probing stops after the
    /// first successful adoption. Calling this again while a probe exists is
    /// a no-op.
    pub fn start(&mut self) {
        if self.probe.is_some() {
            return;
        }
        let dom = Arc::clone(&self.dom);
        let visible = Arc::clone(&self.visible);
        let period = self.probe_interval;

        self.probe = Some(ScheduledTask::spawn("control-probe", async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(control) = dom.locate(INJECTED_CONTROL_SELECTORS) else {
                    continue;
                };
                if dom.adopt(&control) {
                    info!(control = %control.0, "moved injected sdk control into host layout");
                    visible.send_replace(true);
                    break;
                }
                debug!(control = %control.0, "host container not mounted yet");
            }
        }));
    }

    /// Re-checks, after a short delay, whether the SDK still shows its
    /// control. Called after every call end since the SDK may remove and
    /// re-add it. A pending re-check is replaced.
    pub fn recheck(&mut self) {
        let dom = Arc::clone(&self.dom);
        let visible = Arc::clone(&self.visible);
        let delay = self.recheck_delay;

        self.recheck = Some(ScheduledTask::spawn("control-recheck", async move {
            time::sleep(delay).await;
            let present = dom.locate(INJECTED_CONTROL_SELECTORS).is_some();
            debug!(present, "re-checked injected sdk control");
            visible.send_replace(present);
        }));
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    pub fn visibility(&self) -> watch::Receiver<bool> {
        self.visible.subscribe()
    }

    /// Returns `true` while the initial probe is still looking.
    pub fn is_probing(&self) -> bool {
        self.probe.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl std::fmt::Debug for SdkUiBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkUiBridge")
            .field("visible", &self.is_visible())
            .field("probing", &self.is_probing())
            .finish_non_exhaustive()
    }
}
