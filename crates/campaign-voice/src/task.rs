//! Scheduled background work with cancel-on-drop semantics.

use std::future::Future;
use tokio::task::JoinHandle;

/// Handle to a spawned timer, poll loop, or probe.
///
/// The task is aborted when the handle is cancelled or dropped, so the
/// owner's lifetime bounds the work. Dropping a component therefore releases
/// every interval and timeout it started.
#[derive(Debug)]
pub struct ScheduledTask {
    label: &'static str,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawns `future` on the current runtime.
    pub fn spawn<F>(label: &'static str, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::trace!(task = label, "scheduled task spawned");
        Self {
            label,
            handle: tokio::spawn(future),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            tracing::trace!(task = self.label, "scheduled task cancelled");
            self.handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
