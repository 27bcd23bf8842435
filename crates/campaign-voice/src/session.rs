//! The call lifecycle state machine.
//!
//! ```text
//! Idle ──begin──▶ Starting ──activate──▶ Active ──end──▶ Ending ──finish──▶ Ended ──reset──▶ Idle
//!   ▲                                                                                       │
//!   └──────────────────────────────── abort (from any state) ───────────────────────────────┘
//! ```
//!
//! The session only tracks the vendor call id, the state, and when the call
//! was requested. Transcript and event bookkeeping live elsewhere.

use crate::error::VoiceError;
use campaign_types::CallState;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the transition broadcast channel.
const TRANSITION_BROADCAST_CAPACITY: usize = 64;

/// A single state change, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTransition {
    pub from: CallState,
    pub to: CallState,
    pub call_id: Option<String>,
}

#[derive(Debug)]
pub struct CallSession {
    id: Option<String>,
    state: CallState,
    started_at: Option<DateTime<Utc>>,
    transitions: broadcast::Sender<CallTransition>,
}

impl Default for CallSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CallSession {
    pub fn new() -> Self {
        let (transitions, _) = broadcast::channel(TRANSITION_BROADCAST_CAPACITY);
        Self {
            id: None,
            state: CallState::Idle,
            started_at: None,
            transitions,
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    /// The vendor-assigned call id, once the call is active.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CallTransition> {
        self.transitions.subscribe()
    }

    /// Idle → Starting. Any other state already holds the single live-call
    /// slot, so the request is rejected.
    pub fn begin(&mut self) -> Result<(), VoiceError> {
        if self.state != CallState::Idle {
            return Err(VoiceError::CallInProgress(self.state));
        }
        self.id = None;
        self.started_at = Some(Utc::now());
        self.move_to(CallState::Starting);
        Ok(())
    }

    /// Starting → Active, capturing the vendor call id.
    pub fn activate(&mut self, call_id: Option<String>) -> bool {
        if self.state != CallState::Starting {
            return false;
        }
        self.id = call_id;
        self.move_to(CallState::Active);
        true
    }

    /// Active → Ending.
    pub fn end(&mut self) -> bool {
        self.step(CallState::Active, CallState::Ending)
    }

    /// Ending → Ended.
    pub fn finish(&mut self) -> bool {
        self.step(CallState::Ending, CallState::Ended)
    }

    /// Ended → Idle, clearing the session.
    pub fn reset(&mut self) -> bool {
        if !self.step(CallState::Ended, CallState::Idle) {
            return false;
        }
        self.clear();
        true
    }

    /// Any state → Idle without passing through Ending/Ended.
    pub fn abort(&mut self) {
        if self.state != CallState::Idle {
            self.move_to(CallState::Idle);
        }
        self.clear();
    }

    fn step(&mut self, from: CallState, to: CallState) -> bool {
        if self.state != from {
            return false;
        }
        self.move_to(to);
        true
    }

    fn clear(&mut self) {
        self.id = None;
        self.started_at = None;
    }

    fn move_to(&mut self, next: CallState) {
        let from = self.state;
        self.state = next;
        debug!(%from, to = %next, call_id = ?self.id, "call state transition");
        // No subscribers is fine.
        let _ = self.transitions.send(CallTransition {
            from,
            to: next,
            call_id: self.id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut broadcast::Receiver<CallTransition>) -> Vec<CallState> {
        let mut seen = Vec::new();
        while let Ok(transition) = rx.try_recv() {
            seen.push(transition.to);
        }
        seen
    }

    #[test]
    fn full_lifecycle_visits_every_state_in_order() {
        let mut session = CallSession::new();
        let mut rx = session.subscribe();

        session.begin().expect("idle session should start");
        assert!(session.activate(Some("abc123".to_string())));
        assert_eq!(session.id(), Some("abc123"));
        assert!(session.end());
        assert!(session.finish());
        assert_eq!(session.id(), Some("abc123"), "id survives until reset");
        assert!(session.reset());

        assert_eq!(
            drain(&mut rx),
            vec![
                CallState::Starting,
                CallState::Active,
                CallState::Ending,
                CallState::Ended,
                CallState::Idle,
            ]
        );
        assert_eq!(session.state(), CallState::Idle);
        assert_eq!(session.id(), None);
        assert_eq!(session.started_at(), None);
    }

    #[test]
    fn begin_is_rejected_while_a_call_is_live() {
        let mut session = CallSession::new();
        session.begin().expect("first start");
        assert_eq!(
            session.begin(),
            Err(VoiceError::CallInProgress(CallState::Starting))
        );

        session.activate(Some("abc".to_string()));
        assert_eq!(
            session.begin(),
            Err(VoiceError::CallInProgress(CallState::Active))
        );
        assert_eq!(session.id(), Some("abc"), "rejected start keeps the id");
    }

    #[test]
    fn out_of_order_transitions_are_ignored() {
        let mut session = CallSession::new();
        assert!(!session.activate(Some("x".to_string())));
        assert!(!session.end());
        assert!(!session.finish());
        assert!(!session.reset());
        assert_eq!(session.state(), CallState::Idle);

        session.begin().expect("start");
        assert!(!session.end(), "cannot end before the call is active");
        assert_eq!(session.state(), CallState::Starting);
    }

    #[test]
    fn abort_returns_to_idle_from_anywhere() {
        let mut session = CallSession::new();
        session.begin().expect("start");
        session.activate(Some("abc".to_string()));
        session.abort();
        assert_eq!(session.state(), CallState::Idle);
        assert_eq!(session.id(), None);

        let mut rx = session.subscribe();
        session.abort();
        assert!(drain(&mut rx).is_empty(), "abort from idle emits nothing");
    }
}
