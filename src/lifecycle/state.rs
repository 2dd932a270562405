//! Server lifecycle state machine.
//!
//! # States
//! ```text
//! Starting → Serving → Draining → Stopped
//!     └────────────────────────────↗ (bind failure)
//! ```
//!
//! Transitions only move forward. A request to move to an earlier or equal
//! state is ignored, so racing observers (signal task, serving task) cannot
//! undo each other.

use std::sync::Arc;

use tokio::sync::watch;

/// Lifecycle state of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    /// Configuration loaded, listener not yet bound.
    Starting,
    /// Listener bound and accepting connections.
    Serving,
    /// No new connections; in-flight requests finishing.
    Draining,
    /// Listener closed.
    Stopped,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Starting => "starting",
            LifecycleState::Serving => "serving",
            LifecycleState::Draining => "draining",
            LifecycleState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, forward-only lifecycle state.
///
/// Cloning yields another handle to the same state.
#[derive(Debug, Clone)]
pub struct LifecycleTracker {
    tx: Arc<watch::Sender<LifecycleState>>,
}

impl LifecycleTracker {
    /// Create a tracker in the `Starting` state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Starting);
        Self { tx: Arc::new(tx) }
    }

    /// Current state.
    pub fn current(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }

    /// Move to `next` if it is later than the current state.
    ///
    /// Returns `true` if the state changed.
    pub fn advance(&self, next: LifecycleState) -> bool {
        let mut previous = None;
        let changed = self.tx.send_if_modified(|state| {
            if next > *state {
                previous = Some(*state);
                *state = next;
                true
            } else {
                false
            }
        });

        if let Some(from) = previous {
            tracing::info!(from = %from, to = %next, "Lifecycle transition");
        }
        changed
    }
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_starting_state() {
        assert_eq!(LifecycleTracker::new().current(), LifecycleState::Starting);
    }

    #[test]
    fn transitions_are_one_way() {
        let tracker = LifecycleTracker::new();
        assert!(tracker.advance(LifecycleState::Serving));
        assert!(tracker.advance(LifecycleState::Draining));

        assert!(!tracker.advance(LifecycleState::Serving));
        assert!(!tracker.advance(LifecycleState::Draining));
        assert_eq!(tracker.current(), LifecycleState::Draining);

        assert!(tracker.advance(LifecycleState::Stopped));
        assert!(!tracker.advance(LifecycleState::Starting));
        assert_eq!(tracker.current(), LifecycleState::Stopped);
    }

    #[test]
    fn clones_share_state() {
        let tracker = LifecycleTracker::new();
        let other = tracker.clone();
        other.advance(LifecycleState::Serving);
        assert_eq!(tracker.current(), LifecycleState::Serving);
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let tracker = LifecycleTracker::new();
        let mut rx = tracker.subscribe();

        let waiter = tokio::spawn(async move {
            let reached = rx.wait_for(|s| *s == LifecycleState::Stopped).await.map(|s| *s);
            reached
        });

        tracker.advance(LifecycleState::Serving);
        tracker.advance(LifecycleState::Stopped);

        assert_eq!(waiter.await.unwrap().unwrap(), LifecycleState::Stopped);
    }
}
