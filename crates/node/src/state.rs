//! Synchronized per-node runtime state.
//!
//! One reader/writer lock covers exactly the lifecycle state, the two
//! dispatch counters and the error log. Nothing else goes behind it, and it
//! is never held across an `.await`.

use crate::error::NodeError;
use corelib::NodeState;
use parking_lot::RwLock;
use std::sync::Arc;

/// Dispatch outcome counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub success: u64,
    pub error: u64,
}

impl Counters {
    pub fn total(&self) -> u64 {
        self.success + self.error
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: NodeState,
    counters: Counters,
    errors: Vec<Arc<NodeError>>,
}

#[derive(Debug, Default)]
pub struct RuntimeState {
    inner: RwLock<Inner>,
}

impl RuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NodeState {
        self.inner.read().state
    }

    pub fn set_state(&self, state: NodeState) {
        self.inner.write().state = state;
    }

    /// Count one dispatch outcome.
    pub fn record_outcome(&self, success: bool) {
        let mut inner = self.inner.write();
        if success {
            inner.counters.success += 1;
        } else {
            inner.counters.error += 1;
        }
    }

    pub fn counters(&self) -> Counters {
        self.inner.read().counters
    }

    /// Set the state and append errors in one critical section.
    pub fn fail(&self, state: NodeState, errors: &[Arc<NodeError>]) {
        let mut inner = self.inner.write();
        inner.state = state;
        inner.errors.extend(errors.iter().cloned());
    }

    /// Copy of the error log, oldest first.
    pub fn errors(&self) -> Vec<Arc<NodeError>> {
        self.inner.read().errors.clone()
    }
}

/// Marks a lifecycle transition as in flight.
///
/// Dropping an armed guard means the future driving the transition was
/// cancelled; the node then lands in `Error` with a [`NodeError::Cancelled`]
/// entry instead of staying in `Starting` or `Stopping` forever.
#[must_use]
pub struct TransitionGuard<'a> {
    state: &'a RuntimeState,
    operation: &'static str,
    armed: bool,
}

impl<'a> TransitionGuard<'a> {
    /// Enter `transient` and arm the guard.
    pub fn enter(state: &'a RuntimeState, transient: NodeState, operation: &'static str) -> Self {
        state.set_state(transient);
        Self {
            state,
            operation,
            armed: true,
        }
    }

    /// The transition reached a settled state on its own.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!(operation = self.operation, "lifecycle transition cancelled");
            self.state.fail(
                NodeState::Error,
                &[Arc::new(NodeError::Cancelled(self.operation))],
            );
        }
    }
}
