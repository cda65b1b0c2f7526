//! # Single-holder action gate.
//!
//! [`Gate`] admits one action at a time and never queues: a second `acquire`
//! fails immediately. [`GateGuard`] releases the slot on drop, so every exit
//! path of an action (including `?` and panics) frees it.

use std::sync::Mutex;
use std::time::Instant;

use super::action::Action;

/// State of the single action slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusyLock {
    /// `true` while an action runs.
    pub held: bool,
    /// The running action, if any.
    pub holder: Option<Action>,
    /// When the current holder acquired the slot.
    pub since: Option<Instant>,
}

/// Single-holder, non-queueing lock shared by the widget's public actions.
#[derive(Debug, Default)]
pub struct Gate {
    state: Mutex<BusyLock>,
}

impl Gate {
    /// Creates an idle gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tries to take the slot for `action`.
    ///
    /// Returns `false` immediately if another action holds it.
    pub fn acquire(&self, action: Action) -> bool {
        let mut st = self.lock();
        if st.held {
            tracing::debug!(
                action = action.as_str(),
                holder = st.holder.map(|a| a.as_str()).unwrap_or("unknown"),
                "gate busy"
            );
            return false;
        }
        *st = BusyLock {
            held: true,
            holder: Some(action),
            since: Some(Instant::now()),
        };
        true
    }

    /// Frees the slot. Calling it on an idle gate is a no-op.
    pub fn release(&self) {
        *self.lock() = BusyLock::default();
    }

    /// Scoped acquisition: the returned guard releases on drop.
    #[must_use = "dropping the guard releases the gate immediately"]
    pub fn scoped(&self, action: Action) -> Option<GateGuard<'_>> {
        self.acquire(action).then_some(GateGuard { gate: self, action })
    }

    /// Snapshot of the current lock state.
    pub fn state(&self) -> BusyLock {
        *self.lock()
    }

    /// The current holder, if any.
    #[inline]
    pub fn holder(&self) -> Option<Action> {
        self.state().holder
    }

    /// `true` while some action holds the slot.
    #[inline]
    pub fn is_held(&self) -> bool {
        self.state().held
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BusyLock> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Releases the gate when dropped.
#[derive(Debug)]
pub struct GateGuard<'a> {
    gate: &'a Gate,
    action: Action,
}

impl GateGuard<'_> {
    /// The action holding the gate.
    #[inline]
    pub fn action(&self) -> Action {
        self.action
    }
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
