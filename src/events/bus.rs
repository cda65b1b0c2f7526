//! # Lifecycle event bus.
//!
//! [`Bus`] dispatches [`Event`]s to registered [`Subscribe`] listeners
//! **synchronously**, in registration order, and lets listeners of cancelable
//! events veto or hold the operation.
//!
//! ## Architecture
//! ```text
//! emit_cancelable(ev)
//!     │
//!     ├──► listener 1 ──► ctx.wait_until(fut)   (hold collected)
//!     ├──► listener 2 ──► ctx.prevent_default() (canceled)
//!     └──► listener N
//!     │
//!     ▼
//!  Decision { proceed, holds } ──► await_holds().await ──► bool
//! ```
//!
//! ## Rules
//! - **Synchronous dispatch**: every listener attached before the call sees the
//!   event before `emit*` returns.
//! - **Holds only during dispatch**: [`Dispatch`] is borrowed for the listener
//!   call only, so a hold cannot be added after dispatch completes.
//! - **Failing holds**: a hold that panics, returns `Err`, or is a plain
//!   `false` denies the operation; it never propagates.
//! - **Panic isolation**: a panicking listener is logged and skipped; later
//!   listeners still run.
//! - **Single-use decisions**: [`Decision::await_holds`] consumes the decision.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};

use super::event::Event;
use crate::subscribers::Subscribe;

/// A pending asynchronous vote: `true` lets the operation proceed.
pub type Hold = BoxFuture<'static, bool>;

/// Handle returned by [`Bus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Per-listener view of one dispatch.
pub struct Dispatch<'a> {
    event: &'a Event,
    cancelable: bool,
    accepts_holds: bool,
    canceled: bool,
    holds: Vec<Hold>,
}

impl<'a> Dispatch<'a> {
    fn new(event: &'a Event, cancelable: bool, accepts_holds: bool) -> Self {
        Self {
            event,
            cancelable,
            accepts_holds,
            canceled: false,
            holds: Vec::new(),
        }
    }

    /// The event being dispatched.
    #[inline]
    pub fn event(&self) -> &Event {
        self.event
    }

    /// `true` if [`prevent_default`](Self::prevent_default) has any effect.
    #[inline]
    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    /// `true` if a listener (this one or an earlier one) canceled the event.
    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// Vetoes the default action. Ignored for non-cancelable events.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.canceled = true;
        } else {
            tracing::debug!(event = %self.event.kind, "prevent_default on non-cancelable event ignored");
        }
    }

    /// Registers an async vote; `false` denies the operation.
    ///
    /// Panics inside `fut` count as `false`. Ignored unless the event was
    /// dispatched through [`Bus::emit_cancelable`].
    pub fn wait_until<F>(&mut self, fut: F)
    where
        F: Future<Output = bool> + Send + 'static,
    {
        if !self.accepts_holds {
            tracing::debug!(event = %self.event.kind, "wait_until outside cancelable dispatch ignored");
            return;
        }
        let guarded = AssertUnwindSafe(fut)
            .catch_unwind()
            .map(|res| res.unwrap_or(false));
        self.holds.push(guarded.boxed());
    }

    /// Registers a fallible async vote; `Err` counts as `false`.
    pub fn wait_until_ok<F, E>(&mut self, fut: F)
    where
        F: Future<Output = Result<bool, E>> + Send + 'static,
        E: Send + 'static,
    {
        self.wait_until(fut.map(|res| res.unwrap_or(false)));
    }
}

/// Outcome of a cancelable dispatch.
///
/// `proceed` reflects synchronous cancellation; `holds` still need awaiting.
#[must_use = "a decision must be awaited before the guarded operation runs"]
pub struct Decision {
    proceed: bool,
    holds: Vec<Hold>,
}

impl Decision {
    /// `false` if any listener called `prevent_default`.
    #[inline]
    pub fn proceed(&self) -> bool {
        self.proceed
    }

    /// Number of holds collected during dispatch.
    #[inline]
    pub fn hold_count(&self) -> usize {
        self.holds.len()
    }

    /// Resolves all holds; `true` iff not canceled and no hold resolved to `false`.
    ///
    /// A canceled decision returns `false` without polling its holds.
    pub async fn await_holds(self) -> bool {
        if !self.proceed {
            return false;
        }
        if self.holds.is_empty() {
            return true;
        }
        join_all(self.holds).await.into_iter().all(|v| v)
    }
}

struct Inner {
    listeners: RwLock<Vec<(ListenerId, Arc<dyn Subscribe>)>>,
    next_id: AtomicU64,
}

/// Synchronous, ordered lifecycle bus.
///
/// Cheap to clone; clones share the listener list.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<Inner>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    /// Creates a bus with no listeners.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                listeners: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Registers a listener; it observes events emitted after this call.
    pub fn subscribe(&self, listener: Arc<dyn Subscribe>) -> ListenerId {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, listener));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut list = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(|e| e.into_inner());
        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        list.len() != before
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// `true` when no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispatches an observational (or synchronously cancelable) event.
    ///
    /// Returns `false` only if `cancelable` and a listener canceled.
    /// Holds registered by listeners are ignored.
    pub fn emit(&self, event: Event, cancelable: bool) -> bool {
        self.dispatch(&event, cancelable, false).proceed
    }

    /// Dispatches an observational event.
    #[inline]
    pub fn publish(&self, event: Event) {
        let _ = self.emit(event, false);
    }

    /// Dispatches a cancelable event and collects holds.
    pub fn emit_cancelable(&self, event: Event) -> Decision {
        self.dispatch(&event, true, true)
    }

    fn dispatch(&self, event: &Event, cancelable: bool, accepts_holds: bool) -> Decision {
        // Snapshot so listeners may (un)subscribe while being called.
        let listeners: Vec<Arc<dyn Subscribe>> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        let mut ctx = Dispatch::new(event, cancelable, accepts_holds);
        for listener in listeners {
            if !listener.accepts(event.kind) {
                continue;
            }
            let res = std::panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(&mut ctx)));
            if res.is_err() {
                tracing::warn!(
                    listener = listener.name(),
                    event = %event.kind,
                    "listener panicked; continuing dispatch"
                );
            }
        }

        Decision {
            proceed: !ctx.canceled,
            holds: ctx.holds,
        }
    }
}
