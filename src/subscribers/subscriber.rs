//! # Listener trait and closure-backed listener.
//!
//! Provides [`Subscribe`], the extension point for plugging host logic into the
//! lifecycle, and [`SubscriberFn`] for closure listeners.
//!
//! ## Rules
//! - Listeners run **synchronously** inside `emit*`, in registration order.
//! - Long work belongs in a hold (`ctx.wait_until(fut)`), never in `on_event`.
//! - Panics are caught by the bus and logged; they do not cancel the event.
//!
//! ## Example
//! ```rust
//! use formview::{Dispatch, EventKind, SubscriberFn};
//!
//! let veto_loads = SubscriberFn::on(EventKind::BeforeLoad, "veto", |ctx: &mut Dispatch<'_>| {
//!     ctx.prevent_default();
//! });
//! assert_eq!(formview::Subscribe::name(veto_loads.as_ref()), "veto");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::events::{Dispatch, EventKind};

/// Lifecycle listener.
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one dispatched event.
    ///
    /// For cancelable events `ctx` accepts `prevent_default()` and (through
    /// `emit_cancelable`) `wait_until(fut)`.
    fn on_event(&self, ctx: &mut Dispatch<'_>);

    /// Returns the listener name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Filters events before `on_event` is called. Default: every event.
    fn accepts(&self, _kind: EventKind) -> bool {
        true
    }
}

/// Closure-backed listener.
pub struct SubscriberFn<F> {
    name: Cow<'static, str>,
    only: Option<EventKind>,
    f: F,
}

impl<F> SubscriberFn<F>
where
    F: Fn(&mut Dispatch<'_>) + Send + Sync + 'static,
{
    /// Creates a listener for every event kind.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            only: None,
            f,
        }
    }

    /// Creates a listener and returns it as `Arc`.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }

    /// Creates a listener restricted to one event kind.
    pub fn on(kind: EventKind, name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            only: Some(kind),
            f,
        })
    }
}

impl<F> Subscribe for SubscriberFn<F>
where
    F: Fn(&mut Dispatch<'_>) + Send + Sync + 'static,
{
    fn on_event(&self, ctx: &mut Dispatch<'_>) {
        (self.f)(ctx)
    }

    fn name(&self) -> &'static str {
        match &self.name {
            Cow::Borrowed(s) => *s,
            Cow::Owned(_) => "subscriber_fn",
        }
    }

    fn accepts(&self, kind: EventKind) -> bool {
        self.only.map_or(true, |k| k == kind)
    }
}
