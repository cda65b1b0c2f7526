//! # Renderer → bus bridge.
//!
//! A [`RendererHooks`] handle is passed to the factory at instantiation. The
//! renderer calls it from its own callbacks and the widget's listeners see the
//! matching lifecycle events:
//!
//! ```text
//! renderer render pass   ──► hooks.rendered()        ──► `render`
//! renderer data change   ──► hooks.changed(detail)   ──► `change`
//! wizard next / previous ──► hooks.before_next(..)   ──► `beforeNext`  (Decision)
//!                            hooks.before_prev(..)   ──► `beforePrev`  (Decision)
//! ```
//!
//! The first `rendered()` call also trips a `RenderSignal` the widget uses to
//! verify prefill once the form is on screen.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use crate::events::{Bus, Decision, Event, EventKind};

/// Lifecycle callbacks for a renderer instance. Cheap to clone.
#[derive(Clone)]
pub struct RendererHooks {
    bus: Bus,
    first_render: Arc<watch::Sender<bool>>,
}

impl RendererHooks {
    pub(crate) fn new(bus: Bus) -> (Self, RenderSignal) {
        let (tx, rx) = watch::channel(false);
        let hooks = Self {
            bus,
            first_render: Arc::new(tx),
        };
        (hooks, RenderSignal { rx })
    }

    /// A render pass finished.
    pub fn rendered(&self) {
        self.first_render.send_if_modified(|done| !std::mem::replace(done, true));
        self.bus.publish(Event::new(EventKind::Render));
    }

    /// Form data changed.
    pub fn changed(&self, detail: Value) {
        self.bus.publish(Event::new(EventKind::Change).with_detail(detail));
    }

    /// The wizard wants to move forward. Await the decision before paging.
    pub fn before_next(&self, detail: Value) -> Decision {
        self.bus
            .emit_cancelable(Event::new(EventKind::BeforeNext).with_detail(detail))
    }

    /// The wizard wants to move back. Await the decision before paging.
    pub fn before_prev(&self, detail: Value) -> Decision {
        self.bus
            .emit_cancelable(Event::new(EventKind::BeforePrev).with_detail(detail))
    }
}

/// Resolves once the renderer reported its first render.
pub(crate) struct RenderSignal {
    rx: watch::Receiver<bool>,
}

impl RenderSignal {
    /// `true` once rendered; `false` if every hooks handle was dropped first.
    pub(crate) async fn wait(&mut self) -> bool {
        loop {
            if *self.rx.borrow_and_update() {
                return true;
            }
            if self.rx.changed().await.is_err() {
                return *self.rx.borrow();
            }
        }
    }
}
