//! # Lifecycle events emitted by the widget.
//!
//! The [`EventKind`] enum is the fixed vocabulary hosts can listen to. It splits
//! into two groups:
//! - **Cancelable events** (`before*`): listeners may veto the phase or hold it
//!   with an async decision.
//! - **Observational events**: emitted after the fact; cancellation is ignored.
//!
//! The [`Event`] struct carries a JSON `detail` plus typed metadata for the
//! events that need it (errors, asset state transitions).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use formview::{Event, EventKind};
//! use serde_json::json;
//!
//! let ev = Event::new(EventKind::BeforeSubmit).with_detail(json!({"draft": false}));
//!
//! assert!(ev.kind.is_cancelable());
//! assert_eq!(ev.kind.as_str(), "beforeSubmit");
//! assert_eq!(ev.detail["draft"], json!(false));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use serde_json::Value;

use crate::assets::{LoadResult, LoadState};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Lifecycle event vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Load phase ===
    /// `load()` is about to start. Cancelable.
    ///
    /// Sets:
    /// - `detail.formId`
    BeforeLoad,

    /// Schema is about to be fetched. Cancelable.
    ///
    /// Sets:
    /// - `detail.url`
    BeforeLoadSchema,

    /// Schema was fetched and parsed.
    ///
    /// Sets:
    /// - `detail.form`, `detail.schema`
    LoadSchema,

    /// Renderer is about to be instantiated. Cancelable.
    ///
    /// Sets:
    /// - `detail.options`: renderer options (listeners see the final values)
    BeforeInit,

    /// Form is rendered and prefilled; fires once per successful load.
    Ready,

    /// Asset orchestrator moved between stages.
    ///
    /// Sets:
    /// - `transition`: from/to state and the result log so far
    AssetStateChange,

    // === Renderer-driven ===
    /// Renderer finished a render pass.
    Render,

    /// Form data changed.
    ///
    /// Sets:
    /// - `detail`: the renderer's change payload
    Change,

    /// Wizard is about to move to the next page. Cancelable.
    BeforeNext,

    /// Wizard is about to move to the previous page. Cancelable.
    BeforePrev,

    // === Submission ===
    /// Submission is about to be sent. Cancelable.
    ///
    /// Sets:
    /// - `detail`: the payload that will be POSTed
    BeforeSubmit,

    /// Submission passed all holds and is being sent.
    Submit,

    /// Backend accepted the submission.
    ///
    /// Sets:
    /// - `detail`: backend response body
    SubmitDone,

    // === Failures ===
    /// A required path failed.
    ///
    /// Sets:
    /// - `error`: human-readable message
    /// - `detail.label`: stable error label
    Error,
}

impl EventKind {
    /// Host-facing event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::BeforeLoad => "beforeLoad",
            EventKind::BeforeLoadSchema => "beforeLoadSchema",
            EventKind::LoadSchema => "loadSchema",
            EventKind::BeforeInit => "beforeInit",
            EventKind::Ready => "ready",
            EventKind::AssetStateChange => "assetStateChange",
            EventKind::Render => "render",
            EventKind::Change => "change",
            EventKind::BeforeNext => "beforeNext",
            EventKind::BeforePrev => "beforePrev",
            EventKind::BeforeSubmit => "beforeSubmit",
            EventKind::Submit => "submit",
            EventKind::SubmitDone => "submitDone",
            EventKind::Error => "error",
        }
    }

    /// `true` for the `before*` phases listeners may veto.
    pub fn is_cancelable(&self) -> bool {
        matches!(
            self,
            EventKind::BeforeLoad
                | EventKind::BeforeLoadSchema
                | EventKind::BeforeInit
                | EventKind::BeforeSubmit
                | EventKind::BeforeNext
                | EventKind::BeforePrev
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset stage transition attached to [`EventKind::AssetStateChange`].
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: LoadState,
    pub to: LoadState,
    /// Result log at the time of the transition.
    pub results: Arc<[LoadResult]>,
}

/// Lifecycle event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Structured payload (`Value::Null` when unused).
    pub detail: Value,
    /// Human-readable error (only for [`EventKind::Error`]).
    pub error: Option<Arc<str>>,
    /// Stage transition (only for [`EventKind::AssetStateChange`]).
    pub transition: Option<Transition>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            detail: Value::Null,
            error: None,
            transition: None,
        }
    }

    /// Attaches a JSON payload.
    #[inline]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }

    /// Attaches an error message.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attaches a stage transition.
    #[inline]
    pub fn with_transition(mut self, from: LoadState, to: LoadState, results: Arc<[LoadResult]>) -> Self {
        self.transition = Some(Transition { from, to, results });
        self
    }

    /// Builds an [`EventKind::Error`] event from a widget error.
    pub fn failure(err: &crate::WidgetError) -> Self {
        Event::new(EventKind::Error)
            .with_error(err.as_message())
            .with_detail(serde_json::json!({ "label": err.as_label() }))
    }
}
