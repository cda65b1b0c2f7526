//! # formview
//!
//! **formview** is the runtime of an embeddable form-viewer widget.
//!
//! It loads a form schema from a forms backend, stages the remote styles and
//! scripts a third-party renderer needs, instantiates that renderer, prefills
//! it from a prior submission and submits the result. Every phase is visible to
//! the host through a lifecycle event bus whose `before*` events can be vetoed
//! or held with an async decision.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                ┌──────────────────────── Widget ─────────────────────────┐
//!  host ──load──►│ Gate (Load | Submit | Draft, single holder, no queue)   │
//!       ─submit─►│                                                         │
//!                │  ApiClient ──► Transport (GET schema / prefill, POST)   │
//!                │                                                         │
//!                │  Orchestrator ──► AssetFetcher ──► ResourceRegistry     │
//!                │   Idle→Hints→Css→Js→Fonts→Ready        │                │
//!                │                                        ▼                │
//!                │                                      Scope (host)       │
//!                │                                                         │
//!                │  RendererFactory ──► Renderer ◄── PrefillCoordinator    │
//!                │                        │                                │
//!                │                   RendererHooks                         │
//!                └────────────────────────┼────────────────────────────────┘
//!                                         ▼
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                      Bus (ordered, synchronous dispatch)                  │
//! │  beforeLoad · beforeLoadSchema · loadSchema · assetStateChange ·          │
//! │  beforeInit · ready · render · change · beforeNext · beforePrev ·         │
//! │  beforeSubmit · submit · submitDone · error                               │
//! └───────────────┬───────────────────────────────┬──────────────────────────┘
//!                 ▼                               ▼
//!        host listeners (Subscribe)        LogWriter (feature = "logging")
//!          prevent_default()
//!          wait_until(fut)  ──► Decision::await_holds()
//! ```
//!
//! ### Load lifecycle
//! ```text
//! load()
//!   ├─► gate(Load)                    busy ─► Outcome::Skipped
//!   ├─► beforeLoad / beforeLoadSchema veto ─► Outcome::Canceled
//!   ├─► GET schema ─► loadSchema      http error ─► `error` event, Err
//!   ├─► ensure_assets()               required asset failed ─► `error` event, Err
//!   ├─► beforeInit                    veto ─► Outcome::Canceled
//!   ├─► RendererFactory::create
//!   ├─► prefill (soft failure) + pending set_submission data
//!   ├─► release gate
//!   └─► ready
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Runtime**       | Load, reload, submit, draft, destroy.                        | [`Widget`], [`Outcome`]                     |
//! | **Listener API**  | Observe, veto and hold lifecycle phases.                     | [`Subscribe`], [`SubscriberFn`], [`Dispatch`] |
//! | **Assets**        | Staged, fallback-aware resource loading.                     | [`Orchestrator`], [`AssetFetcher`], [`Scope`] |
//! | **Renderer seam** | Third-party form engine surface.                             | [`Renderer`], [`RendererFactory`]           |
//! | **Errors**        | Typed errors with stable labels.                             | [`WidgetError`], [`FetchError`]             |
//! | **Configuration** | Endpoints, switches, overrides, declarative attributes.      | [`WidgetConfig`]                            |
//!
//! ## Optional features
//! - `http` (default): [`HttpTransport`] over `reqwest`.
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use serde_json::{Map, Value};
//! use formview::{
//!     Capability, FormSchema, Outcome, Renderer, RendererError, RendererFactory, RendererHooks,
//!     RendererOptions, Widget, WidgetConfig,
//! };
//!
//! struct Headless;
//!
//! impl Renderer for Headless {
//!     fn capability(&self) -> Capability { Capability::DirectAssignmentOnly }
//!     fn data(&self) -> Map<String, Value> { Map::new() }
//!     fn set_data(&self, _data: Map<String, Value>) {}
//!     fn redraw(&self) {}
//!     fn destroy(&self) {}
//! }
//!
//! struct HeadlessFactory;
//!
//! #[async_trait]
//! impl RendererFactory for HeadlessFactory {
//!     async fn create(
//!         &self,
//!         _schema: &FormSchema,
//!         _options: &RendererOptions,
//!         hooks: RendererHooks,
//!     ) -> Result<Arc<dyn Renderer>, RendererError> {
//!         hooks.rendered();
//!         Ok(Arc::new(Headless))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = WidgetConfig::new("https://forms.example.org/app", "my-form").with_api_key("key");
//!     let widget = Widget::builder(cfg, Arc::new(HeadlessFactory)).build()?;
//!
//!     if let Outcome::Completed(()) = widget.load().await? {
//!         let response = widget.submit(true).await?;
//!         println!("{response:?}");
//!     }
//!     Ok(())
//! }
//! ```
mod assets;
mod config;
mod error;
mod events;
mod gate;
mod prefill;
mod renderer;
mod runtime;
mod schema;
mod subscribers;
mod transport;

#[cfg(test)]
mod test_support;

// ---- Public re-exports ----

pub use assets::{
    AssetDescriptor, AssetFetcher, AssetKind, AssetReport, Insertion, LoadResult, LoadState, MemoryScope,
    Orchestrator, Resource, ResourceKind, ResourceRegistry, ResultLog, Scope, StagePlan, Validator,
};
pub use config::{AssetOverride, AssetSwitches, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, Endpoints, WidgetConfig};
pub use error::{ConfigError, FetchError, RendererError, TransportError, WidgetError};
pub use events::{Bus, Decision, Dispatch, Event, EventKind, Hold, ListenerId, Transition};
pub use gate::{Action, BusyLock, Gate, GateGuard};
pub use prefill::{PrefillCoordinator, PrefillRecord};
pub use renderer::{Capability, Renderer, RendererFactory, RendererHooks, RendererOptions};
pub use runtime::{Outcome, Widget, WidgetBuilder, WidgetState};
pub use schema::FormSchema;
pub use subscribers::{Subscribe, SubscriberFn};
pub use transport::{ApiClient, Credentials, HeaderHook, HttpRequest, HttpResponse, Method, Transport};

/// Well-known asset keys and globals.
pub mod keys {
    pub use crate::assets::{
        COMPONENTS_GLOBAL, COMPONENTS_JS, FONT_PRIMARY, FORMIO_GLOBAL, FORMIO_JS, ICONS_CSS, ICONS_INHERIT,
        ICONS_NEUTRALIZE, MAIN_CSS, THEME_CSS,
    };
}

#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Optional: expose a simple built-in logger listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
