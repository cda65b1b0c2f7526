//! Lifecycle events: types and the synchronous dispatch bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`Transition`] event vocabulary and payload metadata
//! - [`Bus`] ordered dispatch with cancellation and async holds
//! - [`Dispatch`], [`Decision`] per-listener context and dispatch outcome
//!
//! ## Quick reference
//! - **Publishers**: `Widget` (load/submit phases), `Orchestrator` (stage
//!   transitions), `RendererHooks` (render/change/paging).
//! - **Consumers**: host listeners registered with `Widget::subscribe`.

mod bus;
mod event;

pub use bus::{Bus, Decision, Dispatch, Hold, ListenerId};
pub use event::{Event, EventKind, Transition};
