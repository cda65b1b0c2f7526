//! # Lifecycle listeners.
//!
//! This module provides the [`Subscribe`] trait hosts implement to observe and
//! steer the widget lifecycle, plus built-in implementations.
//!
//! ## Architecture
//! ```text
//! Widget ── emit(Event) ──► Bus ──► for each listener (registration order)
//!                                        │
//!                                        ├──► Subscribe::on_event(&mut Dispatch)
//!                                        │         ├─ ctx.prevent_default()
//!                                        │         └─ ctx.wait_until(fut)
//!                                        │
//!                                        └──► LogWriter (feature = "logging")
//! ```
//!
//! ## Implementing custom listeners
//! ```no_run
//! use formview::{Dispatch, EventKind, Subscribe};
//!
//! struct RequireConsent;
//!
//! impl Subscribe for RequireConsent {
//!     fn on_event(&self, ctx: &mut Dispatch<'_>) {
//!         if ctx.event().kind == EventKind::BeforeSubmit {
//!             ctx.wait_until(async { /* ask the user */ true });
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "consent" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::{Subscribe, SubscriberFn};
