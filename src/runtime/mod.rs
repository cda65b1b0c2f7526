//! Widget runtime: the public façade sequencing schema, assets, renderer,
//! prefill and submission.
//!
//! ## Contents
//! - [`Widget`] the controller hosts hold on to
//! - [`WidgetBuilder`] wires transport, scope, renderer factory and listeners
//! - [`Outcome`] non-error results (`Completed`, `Skipped`, `Canceled`)
//! - [`WidgetState`] `Uninitialized → Ready → Destroyed`

mod builder;
mod outcome;
mod widget;

pub use builder::WidgetBuilder;
pub use outcome::Outcome;
pub use widget::{Widget, WidgetState};
