//! Third-party renderer seam.
//!
//! ## Contents
//! - [`Renderer`], [`RendererFactory`] what the host plugs in
//! - [`Capability`] data-application strategy, probed once per load cycle
//! - [`RendererOptions`] options resolved from `WidgetConfig`
//! - [`RendererHooks`] renderer callbacks routed into the lifecycle bus

mod engine;
mod hooks;
mod options;

pub use engine::{Capability, Renderer, RendererFactory};
pub use hooks::RendererHooks;
pub(crate) use hooks::RenderSignal;
pub use options::RendererOptions;
