//! # Renderer abstraction.
//!
//! The widget never renders anything itself. It hands the parsed schema to a
//! host-supplied [`RendererFactory`] and talks to the resulting [`Renderer`]
//! through this narrow surface.
//!
//! Renderers differ in what they support; the widget probes
//! [`Renderer::capability`] once per load cycle and picks a strategy from the
//! answer instead of re-checking at every call site.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::hooks::RendererHooks;
use super::options::RendererOptions;
use crate::error::RendererError;
use crate::schema::FormSchema;

/// How a renderer accepts externally supplied data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// [`Renderer::set_submission`] is supported.
    NativeSetSubmission,
    /// Only [`Renderer::set_data`] followed by [`Renderer::redraw`].
    DirectAssignmentOnly,
}

/// # A live form instance.
///
/// Calls come from the widget's control flow; implementations are expected to
/// forward their own lifecycle through the [`RendererHooks`] they were created with.
pub trait Renderer: Send + Sync + 'static {
    /// Reports the data-application strategy this renderer supports.
    fn capability(&self) -> Capability;

    /// Replaces the submission data natively.
    ///
    /// Renderers reporting [`Capability::DirectAssignmentOnly`] may leave the default.
    fn set_submission(&self, _data: &Map<String, Value>) -> Result<(), RendererError> {
        Err(RendererError::SetSubmission {
            reason: "not supported".to_string(),
        })
    }

    /// Current form data.
    fn data(&self) -> Map<String, Value>;

    /// Overwrites the form data without re-rendering.
    fn set_data(&self, data: Map<String, Value>);

    /// Re-renders the form from its current data.
    fn redraw(&self);

    /// Tears the instance down. Called at most once per instance.
    fn destroy(&self);
}

/// # Creates renderers from a schema.
#[async_trait]
pub trait RendererFactory: Send + Sync + 'static {
    /// Instantiates a renderer.
    ///
    /// `hooks` stays valid for the lifetime of the instance.
    async fn create(
        &self,
        schema: &FormSchema,
        options: &RendererOptions,
        hooks: RendererHooks,
    ) -> Result<Arc<dyn Renderer>, RendererError>;
}
