//! # Widget builder.
//!
//! [`WidgetBuilder`] wires the injected seams (transport, scope, listeners)
//! into the asset pipeline, the API client and the prefill coordinator.
//! Unset seams fall back to `HttpTransport` and a private `MemoryScope`.

use std::sync::Arc;

use crate::assets::{AssetFetcher, MemoryScope, Orchestrator, ResourceRegistry, Scope};
use crate::config::WidgetConfig;
use crate::error::{ConfigError, WidgetError};
use crate::events::Bus;
use crate::prefill::PrefillCoordinator;
use crate::renderer::RendererFactory;
use crate::subscribers::Subscribe;
use crate::transport::{ApiClient, Credentials, Transport};

use super::widget::Widget;

/// Builder for a [`Widget`] with its injected seams.
pub struct WidgetBuilder {
    cfg: WidgetConfig,
    factory: Arc<dyn RendererFactory>,
    transport: Option<Arc<dyn Transport>>,
    scope: Option<Arc<dyn Scope>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl WidgetBuilder {
    pub fn new(cfg: WidgetConfig, factory: Arc<dyn RendererFactory>) -> Self {
        Self {
            cfg,
            factory,
            transport: None,
            scope: None,
            subscribers: Vec::new(),
        }
    }

    /// Network seam. Defaults to `HttpTransport` with the `http` feature.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Where fetched resources are inserted. Defaults to a private [`MemoryScope`].
    ///
    /// Widgets sharing one page should share one scope.
    pub fn with_scope(mut self, scope: Arc<dyn Scope>) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Listeners registered before the first event.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the widget.
    ///
    /// Fails only on an unusable base URL or a missing transport; a missing
    /// form id is reported by `load()`.
    pub fn build(self) -> Result<Widget, WidgetError> {
        let credentials = Credentials::from_config(&self.cfg)?;
        let transport = match self.transport {
            Some(t) => t,
            None => default_transport()?,
        };
        let scope: Arc<dyn Scope> = match self.scope {
            Some(s) => s,
            None => Arc::new(MemoryScope::new()),
        };

        let bus = Bus::new();
        for s in self.subscribers {
            bus.subscribe(s);
        }

        let registry = Arc::new(ResourceRegistry::new(scope));
        let fetcher = AssetFetcher::new(
            Arc::clone(&transport),
            credentials.clone(),
            Arc::clone(&registry),
            self.cfg.effective_asset_timeout(),
        );
        let orchestrator = Orchestrator::new(fetcher, registry, bus.clone());
        let client = ApiClient::new(transport, credentials).with_timeout(self.cfg.effective_request_timeout());
        let prefill = PrefillCoordinator::new(client.clone());

        Ok(Widget::new_internal(
            self.cfg,
            bus,
            client,
            orchestrator,
            prefill,
            self.factory,
        ))
    }
}

#[cfg(feature = "http")]
fn default_transport() -> Result<Arc<dyn Transport>, ConfigError> {
    Ok(Arc::new(crate::transport::HttpTransport::new()))
}

#[cfg(not(feature = "http"))]
fn default_transport() -> Result<Arc<dyn Transport>, ConfigError> {
    Err(ConfigError::MissingTransport)
}
