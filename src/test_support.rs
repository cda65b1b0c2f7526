//! Shared fakes for in-crate tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::WidgetConfig;
use crate::error::{RendererError, TransportError};
use crate::renderer::{Capability, Renderer, RendererFactory, RendererHooks, RendererOptions};
use crate::schema::FormSchema;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

type Reply = Result<HttpResponse, TransportError>;

/// Scripted [`Transport`]: unknown routes answer `404`.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Reply>>,
    log: Mutex<Vec<HttpRequest>>,
    delay: Mutex<Option<Duration>>,
    route_delays: Mutex<HashMap<(Method, String), Duration>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route_text(&self, method: Method, url: &str, content_type: &str, body: &str) {
        let resp = HttpResponse::new(200, body.as_bytes().to_vec()).with_header("content-type", content_type);
        self.route(method, url, Ok(resp));
    }

    pub(crate) fn route_json(&self, method: Method, url: &str, body: Value) {
        self.route(method, url, Ok(HttpResponse::json_ok(&body)));
    }

    pub(crate) fn route_status(&self, method: Method, url: &str, status: u16) {
        self.route(method, url, Ok(HttpResponse::new(status, Vec::new())));
    }

    pub(crate) fn route_error(&self, method: Method, url: &str) {
        let err = TransportError::Request {
            reason: "connection refused".to_string(),
        };
        self.route(method, url, Err(err));
    }

    /// Delays every response.
    pub(crate) fn delay(&self, d: Duration) {
        *self.delay.lock().unwrap() = Some(d);
    }

    /// Delays responses of one route; takes precedence over [`MockTransport::delay`].
    pub(crate) fn delay_route(&self, method: Method, url: &str, d: Duration) {
        self.route_delays.lock().unwrap().insert((method, normalize(url)), d);
    }

    pub(crate) fn count(&self, method: Method, url: &str) -> usize {
        let url = normalize(url);
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url.as_str() == url)
            .count()
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    fn route(&self, method: Method, url: &str, reply: Reply) {
        self.routes.lock().unwrap().insert((method, normalize(url)), reply);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.log.lock().unwrap().push(req.clone());
        let key = (req.method, req.url.to_string());
        let delay = self
            .route_delays
            .lock()
            .unwrap()
            .get(&key)
            .copied()
            .or(*self.delay.lock().unwrap());
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        self.routes
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Ok(HttpResponse::new(404, Vec::new())))
    }
}

fn normalize(url: &str) -> String {
    url::Url::parse(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string())
}

/// Routes every default asset of `cfg` with a plausible body.
pub(crate) fn serve_assets(t: &MockTransport, cfg: &WidgetConfig) {
    for css in ["css/form-viewer.css", "css/font-awesome.min.css", "css/theme.css"] {
        t.route_text(Method::Get, &cfg.asset_url(css), "text/css", "body{}");
    }
    for js in ["js/formio.form.min.js", "js/bcgov-formio-components.use.min.js"] {
        t.route_text(Method::Get, &cfg.asset_url(js), "application/javascript", "void 0;");
    }
    t.route_text(
        Method::Get,
        &cfg.asset_url("fonts/fontawesome-webfont.woff2"),
        "font/woff2",
        "wOF2",
    );
}

/// Recording [`Renderer`].
pub(crate) struct MockRenderer {
    capability: Capability,
    data: Mutex<Map<String, Value>>,
    hooks: Mutex<Option<RendererHooks>>,
    fail_native: AtomicBool,
    set_submission_calls: AtomicUsize,
    redraws: AtomicUsize,
    destroyed: AtomicUsize,
}

impl MockRenderer {
    fn new(capability: Capability) -> Self {
        Self {
            capability,
            data: Mutex::new(Map::new()),
            hooks: Mutex::new(None),
            fail_native: AtomicBool::new(false),
            set_submission_calls: AtomicUsize::new(0),
            redraws: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
        }
    }

    pub(crate) fn native() -> Self {
        Self::new(Capability::NativeSetSubmission)
    }

    pub(crate) fn direct() -> Self {
        Self::new(Capability::DirectAssignmentOnly)
    }

    pub(crate) fn fail_set_submission(&self) {
        self.fail_native.store(true, Ordering::SeqCst);
    }

    pub(crate) fn set_submission_calls(&self) -> usize {
        self.set_submission_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn redraws(&self) -> usize {
        self.redraws.load(Ordering::SeqCst)
    }

    pub(crate) fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub(crate) fn hooks(&self) -> Option<RendererHooks> {
        self.hooks.lock().unwrap().clone()
    }
}

impl Renderer for MockRenderer {
    fn capability(&self) -> Capability {
        self.capability
    }

    fn set_submission(&self, data: &Map<String, Value>) -> Result<(), RendererError> {
        self.set_submission_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_native.load(Ordering::SeqCst) {
            return Err(RendererError::SetSubmission {
                reason: "engine not ready".to_string(),
            });
        }
        *self.data.lock().unwrap() = data.clone();
        Ok(())
    }

    fn data(&self) -> Map<String, Value> {
        self.data.lock().unwrap().clone()
    }

    fn set_data(&self, data: Map<String, Value>) {
        *self.data.lock().unwrap() = data;
    }

    fn redraw(&self) {
        self.redraws.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory producing [`MockRenderer`]s; never renders on its own.
pub(crate) struct MockFactory {
    capability: Capability,
    created: Mutex<Vec<Arc<MockRenderer>>>,
    options: Mutex<Vec<RendererOptions>>,
}

impl MockFactory {
    fn new(capability: Capability) -> Self {
        Self {
            capability,
            created: Mutex::new(Vec::new()),
            options: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn native() -> Self {
        Self::new(Capability::NativeSetSubmission)
    }

    pub(crate) fn direct() -> Self {
        Self::new(Capability::DirectAssignmentOnly)
    }

    pub(crate) fn created(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub(crate) fn last(&self) -> Option<Arc<MockRenderer>> {
        self.created.lock().unwrap().last().cloned()
    }

    pub(crate) fn last_options(&self) -> Option<RendererOptions> {
        self.options.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl RendererFactory for MockFactory {
    async fn create(
        &self,
        _schema: &FormSchema,
        options: &RendererOptions,
        hooks: RendererHooks,
    ) -> Result<Arc<dyn Renderer>, RendererError> {
        let renderer = Arc::new(MockRenderer::new(self.capability));
        *renderer.hooks.lock().unwrap() = Some(hooks);
        self.created.lock().unwrap().push(Arc::clone(&renderer));
        self.options.lock().unwrap().push(options.clone());
        Ok(renderer)
    }
}
