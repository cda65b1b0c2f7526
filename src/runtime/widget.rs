//! # Widget runtime.
//!
//! [`Widget`] sequences everything a form needs to appear and to submit:
//!
//! ```text
//! load()
//!   gate(Load) ── busy ──► Skipped
//!     ├─► beforeLoad        (cancelable)            ── veto ──► Canceled
//!     ├─► beforeLoadSchema  (cancelable)            ── veto ──► Canceled
//!     ├─► GET schema ─► loadSchema                  ── http error ──► error + Err
//!     ├─► ensure_assets (Hints → Css → Js → Fonts)  ── required failure ──► error + Err
//!     ├─► beforeInit        (cancelable)            ── veto ──► Canceled
//!     ├─► factory.create(schema, options, hooks)
//!     ├─► prefill load + apply, pending set_submission data
//!     └─► state = Ready
//!   gate released
//!   ready
//!
//! submit(is_final) / draft()
//!   read-only ──► Skipped
//!   gate(Submit|Draft) ── busy ──► Skipped
//!     ├─► data + submit flag
//!     ├─► beforeSubmit      (cancelable, holds awaited) ── veto ──► Canceled
//!     ├─► submit
//!     └─► POST ─► submitDone                        ── failure ──► error + Err
//! ```
//!
//! ## Rules
//! - The gate is released before `ready` or `error` is emitted and before the
//!   caller sees the result.
//! - `destroy()` never takes the gate. It cancels the current cycle; an
//!   in-flight `load()` stops at its next step with [`Outcome::Canceled`].
//! - A cycle only replaces the installed renderer once it completes; until
//!   then the previous renderer and its prefill check stay live.
//! - Internal state lives behind short critical sections that never span an
//!   `.await` nor a call into the renderer.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use crate::assets::{LoadResult, LoadState, Orchestrator, StagePlan};
use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::events::{Bus, Event, EventKind, ListenerId};
use crate::gate::{Action, Gate};
use crate::prefill::{PrefillCoordinator, PrefillRecord, apply_data};
use crate::renderer::{Capability, RenderSignal, Renderer, RendererFactory, RendererHooks, RendererOptions};
use crate::schema::FormSchema;
use crate::subscribers::Subscribe;
use crate::transport::ApiClient;

use super::builder::WidgetBuilder;
use super::outcome::Outcome;

/// Widget lifecycle, orthogonal to the action gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Uninitialized,
    Ready,
    Destroyed,
}

struct Current {
    state: WidgetState,
    // Cycle of the installed renderer; its verifier stops when this is canceled.
    token: CancellationToken,
    // Cycle of the load in flight, if any.
    cycle: CancellationToken,
    renderer: Option<Arc<dyn Renderer>>,
    capability: Option<Capability>,
    schema: Option<FormSchema>,
    prefill: Option<PrefillRecord>,
    pending: Option<Map<String, Value>>,
}

struct Inner {
    cfg: WidgetConfig,
    bus: Bus,
    gate: Gate,
    client: ApiClient,
    orchestrator: Orchestrator,
    prefill: PrefillCoordinator,
    factory: Arc<dyn RendererFactory>,
    current: Mutex<Current>,
}

/// Embeddable form widget. Cheap to clone; clones share one instance.
#[derive(Clone)]
pub struct Widget {
    inner: Arc<Inner>,
}

impl Widget {
    /// Starts building a widget for `cfg` rendered by `factory`.
    pub fn builder(cfg: WidgetConfig, factory: Arc<dyn RendererFactory>) -> WidgetBuilder {
        WidgetBuilder::new(cfg, factory)
    }

    pub(crate) fn new_internal(
        cfg: WidgetConfig,
        bus: Bus,
        client: ApiClient,
        orchestrator: Orchestrator,
        prefill: PrefillCoordinator,
        factory: Arc<dyn RendererFactory>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                bus,
                gate: Gate::new(),
                client,
                orchestrator,
                prefill,
                factory,
                current: Mutex::new(Current {
                    state: WidgetState::Uninitialized,
                    token: CancellationToken::new(),
                    cycle: CancellationToken::new(),
                    renderer: None,
                    capability: None,
                    schema: None,
                    prefill: None,
                    pending: None,
                }),
            }),
        }
    }

    /// Loads schema, assets and renderer.
    pub async fn load(&self) -> Result<Outcome<()>, WidgetError> {
        let Some(guard) = self.inner.gate.scoped(Action::Load) else {
            self.log_skip(Action::Load);
            return Ok(Outcome::Skipped);
        };
        let res = self.load_cycle().await;
        drop(guard);
        self.finish_load(res)
    }

    /// Tears down and loads again, holding the gate throughout.
    pub async fn reload(&self) -> Result<Outcome<()>, WidgetError> {
        let Some(guard) = self.inner.gate.scoped(Action::Load) else {
            self.log_skip(Action::Load);
            return Ok(Outcome::Skipped);
        };
        self.destroy();
        let res = self.load_cycle().await;
        drop(guard);
        self.finish_load(res)
    }

    /// Submits the current data. Returns the backend response body.
    pub async fn submit(&self, is_final: bool) -> Result<Outcome<Value>, WidgetError> {
        self.send(Action::Submit, is_final).await
    }

    /// Saves the current data as a draft.
    pub async fn draft(&self) -> Result<Outcome<Value>, WidgetError> {
        self.send(Action::Draft, false).await
    }

    /// Applies `data` now, or after the next load if no form is rendered yet.
    pub fn set_submission(&self, data: Map<String, Value>) {
        let (renderer, capability) = {
            let mut cur = self.current();
            match cur.renderer.clone() {
                Some(r) => (r, cur.capability.unwrap_or(Capability::DirectAssignmentOnly)),
                None => {
                    tracing::debug!("no renderer yet; deferring submission data");
                    cur.pending = Some(data);
                    return;
                }
            }
        };
        apply_data(renderer.as_ref(), capability, &data);
    }

    /// Current form data; `None` until a renderer exists.
    pub fn get_submission(&self) -> Option<Map<String, Value>> {
        let renderer = self.current().renderer.clone()?;
        Some(renderer.data())
    }

    /// Tears the renderer down and ends the current cycle. Idempotent.
    pub fn destroy(&self) {
        let renderer = {
            let mut cur = self.current();
            cur.state = WidgetState::Destroyed;
            cur.capability = None;
            cur.schema = None;
            cur.prefill = None;
            cur.pending = None;
            cur.token.cancel();
            cur.cycle.cancel();
            cur.renderer.take()
        };
        if let Some(r) = renderer {
            r.destroy();
            tracing::debug!(form = self.form_label(), "renderer destroyed");
        }
    }

    /// Registers a lifecycle listener.
    pub fn subscribe(&self, listener: Arc<dyn Subscribe>) -> ListenerId {
        self.inner.bus.subscribe(listener)
    }

    /// Removes a listener.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.bus.unsubscribe(id)
    }

    pub fn state(&self) -> WidgetState {
        self.current().state
    }

    /// Parsed schema of the current cycle.
    pub fn schema(&self) -> Option<FormSchema> {
        self.current().schema.clone()
    }

    /// Snapshot of the prefill record of the current cycle.
    pub fn prefill(&self) -> Option<PrefillRecord> {
        self.current().prefill.clone()
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.inner.cfg
    }

    /// Which action holds the gate, if any.
    pub fn busy_with(&self) -> Option<Action> {
        self.inner.gate.holder()
    }

    pub fn asset_state(&self) -> LoadState {
        self.inner.orchestrator.state()
    }

    /// Asset states visited by the last cycle.
    pub fn asset_history(&self) -> Vec<LoadState> {
        self.inner.orchestrator.history()
    }

    pub fn asset_results(&self) -> Vec<LoadResult> {
        self.inner.orchestrator.results()
    }

    async fn load_cycle(&self) -> Result<Outcome<()>, WidgetError> {
        let cfg = &self.inner.cfg;
        let bus = &self.inner.bus;
        let form_id = cfg.require_form_id()?;
        let token = self.begin_cycle();

        if !self.decide(Event::new(EventKind::BeforeLoad).with_detail(json!({ "formId": form_id }))).await {
            return Ok(Outcome::Canceled);
        }

        let schema_url = cfg.schema_url()?;
        if !self
            .decide(Event::new(EventKind::BeforeLoadSchema).with_detail(json!({ "url": schema_url.as_str() })))
            .await
        {
            return Ok(Outcome::Canceled);
        }
        let body = self.inner.client.get_json(&schema_url).await?;
        if token.is_cancelled() {
            return Ok(Outcome::Canceled);
        }
        let schema = FormSchema::from_payload(body)?;
        self.current().schema = Some(schema.clone());
        bus.publish(Event::new(EventKind::LoadSchema).with_detail(schema.to_detail()));

        let report = self
            .inner
            .orchestrator
            .ensure_assets(&StagePlan::from_config(cfg))
            .await?;
        for failed in &report.errors {
            tracing::warn!(asset = %failed.asset_key, "optional asset unavailable");
        }
        if token.is_cancelled() {
            return Ok(Outcome::Canceled);
        }

        let options = RendererOptions::from_config(cfg);
        if !self
            .decide(Event::new(EventKind::BeforeInit).with_detail(json!({ "options": options.to_value() })))
            .await
            || token.is_cancelled()
        {
            return Ok(Outcome::Canceled);
        }

        let (hooks, signal) = RendererHooks::new(bus.clone());
        let renderer = self.inner.factory.create(&schema, &options, hooks).await?;
        if token.is_cancelled() {
            renderer.destroy();
            return Ok(Outcome::Canceled);
        }
        let capability = renderer.capability();
        tracing::debug!(form = form_id, ?capability, "renderer created");

        let mut record = match cfg.submission_id.as_deref() {
            Some(id) => Some(self.inner.prefill.load(cfg, id).await),
            None => None,
        };
        if token.is_cancelled() {
            renderer.destroy();
            return Ok(Outcome::Canceled);
        }
        if let Some(rec) = record.as_mut() {
            PrefillCoordinator::apply(rec, renderer.as_ref(), capability);
        }
        let pending = self.current().pending.take();
        if let Some(data) = pending {
            apply_data(renderer.as_ref(), capability, &data);
        }

        let verify = record.as_ref().is_some_and(|r| r.data.is_some());
        let previous = {
            let mut cur = self.current();
            cur.state = WidgetState::Ready;
            cur.capability = Some(capability);
            cur.prefill = record;
            std::mem::replace(&mut cur.token, token.clone()).cancel();
            cur.renderer.replace(Arc::clone(&renderer))
        };
        if let Some(old) = previous {
            old.destroy();
        }
        if verify {
            self.schedule_verify(token, signal, renderer, capability);
        }
        Ok(Outcome::Completed(()))
    }

    async fn send(&self, action: Action, is_final: bool) -> Result<Outcome<Value>, WidgetError> {
        if self.inner.cfg.read_only {
            tracing::info!(action = action.as_str(), "widget is read-only; skipping");
            return Ok(Outcome::Skipped);
        }
        let Some(guard) = self.inner.gate.scoped(action) else {
            self.log_skip(action);
            return Ok(Outcome::Skipped);
        };
        let res = self.send_cycle(action, is_final).await;
        drop(guard);
        self.settle(res)
    }

    async fn send_cycle(&self, action: Action, is_final: bool) -> Result<Outcome<Value>, WidgetError> {
        let (renderer, token) = {
            let cur = self.current();
            (cur.renderer.clone(), cur.token.clone())
        };
        let renderer = renderer.ok_or(WidgetError::NotReady)?;

        let mut data = renderer.data();
        data.insert("submit".to_string(), Value::Bool(is_final));
        let payload = json!({ "data": data, "draft": action == Action::Draft });

        if !self
            .decide(Event::new(EventKind::BeforeSubmit).with_detail(payload.clone()))
            .await
            || token.is_cancelled()
        {
            return Ok(Outcome::Canceled);
        }
        self.inner
            .bus
            .publish(Event::new(EventKind::Submit).with_detail(payload.clone()));

        let url = self.inner.cfg.submit_url()?;
        let response = self.inner.client.post_json(&url, payload).await?;
        tracing::info!(action = action.as_str(), form = self.form_label(), "submission accepted");
        self.inner
            .bus
            .publish(Event::new(EventKind::SubmitDone).with_detail(response.clone()));
        Ok(Outcome::Completed(response))
    }

    /// Re-applies prefill once after the first render of this cycle's renderer.
    fn schedule_verify(
        &self,
        token: CancellationToken,
        mut signal: RenderSignal,
        renderer: Arc<dyn Renderer>,
        capability: Capability,
    ) {
        let widget = self.clone();
        tokio::spawn(async move {
            let rendered = tokio::select! {
                _ = token.cancelled() => false,
                rendered = signal.wait() => rendered,
            };
            if !rendered {
                return;
            }

            let Some(mut record) = widget.current().prefill.take() else {
                return;
            };
            PrefillCoordinator::verify_after_render(&mut record, renderer.as_ref(), capability);
            if !token.is_cancelled() {
                widget.current().prefill = Some(record);
            }
        });
    }

    fn finish_load(&self, res: Result<Outcome<()>, WidgetError>) -> Result<Outcome<()>, WidgetError> {
        let res = self.settle(res);
        if let Ok(Outcome::Completed(())) = &res {
            tracing::info!(form = self.form_label(), "form ready");
            self.inner.bus.publish(Event::new(EventKind::Ready));
        }
        res
    }

    fn settle<T>(&self, res: Result<Outcome<T>, WidgetError>) -> Result<Outcome<T>, WidgetError> {
        match &res {
            Err(e) => {
                tracing::warn!(label = e.as_label(), error = %e, "action failed");
                self.inner.bus.publish(Event::failure(e));
            }
            Ok(Outcome::Canceled) => tracing::info!(form = self.form_label(), "action canceled"),
            Ok(_) => {}
        }
        res
    }

    async fn decide(&self, event: Event) -> bool {
        let kind = event.kind;
        let proceed = self.inner.bus.emit_cancelable(event).await_holds().await;
        if !proceed {
            tracing::info!(event = %kind, "vetoed by listener");
        }
        proceed
    }

    // Fresh token for the load in flight. The installed renderer keeps its own
    // token until this cycle commits, so a vetoed or failed load leaves it live.
    fn begin_cycle(&self) -> CancellationToken {
        let mut cur = self.current();
        cur.cycle = CancellationToken::new();
        cur.cycle.clone()
    }

    fn log_skip(&self, action: Action) {
        tracing::info!(
            action = action.as_str(),
            holder = self.inner.gate.holder().map(|a| a.as_str()).unwrap_or("unknown"),
            "another action is running; skipping"
        );
    }

    fn form_label(&self) -> &str {
        self.inner.cfg.form_id.as_deref().unwrap_or("<none>")
    }

    fn current(&self) -> MutexGuard<'_, Current> {
        self.inner.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryScope;
    use crate::error::TransportError;
    use crate::events::Dispatch;
    use crate::subscribers::SubscriberFn;
    use crate::test_support::{MockFactory, MockTransport, serve_assets};
    use crate::transport::Method;
    use std::time::Duration;

    const BASE: &str = "https://forms.example.org/app";
    const SCHEMA: &str = "https://forms.example.org/app/webcomponents/v1/form-viewer/f-1/schema";
    const SUBMIT: &str = "https://forms.example.org/app/webcomponents/v1/form-viewer/f-1/submit";
    const PREFILL: &str = "https://forms.example.org/app/api/v1/submissions/s-1";

    struct Rig {
        widget: Widget,
        transport: Arc<MockTransport>,
        factory: Arc<MockFactory>,
        events: Arc<Mutex<Vec<EventKind>>>,
    }

    fn cfg() -> WidgetConfig {
        WidgetConfig::new(BASE, "f-1").with_api_key("secret")
    }

    fn rig_with(cfg: WidgetConfig, factory: MockFactory) -> Rig {
        let transport = Arc::new(MockTransport::new());
        serve_assets(&transport, &cfg);
        transport.route_json(
            Method::Get,
            SCHEMA,
            json!({ "form": { "name": "intake" }, "schema": { "components": [] } }),
        );
        transport.route_json(Method::Post, SUBMIT, json!({ "id": "sub-1" }));

        let factory = Arc::new(factory);
        let events = Arc::new(Mutex::new(Vec::new()));
        let e = events.clone();
        let recorder: Arc<dyn Subscribe> = SubscriberFn::arc("recorder", move |ctx: &mut Dispatch<'_>| {
            e.lock().unwrap().push(ctx.event().kind);
        });
        let widget = Widget::builder(cfg, factory.clone())
            .with_transport(transport.clone())
            .with_scope(Arc::new(MemoryScope::new()))
            .with_subscribers(vec![recorder])
            .build()
            .unwrap();
        Rig {
            widget,
            transport,
            factory,
            events,
        }
    }

    fn rig() -> Rig {
        rig_with(cfg(), MockFactory::direct())
    }

    fn count(events: &Mutex<Vec<EventKind>>, kind: EventKind) -> usize {
        events.lock().unwrap().iter().filter(|k| **k == kind).count()
    }

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn load_runs_every_phase_and_fires_ready_once() {
        let r = rig();
        assert!(r.widget.get_submission().is_none());

        assert_eq!(r.widget.load().await.unwrap(), Outcome::Completed(()));
        assert_eq!(r.widget.state(), WidgetState::Ready);
        assert!(r.widget.get_submission().is_some());
        assert_eq!(r.widget.asset_state(), LoadState::Ready);
        assert!(r.widget.busy_with().is_none());
        assert_eq!(r.widget.schema().unwrap().name(), Some("intake"));

        let events = r.events.lock().unwrap().clone();
        let phases: Vec<_> = events
            .iter()
            .copied()
            .filter(|k| *k != EventKind::AssetStateChange)
            .collect();
        assert_eq!(
            phases,
            vec![
                EventKind::BeforeLoad,
                EventKind::BeforeLoadSchema,
                EventKind::LoadSchema,
                EventKind::BeforeInit,
                EventKind::Ready,
            ]
        );
        assert_eq!(count(&r.events, EventKind::AssetStateChange), 5);
        assert_eq!(count(&r.events, EventKind::Ready), 1);
        assert_eq!(r.factory.created(), 1);
    }

    #[tokio::test]
    async fn renderer_receives_resolved_options() {
        let mut c = cfg();
        c.language = Some("fr".into());
        c.renderer_options.insert("noAlerts".into(), json!(true));
        let r = rig_with(c, MockFactory::direct());
        r.widget.load().await.unwrap();

        let opts = r.factory.last_options().unwrap();
        assert_eq!(opts.language.as_deref(), Some("fr"));
        assert_eq!(opts.extra["noAlerts"], json!(true));
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_loads_fetch_schema_once() {
        let r = rig();
        r.transport.delay(Duration::from_millis(50));

        let (a, b) = tokio::join!(r.widget.load(), r.widget.load());
        assert_eq!(a.unwrap(), Outcome::Completed(()));
        assert_eq!(b.unwrap(), Outcome::Skipped);
        assert_eq!(r.transport.count(Method::Get, SCHEMA), 1);
        assert_eq!(count(&r.events, EventKind::Ready), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_during_pending_load_is_skipped() {
        let r = rig();
        r.transport.delay(Duration::from_millis(50));

        let w = r.widget.clone();
        let (load, submit) = tokio::join!(r.widget.load(), async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            w.submit(true).await
        });
        assert!(load.unwrap().is_completed());
        assert_eq!(submit.unwrap(), Outcome::Skipped);
        assert_eq!(r.transport.count(Method::Post, SUBMIT), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reload_holds_gate_against_load_and_submit() {
        let r = rig();
        r.widget.load().await.unwrap();
        r.transport.delay_route(Method::Get, SCHEMA, Duration::from_millis(50));

        let w = r.widget.clone();
        let (reload, (load, submit)) = tokio::join!(r.widget.reload(), async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(w.busy_with(), Some(Action::Load));
            (w.load().await, w.submit(true).await)
        });
        assert!(reload.unwrap().is_completed());
        assert_eq!(load.unwrap(), Outcome::Skipped);
        assert_eq!(submit.unwrap(), Outcome::Skipped);
        assert_eq!(r.transport.count(Method::Get, SCHEMA), 2);
        assert_eq!(r.transport.count(Method::Post, SUBMIT), 0);
        assert_eq!(r.factory.created(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reload_during_load_is_skipped() {
        let r = rig();
        r.transport.delay_route(Method::Get, SCHEMA, Duration::from_millis(50));

        let w = r.widget.clone();
        let (load, reload) = tokio::join!(r.widget.load(), async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            w.reload().await
        });
        assert!(load.unwrap().is_completed());
        assert_eq!(reload.unwrap(), Outcome::Skipped);
        assert_eq!(r.factory.created(), 1);
        assert_eq!(r.factory.last().unwrap().destroyed(), 0);
        assert_eq!(r.widget.state(), WidgetState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_schema_request_times_out_and_frees_gate() {
        let mut c = cfg();
        c.request_timeout = Duration::from_secs(5);
        let r = rig_with(c, MockFactory::direct());
        r.transport.delay_route(Method::Get, SCHEMA, Duration::from_secs(3600));

        let err = r.widget.load().await.unwrap_err();
        assert!(matches!(err, WidgetError::Transport(TransportError::Timeout { .. })));
        assert!(r.widget.busy_with().is_none());
        assert_eq!(count(&r.events, EventKind::Error), 1);
        assert_eq!(r.factory.created(), 0);

        // the gate is free again: submit reaches its own checks
        assert!(matches!(r.widget.submit(true).await, Err(WidgetError::NotReady)));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_submit_times_out() {
        let mut c = cfg();
        c.request_timeout = Duration::from_secs(5);
        let r = rig_with(c, MockFactory::direct());
        r.widget.load().await.unwrap();
        r.transport.delay_route(Method::Post, SUBMIT, Duration::from_secs(3600));

        let err = r.widget.submit(true).await.unwrap_err();
        assert_eq!(err.as_label(), "widget_transport");
        assert_eq!(count(&r.events, EventKind::SubmitDone), 0);
        assert!(r.widget.busy_with().is_none());
    }

    #[tokio::test]
    async fn submit_posts_data_with_flag() {
        let r = rig();
        r.widget.load().await.unwrap();
        r.widget.set_submission(map(json!({ "name": "Ada" })));

        let out = r.widget.submit(true).await.unwrap();
        assert_eq!(out, Outcome::Completed(json!({ "id": "sub-1" })));

        let post = r
            .transport
            .requests()
            .into_iter()
            .find(|q| q.method == Method::Post)
            .unwrap();
        assert!(post.header("Authorization").is_some());
        let body = post.body.unwrap();
        assert_eq!(body["data"]["name"], json!("Ada"));
        assert_eq!(body["data"]["submit"], json!(true));
        assert_eq!(body["draft"], json!(false));

        let events = r.events.lock().unwrap().clone();
        let tail: Vec<_> = events.iter().rev().take(3).rev().copied().collect();
        assert_eq!(tail, vec![EventKind::BeforeSubmit, EventKind::Submit, EventKind::SubmitDone]);
    }

    #[tokio::test]
    async fn draft_marks_payload() {
        let r = rig();
        r.widget.load().await.unwrap();
        assert!(r.widget.draft().await.unwrap().is_completed());

        let body = r.transport.requests().into_iter().find(|q| q.method == Method::Post).unwrap().body.unwrap();
        assert_eq!(body["draft"], json!(true));
        assert_eq!(body["data"]["submit"], json!(false));
    }

    #[tokio::test]
    async fn false_hold_blocks_post() {
        let r = rig();
        r.widget.load().await.unwrap();
        r.widget.subscribe(SubscriberFn::on(EventKind::BeforeSubmit, "deny", |ctx: &mut Dispatch<'_>| {
            ctx.wait_until(async { false });
        }));

        assert_eq!(r.widget.submit(true).await.unwrap(), Outcome::Canceled);
        assert_eq!(r.transport.count(Method::Post, SUBMIT), 0);
        assert_eq!(count(&r.events, EventKind::Submit), 0);
        assert!(r.widget.busy_with().is_none());
    }

    #[tokio::test]
    async fn vetoed_load_makes_no_requests() {
        let r = rig();
        r.widget.subscribe(SubscriberFn::on(EventKind::BeforeLoad, "veto", |ctx: &mut Dispatch<'_>| {
            ctx.prevent_default();
        }));

        assert_eq!(r.widget.load().await.unwrap(), Outcome::Canceled);
        assert!(r.transport.requests().is_empty());
        assert_eq!(r.widget.state(), WidgetState::Uninitialized);
        assert!(r.widget.busy_with().is_none());
    }

    #[tokio::test]
    async fn vetoed_init_creates_no_renderer() {
        let r = rig();
        r.widget.subscribe(SubscriberFn::on(EventKind::BeforeInit, "veto", |ctx: &mut Dispatch<'_>| {
            ctx.prevent_default();
        }));
        assert_eq!(r.widget.load().await.unwrap(), Outcome::Canceled);
        assert_eq!(r.factory.created(), 0);
        assert_eq!(r.widget.asset_state(), LoadState::Ready);
    }

    #[tokio::test]
    async fn schema_http_error_is_reported_and_releases_gate() {
        let r = rig();
        r.transport.route_status(Method::Get, SCHEMA, 404);

        let err = r.widget.load().await.unwrap_err();
        assert!(matches!(err, WidgetError::Http { status: 404, .. }));
        assert_eq!(count(&r.events, EventKind::Error), 1);
        assert_eq!(count(&r.events, EventKind::Ready), 0);
        assert!(r.widget.busy_with().is_none());
        assert_eq!(r.factory.created(), 0);
    }

    #[tokio::test]
    async fn missing_form_id_is_a_config_error() {
        let mut c = cfg();
        c.form_id = None;
        let r = rig_with(c, MockFactory::direct());

        let err = r.widget.load().await.unwrap_err();
        assert_eq!(err.as_label(), "widget_config");
        assert!(r.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn required_asset_failure_aborts_load() {
        let r = rig();
        r.transport.route_status(Method::Get, &cfg().asset_url("js/bcgov-formio-components.use.min.js"), 500);

        let err = r.widget.load().await.unwrap_err();
        assert!(matches!(err, WidgetError::Asset { .. }));
        assert_eq!(r.widget.asset_state(), LoadState::Error);
        assert_eq!(count(&r.events, EventKind::Error), 1);
        assert_eq!(r.factory.created(), 0);
    }

    #[tokio::test]
    async fn submit_without_renderer_fails() {
        let r = rig();
        let err = r.widget.submit(true).await.unwrap_err();
        assert!(matches!(err, WidgetError::NotReady));
        assert_eq!(count(&r.events, EventKind::Error), 1);
        assert!(r.widget.busy_with().is_none());
    }

    #[tokio::test]
    async fn read_only_skips_submit() {
        let mut c = cfg();
        c.read_only = true;
        let r = rig_with(c, MockFactory::direct());
        r.widget.load().await.unwrap();

        assert_eq!(r.widget.submit(true).await.unwrap(), Outcome::Skipped);
        assert_eq!(r.widget.draft().await.unwrap(), Outcome::Skipped);
        assert_eq!(r.transport.count(Method::Post, SUBMIT), 0);
        assert!(r.factory.last_options().unwrap().read_only);
    }

    #[tokio::test]
    async fn pending_submission_is_applied_after_load() {
        let r = rig();
        r.widget.set_submission(map(json!({ "email": "a@b.c" })));
        assert!(r.widget.get_submission().is_none());

        r.widget.load().await.unwrap();
        assert_eq!(r.widget.get_submission().unwrap()["email"], json!("a@b.c"));
    }

    #[tokio::test]
    async fn prefill_is_applied_and_verified_after_render() {
        let r = rig_with(cfg().with_submission("s-1"), MockFactory::direct());
        r.transport.route_json(
            Method::Get,
            PREFILL,
            json!({ "submission": { "submission": { "data": { "name": "Ada" } } } }),
        );

        r.widget.load().await.unwrap();
        let renderer = r.factory.last().unwrap();
        assert_eq!(renderer.data()["name"], json!("Ada"));
        assert_eq!(renderer.redraws(), 1);
        assert!(r.widget.prefill().unwrap().applied);

        // renderer drops the data during its first render
        renderer.set_data(Map::new());
        renderer.hooks().unwrap().rendered();

        tokio::time::timeout(Duration::from_secs(1), async {
            while renderer.redraws() < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(renderer.data()["name"], json!("Ada"));

        // later renders never trigger another retry
        tokio::task::yield_now().await;
        renderer.hooks().unwrap().rendered();
        tokio::task::yield_now().await;
        assert_eq!(renderer.redraws(), 2);
        assert!(r.widget.prefill().unwrap().retry_scheduled);
    }

    #[tokio::test]
    async fn vetoed_second_load_keeps_prefill_check_alive() {
        let r = rig_with(cfg().with_submission("s-1"), MockFactory::direct());
        r.transport.route_json(Method::Get, PREFILL, json!({ "data": { "name": "Ada" } }));
        r.widget.load().await.unwrap();
        let renderer = r.factory.last().unwrap();
        assert_eq!(renderer.redraws(), 1);

        r.widget.subscribe(SubscriberFn::on(EventKind::BeforeLoad, "veto", |ctx: &mut Dispatch<'_>| {
            ctx.prevent_default();
        }));
        assert_eq!(r.widget.load().await.unwrap(), Outcome::Canceled);
        assert_eq!(r.widget.state(), WidgetState::Ready);

        renderer.set_data(Map::new());
        renderer.hooks().unwrap().rendered();
        tokio::time::timeout(Duration::from_secs(1), async {
            while renderer.redraws() < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(renderer.data()["name"], json!("Ada"));
        assert_eq!(renderer.destroyed(), 0);
    }

    #[tokio::test]
    async fn failed_prefill_does_not_fail_load() {
        let r = rig_with(cfg().with_submission("s-1"), MockFactory::native());
        r.transport.route_status(Method::Get, PREFILL, 500);

        assert!(r.widget.load().await.unwrap().is_completed());
        assert_eq!(r.widget.prefill().unwrap().data, None);
        assert_eq!(r.factory.last().unwrap().set_submission_calls(), 0);
    }

    #[tokio::test]
    async fn destroy_is_idempotent() {
        let r = rig();
        r.widget.load().await.unwrap();
        let renderer = r.factory.last().unwrap();

        r.widget.destroy();
        r.widget.destroy();
        assert_eq!(renderer.destroyed(), 1);
        assert_eq!(r.widget.state(), WidgetState::Destroyed);
        assert!(r.widget.get_submission().is_none());

        assert!(r.widget.load().await.unwrap().is_completed());
        assert_eq!(r.widget.state(), WidgetState::Ready);
    }

    #[tokio::test]
    async fn destroy_during_load_cancels_it() {
        let r = rig();
        let w = r.widget.clone();
        r.widget.subscribe(SubscriberFn::on(EventKind::LoadSchema, "destroyer", move |_ctx: &mut Dispatch<'_>| {
            w.destroy();
        }));

        assert_eq!(r.widget.load().await.unwrap(), Outcome::Canceled);
        assert_eq!(r.factory.created(), 0);
        assert_eq!(r.widget.state(), WidgetState::Destroyed);
        assert_eq!(count(&r.events, EventKind::Ready), 0);
    }

    #[tokio::test]
    async fn reload_replaces_renderer() {
        let r = rig();
        r.widget.load().await.unwrap();
        let first = r.factory.last().unwrap();

        assert!(r.widget.reload().await.unwrap().is_completed());
        assert_eq!(first.destroyed(), 1);
        assert_eq!(r.factory.created(), 2);
        assert_eq!(r.transport.count(Method::Get, SCHEMA), 2);
        assert_eq!(count(&r.events, EventKind::Ready), 2);
    }

    #[tokio::test]
    async fn renderer_events_reach_listeners() {
        let r = rig();
        r.widget.load().await.unwrap();
        let hooks = r.factory.last().unwrap().hooks().unwrap();
        hooks.changed(json!({ "changed": "name" }));
        hooks.rendered();

        assert_eq!(count(&r.events, EventKind::Change), 1);
        assert_eq!(count(&r.events, EventKind::Render), 1);
    }
}
