//! # Demo: embed
//!
//! Loads a form against a live backend with a headless renderer and submits it.
//!
//! Shows how to:
//! - Configure a widget from declarative attributes.
//! - Implement [`Renderer`] / [`RendererFactory`] for a host engine.
//! - Hold `beforeSubmit` with an async decision.
//! - Attach the built-in [`LogWriter`].
//!
//! ## Flow
//! ```text
//! WidgetConfig::from_attributes ──► Widget::builder(..).build()
//!     ├─► load()   ── beforeLoad … assetStateChange … ready
//!     ├─► set_submission({...})
//!     └─► submit(true)
//!           ├─► beforeSubmit ──► wait_until(confirm) ──► true
//!           ├─► submit
//!           └─► POST ──► submitDone
//! ```
//!
//! ## Run
//! ```bash
//! FORM_ID=... API_KEY=... BASE_URL=https://forms.example.org/app \
//!   cargo run --example embed --features logging
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use formview::{
    Capability, Dispatch, EventKind, FormSchema, LogWriter, MemoryScope, Outcome, Renderer,
    RendererError, RendererFactory, RendererHooks, RendererOptions, Subscribe, SubscriberFn, Widget,
    WidgetConfig,
};
use serde_json::{Map, Value, json};

/// Keeps form data in memory and reports a single render pass.
struct HeadlessRenderer {
    data: Mutex<Map<String, Value>>,
    hooks: RendererHooks,
}

impl Renderer for HeadlessRenderer {
    fn capability(&self) -> Capability {
        Capability::NativeSetSubmission
    }

    fn set_submission(&self, data: &Map<String, Value>) -> Result<(), RendererError> {
        *self.data.lock().unwrap_or_else(|e| e.into_inner()) = data.clone();
        self.hooks.changed(json!({ "source": "setSubmission" }));
        Ok(())
    }

    fn data(&self) -> Map<String, Value> {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_data(&self, data: Map<String, Value>) {
        *self.data.lock().unwrap_or_else(|e| e.into_inner()) = data;
    }

    fn redraw(&self) {
        self.hooks.rendered();
    }

    fn destroy(&self) {}
}

struct HeadlessFactory;

#[async_trait]
impl RendererFactory for HeadlessFactory {
    async fn create(
        &self,
        schema: &FormSchema,
        options: &RendererOptions,
        hooks: RendererHooks,
    ) -> Result<Arc<dyn Renderer>, RendererError> {
        println!(
            "[demo] rendering '{}' (wizard={}, options={})",
            schema.name().unwrap_or("<unnamed>"),
            schema.is_wizard(),
            options.to_value()
        );
        hooks.rendered();
        Ok(Arc::new(HeadlessRenderer {
            data: Mutex::new(Map::new()),
            hooks,
        }))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let env = |name: &str| std::env::var(name).with_context(|| format!("{name} is not set"));
    let cfg = WidgetConfig::from_attributes([
        ("base-url", env("BASE_URL")?),
        ("form-id", env("FORM_ID")?),
        ("api-key", env("API_KEY")?),
        ("language", "en".to_string()),
        ("no-font-preload", String::new()),
    ]);

    let log: Arc<dyn Subscribe> = Arc::new(LogWriter::new());
    let widget = Widget::builder(cfg, Arc::new(HeadlessFactory))
        .with_scope(Arc::new(MemoryScope::new()))
        .with_subscribers(vec![log])
        .build()?;

    widget.subscribe(SubscriberFn::on(
        EventKind::BeforeSubmit,
        "confirm",
        |ctx: &mut Dispatch<'_>| {
            ctx.wait_until(async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                true
            });
        },
    ));

    match widget.load().await? {
        Outcome::Completed(()) => {}
        other => anyhow::bail!("load did not complete: {other:?}"),
    }
    for r in widget.asset_results() {
        println!("[demo] asset {} ok={} fallback={}", r.asset_key, r.success, r.used_fallback);
    }

    let mut data = Map::new();
    data.insert("applicantName".into(), json!("Ada Lovelace"));
    widget.set_submission(data);

    let response = widget.submit(true).await?;
    println!("[demo] submit: {response:?}");

    widget.destroy();
    Ok(())
}
