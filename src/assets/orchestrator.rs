//! # Staged asset loading.
//!
//! [`Orchestrator::ensure_assets`] drives the fixed stage machine and reports
//! every transition on the bus as [`EventKind::AssetStateChange`].
//!
//! ## Lifecycle
//! ```text
//! reset: state = Idle, log cleared, registry cycle cleared
//!
//! Idle ──► Hints ──► Css ──► Js ──► Fonts ──► Ready
//!            │         │       │       │
//!       best-effort    │       │   best-effort
//!                      ▼       ▼
//!              required failure ──► Error (terminal) ──► Err(WidgetError::Asset)
//! ```
//!
//! ## Rules
//! - Stages run strictly in order; assets within a stage run in declared order.
//! - Optional failures are recorded and returned; `Ready` is still reached.
//! - Required failures stop the sequence immediately.
//! - Callers serialize cycles through the gate; concurrent cycles on one
//!   orchestrator are not supported.

use std::sync::{Arc, Mutex};

use super::catalog::{
    ICONS_CSS, ICONS_INHERIT, ICONS_NEUTRALIZE, INHERIT_ICON_COLOR_CSS, NEUTRALIZE_ICONS_CSS, StagePlan,
};
use super::descriptor::AssetDescriptor;
use super::fetcher::AssetFetcher;
use super::registry::ResourceRegistry;
use super::state::{LoadResult, LoadState, ResultLog};
use crate::error::WidgetError;
use crate::events::{Bus, Event, EventKind};

/// Summary of a completed cycle.
#[derive(Debug, Clone)]
pub struct AssetReport {
    /// `true` once `Ready` was reached.
    pub success: bool,
    /// Optional assets that failed.
    pub errors: Vec<LoadResult>,
}

#[derive(Debug, Default)]
struct Progress {
    state: LoadState,
    log: ResultLog,
    history: Vec<LoadState>,
}

/// Drives the stage machine for one widget.
pub struct Orchestrator {
    fetcher: AssetFetcher,
    registry: Arc<ResourceRegistry>,
    bus: Bus,
    progress: Mutex<Progress>,
}

impl Orchestrator {
    pub fn new(fetcher: AssetFetcher, registry: Arc<ResourceRegistry>, bus: Bus) -> Self {
        Self {
            fetcher,
            registry,
            bus,
            progress: Mutex::new(Progress::default()),
        }
    }

    /// Runs one full cycle over `plan`.
    pub async fn ensure_assets(&self, plan: &StagePlan) -> Result<AssetReport, WidgetError> {
        self.reset();

        self.advance(LoadState::Hints);
        for d in &plan.hints {
            let r = self.fetcher.load(d).await;
            self.record(r);
        }

        self.advance(LoadState::Css);
        self.run_stage(&plan.css).await?;

        self.advance(LoadState::Js);
        self.run_stage(&plan.js).await?;

        self.advance(LoadState::Fonts);
        self.fonts(plan).await;

        self.advance(LoadState::Ready);
        Ok(AssetReport {
            success: true,
            errors: self.progress().log.failures(),
        })
    }

    /// Current state.
    pub fn state(&self) -> LoadState {
        self.progress().state
    }

    /// States entered since the last reset, in order.
    pub fn history(&self) -> Vec<LoadState> {
        self.progress().history.clone()
    }

    /// Snapshot of the result log.
    pub fn results(&self) -> Vec<LoadResult> {
        self.progress().log.entries().to_vec()
    }

    async fn run_stage(&self, assets: &[AssetDescriptor]) -> Result<(), WidgetError> {
        for d in assets {
            let r = self.fetcher.load(d).await;
            let fatal = d.required && !r.success;
            let reason = r
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            self.record(r);

            if fatal {
                tracing::warn!(asset = %d.key, %reason, "required asset failed; aborting load");
                self.advance(LoadState::Error);
                return Err(WidgetError::Asset {
                    key: d.key.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }

    async fn fonts(&self, plan: &StagePlan) {
        let icons_loaded = plan.icons_enabled
            && self
                .progress()
                .log
                .get(ICONS_CSS)
                .is_some_and(|r| r.success);

        let rule = if icons_loaded {
            self.fetcher.inline_style(ICONS_INHERIT, INHERIT_ICON_COLOR_CSS)
        } else {
            self.fetcher.inline_style(ICONS_NEUTRALIZE, NEUTRALIZE_ICONS_CSS)
        };
        self.record(rule);

        if let Some(d) = &plan.font_preload {
            if icons_loaded {
                let r = self.fetcher.load(d).await;
                self.record(r);
            }
        }
    }

    fn reset(&self) {
        self.registry.reset();
        let mut p = self.progress();
        p.state = LoadState::Idle;
        p.log.clear();
        p.history.clear();
    }

    fn record(&self, result: LoadResult) {
        self.progress().log.record(result);
    }

    fn advance(&self, to: LoadState) {
        let (from, results) = {
            let mut p = self.progress();
            let from = p.state;
            if !from.can_advance_to(to) {
                tracing::warn!(?from, ?to, "ignoring backward asset state transition");
                return;
            }
            p.state = to;
            p.history.push(to);
            (from, p.log.entries().to_vec())
        };

        tracing::debug!(?from, ?to, "asset state");
        self.bus.publish(
            Event::new(EventKind::AssetStateChange).with_transition(from, to, results.into()),
        );
    }

    fn progress(&self) -> std::sync::MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::catalog::{COMPONENTS_JS, FORMIO_JS, MAIN_CSS, THEME_CSS};
    use crate::assets::scope::{MemoryScope, ResourceKind, Scope};
    use crate::config::WidgetConfig;
    use crate::events::Dispatch;
    use crate::subscribers::SubscriberFn;
    use crate::test_support::{MockTransport, serve_assets};
    use crate::transport::{Credentials, Method};
    use std::time::Duration;

    const BASE: &str = "https://forms.example.org/app";

    struct Rig {
        orch: Orchestrator,
        transport: Arc<MockTransport>,
        scope: Arc<MemoryScope>,
        transitions: Arc<Mutex<Vec<(LoadState, LoadState)>>>,
        plan: StagePlan,
    }

    fn rig(cfg: WidgetConfig) -> Rig {
        let transport = Arc::new(MockTransport::new());
        let scope = Arc::new(MemoryScope::new());
        let registry = Arc::new(ResourceRegistry::new(scope.clone()));
        let fetcher = AssetFetcher::new(
            transport.clone(),
            Credentials::from_config(&cfg).unwrap(),
            registry.clone(),
            Duration::from_millis(500),
        );
        let bus = Bus::new();
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let t = transitions.clone();
        bus.subscribe(SubscriberFn::on(
            EventKind::AssetStateChange,
            "transitions",
            move |ctx: &mut Dispatch<'_>| {
                if let Some(tr) = &ctx.event().transition {
                    t.lock().unwrap().push((tr.from, tr.to));
                }
            },
        ));
        Rig {
            orch: Orchestrator::new(fetcher, registry, bus),
            transport,
            scope,
            transitions,
            plan: StagePlan::from_config(&cfg),
        }
    }

    fn cfg() -> WidgetConfig {
        WidgetConfig::new(BASE, "f-1")
    }

    #[tokio::test]
    async fn all_stages_visited_in_order() {
        let r = rig(cfg());
        serve_assets(&r.transport, &cfg());

        let report = r.orch.ensure_assets(&r.plan).await.unwrap();
        assert!(report.success);
        assert!(report.errors.is_empty());
        assert_eq!(
            r.orch.history(),
            vec![LoadState::Hints, LoadState::Css, LoadState::Js, LoadState::Fonts, LoadState::Ready]
        );
        assert_eq!(
            *r.transitions.lock().unwrap(),
            vec![
                (LoadState::Idle, LoadState::Hints),
                (LoadState::Hints, LoadState::Css),
                (LoadState::Css, LoadState::Js),
                (LoadState::Js, LoadState::Fonts),
                (LoadState::Fonts, LoadState::Ready),
            ]
        );
        assert!(r.scope.contains(ICONS_INHERIT));
        assert!(r.scope.has_global("Formio"));
        assert_eq!(r.scope.count(ResourceKind::Font), 1);
    }

    #[tokio::test]
    async fn optional_failure_still_reaches_ready() {
        let r = rig(cfg());
        serve_assets(&r.transport, &cfg());
        r.transport
            .route_status(Method::Get, &cfg().asset_url("css/theme.css"), 500);

        let report = r.orch.ensure_assets(&r.plan).await.unwrap();
        assert!(report.success);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].asset_key, THEME_CSS);
        assert_eq!(r.orch.state(), LoadState::Ready);
        assert_eq!(r.orch.history().len(), 5);
    }

    #[tokio::test]
    async fn required_failure_ends_in_error() {
        let r = rig(cfg());
        serve_assets(&r.transport, &cfg());
        r.transport.route_status(Method::Get, &cfg().asset_url("js/formio.form.min.js"), 500);
        r.transport
            .route_status(Method::Get, "https://cdn.form.io/formiojs/formio.form.min.js", 502);

        let err = r.orch.ensure_assets(&r.plan).await.unwrap_err();
        match err {
            WidgetError::Asset { key, .. } => assert_eq!(key, FORMIO_JS),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(r.orch.state(), LoadState::Error);
        assert_eq!(
            r.orch.history(),
            vec![LoadState::Hints, LoadState::Css, LoadState::Js, LoadState::Error]
        );
        // components script is never attempted after the renderer failed
        assert_eq!(
            r.transport.count(Method::Get, &cfg().asset_url("js/bcgov-formio-components.use.min.js")),
            0
        );
    }

    #[tokio::test]
    async fn critical_css_failure_stops_before_js() {
        let r = rig(cfg());
        serve_assets(&r.transport, &cfg());
        r.transport.route_status(Method::Get, &cfg().asset_url("css/form-viewer.css"), 404);

        let err = r.orch.ensure_assets(&r.plan).await.unwrap_err();
        assert!(matches!(err, WidgetError::Asset { ref key, .. } if key == MAIN_CSS));
        assert!(!r.orch.history().contains(&LoadState::Js));
    }

    #[tokio::test]
    async fn components_without_fallback_is_fatal() {
        let r = rig(cfg());
        serve_assets(&r.transport, &cfg());
        r.transport.route_status(
            Method::Get,
            &cfg().asset_url("js/bcgov-formio-components.use.min.js"),
            404,
        );
        let err = r.orch.ensure_assets(&r.plan).await.unwrap_err();
        assert!(matches!(err, WidgetError::Asset { ref key, .. } if key == COMPONENTS_JS));
    }

    #[tokio::test]
    async fn disabled_icons_get_neutralized() {
        let mut c = cfg();
        c.assets.icons = false;
        let r = rig(c.clone());
        serve_assets(&r.transport, &c);

        r.orch.ensure_assets(&r.plan).await.unwrap();
        assert!(r.scope.contains(ICONS_NEUTRALIZE));
        assert!(!r.scope.contains(ICONS_INHERIT));
        assert_eq!(r.scope.count(ResourceKind::Font), 0);
    }

    #[tokio::test]
    async fn second_cycle_does_not_refetch() {
        let r = rig(cfg());
        serve_assets(&r.transport, &cfg());
        r.orch.ensure_assets(&r.plan).await.unwrap();
        let first = r.transport.requests().len();

        r.orch.ensure_assets(&r.plan).await.unwrap();
        assert_eq!(r.transport.requests().len(), first);
        assert_eq!(r.orch.state(), LoadState::Ready);
    }
}
