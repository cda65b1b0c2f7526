//! # Prefill from a prior submission.
//!
//! ```text
//! load(id) ──► GET read-submission ──► extract data ──► PrefillRecord
//!                    │ any failure
//!                    ▼
//!              PrefillRecord { data: None }   (load continues without prefill)
//!
//! apply(renderer)
//!   NativeSetSubmission   ─► set_submission(data) ──Err──► direct assignment
//!   DirectAssignmentOnly  ─► direct assignment
//!
//! direct assignment: current data ⊕ prefill data ─► set_data ─► redraw
//!
//! verify_after_render(renderer)   (once, after the first render)
//!   some key matches ─► done
//!   no key matches   ─► apply once more
//! ```

use serde_json::{Map, Value};

use crate::config::WidgetConfig;
use crate::renderer::{Capability, Renderer};
use crate::transport::ApiClient;

/// Prefill state for one load cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrefillRecord {
    /// Data fetched from the prior submission; `None` on any failure.
    pub data: Option<Map<String, Value>>,
    /// At least one apply reached the renderer.
    pub applied: bool,
    /// The post-render check has been consumed.
    pub retry_scheduled: bool,
}

impl PrefillRecord {
    /// Wraps data supplied directly by the host.
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }
}

/// Fetches, applies and verifies prefill data.
#[derive(Clone)]
pub struct PrefillCoordinator {
    client: ApiClient,
}

impl PrefillCoordinator {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetches the prior submission `submission_id`.
    pub async fn load(&self, cfg: &WidgetConfig, submission_id: &str) -> PrefillRecord {
        let url = match cfg.submission_url(submission_id) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(submission = submission_id, error = %e, "invalid prefill url; skipping prefill");
                return PrefillRecord::default();
            }
        };

        match self.client.get_json(&url).await {
            Ok(body) => {
                let data = extract_data(&body);
                if data.is_none() {
                    tracing::warn!(submission = submission_id, "prefill response has no data object");
                }
                PrefillRecord {
                    data,
                    ..PrefillRecord::default()
                }
            }
            Err(e) => {
                tracing::warn!(submission = submission_id, error = %e, "prefill fetch failed; continuing without it");
                PrefillRecord::default()
            }
        }
    }

    /// Applies `record` to `renderer`. Returns `false` when there is nothing to apply.
    pub fn apply(record: &mut PrefillRecord, renderer: &dyn Renderer, capability: Capability) -> bool {
        let Some(data) = record.data.as_ref() else {
            return false;
        };
        apply_data(renderer, capability, data);
        record.applied = true;
        true
    }

    /// Post-render check; re-applies at most once per record.
    ///
    /// Returns `true` if a re-apply happened.
    pub fn verify_after_render(
        record: &mut PrefillRecord,
        renderer: &dyn Renderer,
        capability: Capability,
    ) -> bool {
        if record.retry_scheduled {
            return false;
        }
        record.retry_scheduled = true;

        let Some(data) = record.data.as_ref() else {
            return false;
        };
        if data.is_empty() {
            return false;
        }
        let current = renderer.data();
        if data.iter().any(|(k, v)| current.get(k) == Some(v)) {
            return false;
        }

        tracing::info!("prefill not visible after first render; re-applying once");
        Self::apply(record, renderer, capability)
    }
}

/// Applies `data` using the strategy `capability` allows.
pub(crate) fn apply_data(renderer: &dyn Renderer, capability: Capability, data: &Map<String, Value>) {
    if capability == Capability::NativeSetSubmission {
        match renderer.set_submission(data) {
            Ok(()) => return,
            Err(e) => {
                tracing::warn!(error = %e, "native set-submission failed; assigning data directly");
            }
        }
    }
    let mut current = renderer.data();
    for (k, v) in data {
        current.insert(k.clone(), v.clone());
    }
    renderer.set_data(current);
    renderer.redraw();
}

// Accepts `{submission: {submission: {data}}}`, `{submission: {data}}` or `{data}`.
fn extract_data(body: &Value) -> Option<Map<String, Value>> {
    let candidates = [
        body.pointer("/submission/submission/data"),
        body.pointer("/submission/data"),
        body.get("data"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_object)
        .cloned()
}
