//! # LogWriter: lifecycle event printer
//!
//! A minimal listener that writes every [`Event`](crate::Event) to `tracing`.
//! Use it for demos or while integrating a host page.
//!
//! ## Example output
//! ```text
//! INFO formview: [beforeLoad] seq=0
//! INFO formview: [asset-state] from=Idle to=Hints results=0
//! WARN formview: [error] err="status 404 from https://.../schema"
//! INFO formview: [ready] seq=9
//! ```

use crate::events::{Dispatch, EventKind};
use crate::subscribers::Subscribe;

/// Event writer listener.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, ctx: &mut Dispatch<'_>) {
        let e = ctx.event();
        match e.kind {
            EventKind::AssetStateChange => {
                if let Some(t) = &e.transition {
                    tracing::info!(
                        "[asset-state] from={:?} to={:?} results={}",
                        t.from,
                        t.to,
                        t.results.len()
                    );
                }
            }
            EventKind::Error => {
                tracing::warn!("[error] err={:?}", e.error.as_deref().unwrap_or("unknown"));
            }
            EventKind::Change => {
                tracing::debug!("[change] seq={}", e.seq);
            }
            kind => {
                tracing::info!("[{kind}] seq={}", e.seq);
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
