//! # Load states and the per-cycle result log.

use crate::error::FetchError;

/// Asset orchestrator state.
///
/// Variants are declared in progression order; `Error` is terminal and may be
/// entered from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Hints,
    Css,
    Js,
    Fonts,
    Ready,
    Error,
}

impl LoadState {
    /// `true` for `Ready` and `Error`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Error)
    }

    /// Whether moving from `self` to `to` respects the progression.
    pub fn can_advance_to(&self, to: LoadState) -> bool {
        match (self, to) {
            (LoadState::Error, _) => false,
            (_, LoadState::Error) => true,
            (from, to) => to > *from,
        }
    }
}

/// Outcome of one asset load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    pub asset_key: String,
    pub required: bool,
    pub used_fallback: bool,
    pub success: bool,
    /// URL actually used (`None` when satisfied without a fetch).
    pub source_url: Option<String>,
    /// Last failure, if any.
    pub error: Option<FetchError>,
}

impl LoadResult {
    pub(crate) fn ok(key: &str, required: bool, source: Option<String>, used_fallback: bool) -> Self {
        Self {
            asset_key: key.to_string(),
            required,
            used_fallback,
            success: true,
            source_url: source,
            error: None,
        }
    }

    pub(crate) fn failed(key: &str, required: bool, source: Option<String>, error: FetchError) -> Self {
        Self {
            asset_key: key.to_string(),
            required,
            used_fallback: false,
            success: false,
            source_url: source,
            error: Some(error),
        }
    }
}

/// Append-only result log keyed by asset key.
///
/// An entry is replaced only when a later result for the same key succeeds.
#[derive(Debug, Clone, Default)]
pub struct ResultLog {
    entries: Vec<LoadResult>,
}

impl ResultLog {
    /// Records `result` under its key.
    pub fn record(&mut self, result: LoadResult) {
        match self.entries.iter_mut().find(|r| r.asset_key == result.asset_key) {
            Some(existing) if result.success => *existing = result,
            Some(_) => {}
            None => self.entries.push(result),
        }
    }

    /// Result for `key`, if recorded.
    pub fn get(&self, key: &str) -> Option<&LoadResult> {
        self.entries.iter().find(|r| r.asset_key == key)
    }

    /// All results in first-recorded order.
    pub fn entries(&self) -> &[LoadResult] {
        &self.entries
    }

    /// Failed results.
    pub fn failures(&self) -> Vec<LoadResult> {
        self.entries.iter().filter(|r| !r.success).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progression_is_forward_only() {
        assert!(LoadState::Idle.can_advance_to(LoadState::Hints));
        assert!(LoadState::Css.can_advance_to(LoadState::Error));
        assert!(!LoadState::Js.can_advance_to(LoadState::Css));
        assert!(!LoadState::Error.can_advance_to(LoadState::Ready));
        assert!(LoadState::Ready.is_terminal());
    }

    #[test]
    fn log_keeps_first_failure_until_a_success() {
        let mut log = ResultLog::default();
        let e1 = FetchError::Status { status: 404 };
        let e2 = FetchError::Status { status: 500 };
        log.record(LoadResult::failed("a", true, Some("u1".into()), e1.clone()));
        log.record(LoadResult::failed("a", true, Some("u2".into()), e2));
        assert_eq!(log.get("a").unwrap().error, Some(e1));
        assert_eq!(log.len(), 1);

        log.record(LoadResult::ok("a", true, Some("u3".into()), true));
        let a = log.get("a").unwrap();
        assert!(a.success && a.used_fallback);
        assert!(log.failures().is_empty());
    }
}
