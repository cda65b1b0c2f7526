//! # Asset descriptors.
//!
//! An [`AssetDescriptor`] names one loadable resource group: where it lives,
//! where to fall back to, whether the widget can run without it, and how to tell
//! that the host already provides it.
//!
//! Descriptors are immutable once resolved; the catalog builds a fresh set per
//! load cycle from defaults merged with caller overrides.

use std::fmt;
use std::sync::Arc;

use super::scope::Scope;

/// What the fetcher should do with a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Stylesheet (`text/css`).
    Style,
    /// Script (`application/javascript`).
    Script,
    /// Font file.
    Font,
    /// `preconnect` hint; no network call.
    Preconnect,
    /// `preload` hint; no network call.
    Preload,
    /// Unknown: classify by extension or a HEAD probe.
    Auto,
}

/// Host-side "already satisfied" check.
pub type Validator = Arc<dyn Fn(&dyn Scope) -> bool + Send + Sync>;

/// One loadable resource.
#[derive(Clone)]
pub struct AssetDescriptor {
    /// Stable key (e.g. `formio-js`), also the registry key.
    pub key: String,
    pub kind: AssetKind,
    pub primary_url: String,
    pub fallback_url: Option<String>,
    /// Required assets abort the load sequence when they fail.
    pub required: bool,
    /// Skip the fetch when this returns `true`.
    pub validate: Option<Validator>,
    /// Global the resource defines once inserted.
    pub provides: Option<String>,
}

impl fmt::Debug for AssetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetDescriptor")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("primary_url", &self.primary_url)
            .field("fallback_url", &self.fallback_url)
            .field("required", &self.required)
            .field("validate", &self.validate.is_some())
            .field("provides", &self.provides)
            .finish()
    }
}

impl AssetDescriptor {
    /// Creates an optional descriptor without fallback.
    pub fn new(key: impl Into<String>, kind: AssetKind, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            primary_url: url.into(),
            fallback_url: None,
            required: false,
            validate: None,
            provides: None,
        }
    }

    /// Marks the asset as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Adds a fallback source.
    pub fn with_fallback(mut self, url: impl Into<String>) -> Self {
        self.fallback_url = Some(url.into());
        self
    }

    /// Sets a custom "already satisfied" predicate.
    pub fn validate_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn Scope) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(f));
        self
    }

    /// Declares the global this script defines; it doubles as the validator
    /// unless one is already set.
    pub fn provides_global(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if self.validate.is_none() {
            let probe = name.clone();
            self.validate = Some(Arc::new(move |scope: &dyn Scope| scope.has_global(&probe)));
        }
        self.provides = Some(name);
        self
    }

    /// Applies caller overrides for this key.
    pub fn overridden(mut self, primary: Option<&str>, fallback: Option<&str>) -> Self {
        if let Some(p) = primary.filter(|s| !s.trim().is_empty()) {
            self.primary_url = p.to_string();
        }
        if let Some(f) = fallback.filter(|s| !s.trim().is_empty()) {
            self.fallback_url = Some(f.to_string());
        }
        self
    }
}
