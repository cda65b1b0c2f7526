//! # Rendering scope seam.
//!
//! The [`Scope`] is wherever fetched styles and scripts end up: a document
//! head, a shadow root, a webview bridge. The runtime only needs to insert
//! resources and ask whether something is already there.
//!
//! Several widgets may share one scope and race to insert the same resource;
//! implementations should make `contains` cheap and reliable so that an
//! "already present" answer short-circuits the second insertion.

use std::collections::HashSet;
use std::sync::Mutex;

use url::Url;

/// How an inserted resource is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Stylesheet,
    Script,
    Font,
    Preconnect,
    Preload,
    /// Generated CSS rules without a source URL.
    InlineStyle,
}

/// A resource ready for insertion.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Registry key; at most one resource per key per scope.
    pub key: String,
    pub kind: ResourceKind,
    pub url: Option<Url>,
    pub content: Vec<u8>,
    /// Global defined once the resource is evaluated.
    pub provides: Option<String>,
}

/// Target rendering scope.
pub trait Scope: Send + Sync + 'static {
    /// `true` if a resource with `key` is already attached.
    fn contains(&self, key: &str) -> bool;

    /// `true` if the environment already defines global `name`.
    fn has_global(&self, name: &str) -> bool;

    /// Attaches `resource`. `Err` carries a human-readable reason.
    fn insert(&self, resource: Resource) -> Result<(), String>;
}

/// In-memory [`Scope`] for headless hosts and tests.
///
/// Scripts that declare `provides` define their global on insertion.
#[derive(Debug, Default)]
pub struct MemoryScope {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    resources: Vec<Resource>,
    globals: HashSet<String>,
}

impl MemoryScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predefines a global, as if the host page already loaded its script.
    pub fn define_global(&self, name: impl Into<String>) {
        self.state().globals.insert(name.into());
    }

    /// Keys of attached resources, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.state().resources.iter().map(|r| r.key.clone()).collect()
    }

    /// Attached resource with `key`.
    pub fn get(&self, key: &str) -> Option<Resource> {
        self.state().resources.iter().find(|r| r.key == key).cloned()
    }

    /// Number of attached resources of `kind`.
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.state().resources.iter().filter(|r| r.kind == kind).count()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Scope for MemoryScope {
    fn contains(&self, key: &str) -> bool {
        self.state().resources.iter().any(|r| r.key == key)
    }

    fn has_global(&self, name: &str) -> bool {
        self.state().globals.contains(name)
    }

    fn insert(&self, resource: Resource) -> Result<(), String> {
        let mut st = self.state();
        if st.resources.iter().any(|r| r.key == resource.key) {
            return Ok(());
        }
        if resource.kind == ResourceKind::Script {
            if let Some(name) = &resource.provides {
                st.globals.insert(name.clone());
            }
        }
        st.resources.push(resource);
        Ok(())
    }
}
