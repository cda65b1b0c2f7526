//! # Resource registry.
//!
//! Key-indexed record of what this widget inserted during the current load
//! cycle, layered over a shared [`Scope`].
//!
//! ## Rules
//! - A key is inserted at most once per cycle.
//! - A key the scope already contains (another widget won the race) counts as
//!   inserted; it is never attached twice.
//! - [`reset`](ResourceRegistry::reset) starts a new cycle; the scope keeps its contents.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use super::scope::{Resource, Scope};
use crate::error::FetchError;

/// What happened to an insertion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The resource was attached now.
    Inserted,
    /// The key was already attached (by this cycle or by someone else).
    AlreadyPresent,
}

/// Per-widget view of inserted resources.
pub struct ResourceRegistry {
    scope: Arc<dyn Scope>,
    inserted: Mutex<HashSet<String>>,
}

impl ResourceRegistry {
    pub fn new(scope: Arc<dyn Scope>) -> Self {
        Self {
            scope,
            inserted: Mutex::new(HashSet::new()),
        }
    }

    /// The underlying scope.
    pub fn scope(&self) -> &dyn Scope {
        self.scope.as_ref()
    }

    /// Forgets this cycle's insertions.
    pub fn reset(&self) {
        self.keys().clear();
    }

    /// `true` if `key` was inserted this cycle or the scope already has it.
    pub fn is_present(&self, key: &str) -> bool {
        self.keys().contains(key) || self.scope.contains(key)
    }

    /// Attaches `resource` unless its key is already present.
    pub fn insert(&self, resource: Resource) -> Result<Insertion, FetchError> {
        let key = resource.key.clone();
        let mut keys = self.keys();
        if keys.contains(&key) {
            return Ok(Insertion::AlreadyPresent);
        }
        if self.scope.contains(&key) {
            keys.insert(key);
            return Ok(Insertion::AlreadyPresent);
        }
        self.scope
            .insert(resource)
            .map_err(|reason| FetchError::Rejected { reason })?;
        keys.insert(key);
        Ok(Insertion::Inserted)
    }

    fn keys(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.inserted.lock().unwrap_or_else(|e| e.into_inner())
    }
}
