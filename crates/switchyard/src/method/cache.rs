//! Overload memoization on top of a generic object cache.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::MethodDescriptor;
use crate::application::Application;
use crate::REGISTRY_TARGET;

/// Generic string-keyed memoization store.
pub trait ObjectCache: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<Arc<dyn Any + Send + Sync>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Arc<dyn Any + Send + Sync>);
}

/// Process-local [`ObjectCache`] backed by a read-write locked map.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ObjectCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: Arc<dyn Any + Send + Sync>) {
        self.entries.write().insert(key.to_owned(), value);
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.len())
            .finish()
    }
}

/// Memoizes the overloads each application type declares per method name.
///
/// Two threads missing on the same key both ask the application and both
/// store the result. Either write wins; the lists are identical.
#[derive(Clone)]
pub struct MethodCache {
    store: Arc<dyn ObjectCache>,
}

impl MethodCache {
    /// Creates a cache over a fresh [`MemoryCache`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryCache::new()))
    }

    /// Creates a cache over a caller-supplied store.
    #[must_use]
    pub fn with_store(store: Arc<dyn ObjectCache>) -> Self {
        Self { store }
    }

    /// Returns the cache key for `method` on `owner`.
    pub fn key(owner: &dyn Application, method: &str) -> String {
        format!("{}:{method}", owner.type_name())
    }

    /// Returns the overloads `owner` declares for `method`.
    ///
    /// Stored values of an unexpected type are treated as a miss and
    /// replaced.
    pub fn overloads(&self, owner: &dyn Application, method: &str) -> Arc<Vec<MethodDescriptor>> {
        let key = Self::key(owner, method);
        if let Some(hit) = self
            .store
            .get(&key)
            .and_then(|value| value.downcast::<Vec<MethodDescriptor>>().ok())
        {
            return hit;
        }

        let overloads = Arc::new(owner.overloads(method));
        debug!(
            target: REGISTRY_TARGET,
            key = key.as_str(),
            overloads = overloads.len(),
            "cached method overloads"
        );
        self.store.set(&key, overloads.clone());
        overloads
    }
}

impl Default for MethodCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MethodCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodCache").finish_non_exhaustive()
    }
}
