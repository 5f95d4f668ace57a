use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::RwLock;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub populated: bool,
}

/// Lazily derived value that is rebuilt after every invalidation.
pub struct DerivedCache<T> {
    inner: RwLock<Option<Arc<T>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T> Default for DerivedCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DerivedCache<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get_or_build(&self, build: impl FnOnce() -> T) -> Arc<T> {
        if let Some(value) = self.inner.read().as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(value);
        }
        let mut slot = self.inner.write();
        // Another reader may have filled the slot between the two locks.
        if let Some(value) = slot.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(value);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(build());
        *slot = Some(Arc::clone(&value));
        value
    }

    pub fn invalidate(&self) {
        self.inner.write().take();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            populated: self.inner.read().is_some(),
        }
    }
}

impl<T> Clone for DerivedCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: RwLock::new(self.inner.read().clone()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}
