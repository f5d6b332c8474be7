//! Shared Cache Module
//!
//! Thread-safe handle to the cache engine. Every operation runs under one
//! exclusive lock; mutating operations publish a snapshot before releasing
//! it.

use std::sync::Arc;

use chrono::TimeDelta;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore, Snapshot};
use crate::notify::{ChangeCause, Notifier, SnapshotEvent};

#[derive(Debug)]
struct Guarded {
    store: CacheStore,
    /// Version of the last published snapshot
    version: u64,
}

impl Guarded {
    fn stamp(&mut self, cause: ChangeCause) -> SnapshotEvent {
        self.version += 1;
        SnapshotEvent {
            version: self.version,
            cause,
            entries: self.store.snapshot(),
        }
    }
}

// == Shared Cache ==
/// Cloneable, lock-protected cache engine.
///
/// A mutation's snapshot is copied, versioned and handed to the notifier
/// inside the critical section, so observers receive events in lock order.
/// The notifier must not block; see [`Notifier`].
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<Mutex<Guarded>>,
    notifier: Arc<dyn Notifier>,
}

impl SharedCache {
    // == Constructor ==
    pub fn new(store: CacheStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Guarded { store, version: 0 })),
            notifier,
        }
    }

    // == Get ==
    /// Returns the live value for `key`, promoting it. Never publishes.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().await.store.get(key)
    }

    // == Set ==
    /// Inserts or updates `key`, then publishes a snapshot.
    pub async fn set(&self, key: String, value: String, ttl: TimeDelta) {
        let mut guard = self.inner.lock().await;
        if let Some(evicted) = guard.store.set(key, value, ttl) {
            debug!(evicted = %evicted, "set evicted an entry");
        }
        self.notifier.publish(guard.stamp(ChangeCause::Set));
    }

    // == Delete ==
    /// Removes `key` if present, then publishes a snapshot either way.
    pub async fn delete(&self, key: &str) -> bool {
        let mut guard = self.inner.lock().await;
        let removed = guard.store.delete(key);
        self.notifier.publish(guard.stamp(ChangeCause::Delete));
        removed
    }

    // == Sweep ==
    /// Removes every expired entry, then publishes one snapshot.
    ///
    /// Returns the number of entries removed.
    pub async fn sweep(&self) -> usize {
        let mut guard = self.inner.lock().await;
        let removed = guard.store.purge_expired();
        self.notifier.publish(guard.stamp(ChangeCause::Sweep));
        removed
    }

    // == Snapshot ==
    /// Copies the metadata of every indexed entry.
    pub async fn snapshot(&self) -> Snapshot {
        self.inner.lock().await.store.snapshot()
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.store.stats()
    }
}
