//! Cache Store Module
//!
//! Main cache engine combining a key index with an LRU recency list and TTL
//! expiration. The store itself is single-threaded; [`SharedCache`] wraps it
//! in a lock and publishes change notifications.
//!
//! [`SharedCache`]: crate::cache::SharedCache

use std::collections::HashMap;
use std::sync::Arc;

use chrono::TimeDelta;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, RecencyList, Slot, Snapshot, SystemClock};

// == Cache Store ==
/// Capacity-bounded cache with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore {
    /// Key to recency-list slot
    index: HashMap<String, Slot>,
    /// Entries ordered from most to least recently used
    recency: RecencyList,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Time source for expiration
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore that reads time from `clock`.
    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            recency: RecencyList::with_capacity(capacity),
            stats: CacheStats::new(capacity),
            capacity,
            clock,
        }
    }

    // == Get ==
    /// Looks up a live value and marks it most recently used.
    ///
    /// An expired entry is removed as part of the lookup and reported as
    /// absent.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let Some(&slot) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if self.recency.get(slot).is_expired(self.clock.now()) {
            self.index.remove(key);
            self.recency.remove(slot);
            self.stats.record_miss();
            self.stats.record_expirations(1);
            self.sync_len();
            debug!(key, "lazily expired entry on lookup");
            return None;
        }

        self.recency.move_to_front(slot);
        self.stats.record_hit();
        Some(self.recency.get(slot).value.clone())
    }

    // == Set ==
    /// Stores a value that expires `ttl` from now.
    ///
    /// An existing key is updated in place and promoted. A new key evicts the
    /// least recently used entry first when the store is full; eviction is
    /// purely positional and ignores expiration. Returns the evicted key, if
    /// any.
    pub fn set(&mut self, key: String, value: String, ttl: TimeDelta) -> Option<String> {
        let now = self.clock.now();

        if let Some(&slot) = self.index.get(&key) {
            self.recency.get_mut(slot).refresh(value, ttl, now);
            self.recency.move_to_front(slot);
            return None;
        }

        let mut evicted = None;
        if self.recency.len() >= self.capacity {
            if let Some(oldest) = self.recency.pop_back() {
                self.index.remove(&oldest.key);
                self.stats.record_eviction();
                debug!(key = %oldest.key, "evicted least recently used entry");
                evicted = Some(oldest.key);
            }
        }

        let slot = self
            .recency
            .push_front(CacheEntry::new(key.clone(), value, ttl, now));
        self.index.insert(key, slot);
        self.sync_len();
        evicted
    }

    // == Delete ==
    /// Removes an entry. Returns whether the key was present.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.index.remove(key) {
            Some(slot) => {
                self.recency.remove(slot);
                self.sync_len();
                true
            }
            None => false,
        }
    }

    // == Purge Expired ==
    /// Removes every expired entry and returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<(String, Slot)> = self
            .index
            .iter()
            .filter(|(_, slot)| self.recency.get(**slot).is_expired(now))
            .map(|(key, &slot)| (key.clone(), slot))
            .collect();

        let count = expired.len();
        for (key, slot) in expired {
            self.index.remove(&key);
            self.recency.remove(slot);
        }

        self.stats.record_expirations(count);
        self.sync_len();
        count
    }

    // == Snapshot ==
    /// Copies the key and expiration of every indexed entry.
    ///
    /// Expired entries that have not been reclaimed yet are included.
    pub fn snapshot(&self) -> Snapshot {
        self.recency
            .iter()
            .map(|entry| (entry.key.clone(), entry.metadata()))
            .collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recency.is_empty()
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.recency.iter().map(|entry| entry.key.clone()).collect()
    }

    fn sync_len(&mut self) {
        debug_assert_eq!(
            self.index.len(),
            self.recency.len(),
            "index and recency list out of sync"
        );
        self.stats.set_total_entries(self.index.len());
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    const LONG: i64 = 300;

    fn store_with_clock(capacity: usize) -> (CacheStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (CacheStore::with_clock(capacity, clock.clone()), clock)
    }

    fn set(store: &mut CacheStore, key: &str, ttl_secs: i64) -> Option<String> {
        store.set(
            key.to_string(),
            format!("value_{}", key),
            TimeDelta::seconds(ttl_secs),
        )
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 100);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(100);

        set(&mut store, "key1", LONG);

        assert_eq!(store.get("key1").as_deref(), Some("value_key1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = CacheStore::new(100);
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_delete() {
        let mut store = CacheStore::new(100);

        set(&mut store, "key1", LONG);

        assert!(store.delete("key1"));
        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let mut store = CacheStore::new(100);
        set(&mut store, "key1", LONG);

        assert!(!store.delete("nonexistent"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_update_in_place() {
        let (mut store, clock) = store_with_clock(3);

        store.set("a".into(), "v1".into(), TimeDelta::seconds(10));
        set(&mut store, "b", LONG);
        clock.advance_secs(5);
        store.set("a".into(), "v2".into(), TimeDelta::seconds(60));

        assert_eq!(store.len(), 2);
        assert_eq!(store.keys_by_recency(), vec!["a", "b"]);

        let snapshot = store.snapshot();
        assert_eq!(
            snapshot["a"].expiration,
            clock.now() + TimeDelta::seconds(60)
        );
        assert_eq!(store.get("a").as_deref(), Some("v2"));
    }

    #[test]
    fn test_store_update_does_not_evict() {
        let mut store = CacheStore::new(2);

        set(&mut store, "a", LONG);
        set(&mut store, "b", LONG);

        assert!(set(&mut store, "a", LONG).is_none());
        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_ttl_expiration_on_read() {
        let (mut store, clock) = store_with_clock(100);

        set(&mut store, "x", 1);
        assert!(store.get("x").is_some());

        clock.advance(TimeDelta::milliseconds(1001));

        assert!(store.get("x").is_none());
        assert_eq!(store.len(), 0);
        assert!(!store.snapshot().contains_key("x"));
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_non_positive_ttl_is_stored_then_reclaimed() {
        let mut store = CacheStore::new(100);

        set(&mut store, "zero", 0);
        set(&mut store, "negative", -10);

        // Stored, not rejected
        assert_eq!(store.len(), 2);
        assert!(store.snapshot().contains_key("zero"));

        assert!(store.get("zero").is_none());
        assert_eq!(store.purge_expired(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = CacheStore::new(3);

        set(&mut store, "key1", LONG);
        set(&mut store, "key2", LONG);
        set(&mut store, "key3", LONG);

        // Cache is full, adding key4 should evict key1 (oldest)
        let evicted = set(&mut store, "key4", LONG);

        assert_eq!(evicted.as_deref(), Some("key1"));
        assert_eq!(store.len(), 3);
        assert!(store.get("key1").is_none());
        assert!(store.get("key2").is_some());
        assert!(store.get("key3").is_some());
        assert!(store.get("key4").is_some());
    }

    #[test]
    fn test_store_promotion_on_get() {
        let mut store = CacheStore::new(2);

        set(&mut store, "a", LONG);
        set(&mut store, "b", LONG);
        store.get("a");
        let evicted = set(&mut store, "c", LONG);

        assert_eq!(evicted.as_deref(), Some("b"));
        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
    }

    #[test]
    fn test_store_eviction_ignores_expiration() {
        let (mut store, clock) = store_with_clock(2);

        set(&mut store, "old_live", LONG);
        set(&mut store, "new_dead", 1);
        clock.advance_secs(2);

        // The back of the list goes even though a dead entry is available
        let evicted = set(&mut store, "c", LONG);
        assert_eq!(evicted.as_deref(), Some("old_live"));
        assert!(store.snapshot().contains_key("new_dead"));
    }

    #[test]
    fn test_store_capacity_zero() {
        let mut store = CacheStore::new(0);

        assert!(set(&mut store, "a", LONG).is_none());
        assert_eq!(store.len(), 1);

        let evicted = set(&mut store, "b", LONG);
        assert_eq!(evicted.as_deref(), Some("a"));
        assert_eq!(store.keys_by_recency(), vec!["b"]);
    }

    #[test]
    fn test_store_capacity_one() {
        let mut store = CacheStore::new(1);

        set(&mut store, "a", LONG);
        set(&mut store, "b", LONG);

        assert_eq!(store.keys_by_recency(), vec!["b"]);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_purge_expired() {
        let (mut store, clock) = store_with_clock(100);

        set(&mut store, "x", 1);
        set(&mut store, "y", 100);
        clock.advance_secs(2);

        assert_eq!(store.purge_expired(), 1);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("y"));
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_purge_keeps_recency_order() {
        let (mut store, clock) = store_with_clock(100);

        set(&mut store, "a", LONG);
        set(&mut store, "gone", 1);
        set(&mut store, "b", LONG);
        clock.advance_secs(2);

        store.purge_expired();
        assert_eq!(store.keys_by_recency(), vec!["b", "a"]);
    }

    #[test]
    fn test_store_snapshot_includes_unreclaimed_expired_entries() {
        let (mut store, clock) = store_with_clock(100);

        set(&mut store, "x", 1);
        clock.advance_secs(5);

        let snapshot = store.snapshot();
        assert_eq!(snapshot["x"].key, "x");
    }

    #[test]
    fn test_store_snapshot_isolation() {
        let mut store = CacheStore::new(100);

        set(&mut store, "a", LONG);
        let before = store.snapshot();

        set(&mut store, "b", LONG);
        store.delete("a");

        assert_eq!(before.len(), 1);
        assert!(before.contains_key("a"));
        assert!(!before.contains_key("b"));
    }

    #[test]
    fn test_store_stats() {
        let (mut store, clock) = store_with_clock(1);

        set(&mut store, "key1", 1);
        store.get("key1"); // hit
        store.get("nonexistent"); // miss
        set(&mut store, "key2", 1); // evicts key1
        clock.advance_secs(2);
        store.get("key2"); // expired miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.capacity, 1);
    }
}
