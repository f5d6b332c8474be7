//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Point-in-time copy of every indexed entry's metadata, keyed by entry key.
pub type Snapshot = BTreeMap<String, EntryMetadata>;

// == Cache Entry ==
/// Represents a single cache entry with value and expiration metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Key the entry is stored under
    pub key: String,
    /// The stored value
    pub value: String,
    /// Absolute expiration time
    pub expires_at: DateTime<Utc>,
    /// TTL the expiration was computed from, in whole seconds
    pub ttl_seconds: i64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` after `now`.
    ///
    /// A zero or negative TTL yields an entry that is already expired.
    pub fn new(key: String, value: String, ttl: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            key,
            value,
            expires_at: expiration_from(now, ttl),
            ttl_seconds: ttl.num_seconds(),
        }
    }

    // == Refresh ==
    /// Overwrites the value and restarts the TTL from `now`.
    pub fn refresh(&mut self, value: String, ttl: TimeDelta, now: DateTime<Utc>) {
        self.value = value;
        self.expires_at = expiration_from(now, ttl);
        self.ttl_seconds = ttl.num_seconds();
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is dead once `now >= expires_at`, so an entry whose TTL has
    /// fully elapsed is never handed out.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    // == Metadata ==
    /// Returns the identifying metadata published in snapshots.
    pub fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            key: self.key.clone(),
            expiration: self.expires_at,
        }
    }
}

// == Entry Metadata ==
/// Key and expiration of an entry, as carried by snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryMetadata {
    pub key: String,
    pub expiration: DateTime<Utc>,
}

/// Saturates instead of overflowing for absurd TTLs.
fn expiration_from(now: DateTime<Utc>, ttl: TimeDelta) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(if ttl < TimeDelta::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
