//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod clock;
mod entry;
mod lru;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, EntryMetadata, Snapshot};
pub use lru::{RecencyList, Slot};
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
