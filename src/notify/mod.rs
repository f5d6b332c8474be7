//! Change Notification Module
//!
//! Carries cache snapshots from mutating operations to live observers.
//!
//! Every set, delete and sweep publishes exactly one [`SnapshotEvent`]. The
//! notifier is handed the event while the cache lock is still held, so
//! events reach it in lock order.

mod broadcast;

use std::fmt::Debug;

use serde::Serialize;

use crate::cache::Snapshot;

pub use broadcast::{BroadcastNotifier, Subscription};

// == Change Cause ==
/// Operation that produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCause {
    Set,
    Delete,
    Sweep,
}

// == Snapshot Event ==
/// A published snapshot of the cache.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEvent {
    /// Position of the producing operation in lock order, starting at 1
    pub version: u64,
    pub cause: ChangeCause,
    pub entries: Snapshot,
}

// == Notifier Trait ==
/// Sink for snapshot events.
///
/// `publish` runs inside the cache's critical section. Implementations must
/// not block or wait on observers; a slow sink would stall every cache
/// operation.
pub trait Notifier: Debug + Send + Sync {
    fn publish(&self, event: SnapshotEvent);
}
