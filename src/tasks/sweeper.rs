//! Expiration Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// Each sweep publishes one snapshot through the cache's notifier, whether
/// or not anything was removed. The task runs until the returned handle is
/// aborted.
///
/// # Example
/// ```ignore
/// let handle = spawn_sweep_task(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(cache: SharedCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(?interval, "starting expiration sweep task");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = cache.sweep().await;
            if removed > 0 {
                info!("expiration sweep: removed {} expired entries", removed);
            } else {
                debug!("expiration sweep: no expired entries found");
            }
        }
    })
}
