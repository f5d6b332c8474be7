//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
    Json,
};
use chrono::TimeDelta;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, SharedCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    GetResponse, HealthResponse, SetRequest, SnapshotResponse, StatsResponse, StatusResponse,
};
use crate::notify::{BroadcastNotifier, Subscription};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lock-protected cache engine
    pub cache: SharedCache,
    /// Snapshot fan-out the cache publishes to
    pub notifier: BroadcastNotifier,
    /// TTL in seconds applied when a set request omits one
    pub default_ttl: i64,
}

impl AppState {
    /// Wires `store` to a fresh broadcast notifier.
    pub fn new(store: CacheStore, default_ttl: i64, notify_buffer: usize) -> Self {
        let notifier = BroadcastNotifier::new(notify_buffer);
        let cache = SharedCache::new(store, std::sync::Arc::new(notifier.clone()));
        Self {
            cache,
            notifier,
            default_ttl,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CacheStore::new(config.capacity),
            config.default_ttl,
            config.notify_buffer,
        )
    }
}

/// Converts request seconds into a TTL, saturating out-of-range values.
fn ttl_from_secs(secs: i64) -> TimeDelta {
    TimeDelta::try_seconds(secs).unwrap_or(if secs < 0 {
        TimeDelta::MIN
    } else {
        TimeDelta::MAX
    })
}

/// Handler for POST /cache
///
/// Stores a key-value pair. Every accepted set publishes a snapshot.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<StatusResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = ttl_from_secs(req.ttl.unwrap_or(state.default_ttl));
    state.cache.set(req.key.clone(), req.value, ttl).await;

    Ok(Json(StatusResponse::ok(req.key)))
}

/// Handler for GET /cache/:key
///
/// Returns 404 for absent and expired keys alike.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => {
            debug!(key = %key, "cache miss");
            Err(CacheError::NotFound)
        }
    }
}

/// Handler for DELETE /cache/:key
///
/// Succeeds whether or not the key existed.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<StatusResponse> {
    state.cache.delete(&key).await;
    Json(StatusResponse::ok(key))
}

/// Handler for GET /cache
///
/// Returns the key and expiration of every entry.
pub async fn snapshot_handler(State(state): State<AppState>) -> Json<SnapshotResponse> {
    Json(SnapshotResponse::new(state.cache.snapshot().await))
}

/// Handler for GET /events
///
/// Upgrades to a WebSocket that receives every published snapshot as a JSON
/// text frame.
pub async fn events_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    // Subscribe before the upgrade completes so no snapshot is missed
    let subscription = state.notifier.subscribe();
    ws.on_upgrade(move |socket| stream_snapshots(socket, subscription))
}

async fn stream_snapshots(mut socket: WebSocket, mut subscription: Subscription) {
    info!("snapshot subscriber connected");

    while let Some(event) = subscription.next().await {
        let payload = match serde_json::to_string(event.as_ref()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("failed to encode snapshot {}: {}", event.version, e);
                continue;
            }
        };
        if socket.send(Message::Text(payload)).await.is_err() {
            break;
        }
    }

    info!("snapshot subscriber disconnected");
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
