//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, events_handler, get_handler, health_handler, set_handler, snapshot_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /cache` - Key and expiration of every entry
/// - `POST /cache` - Store a key-value pair with a TTL in seconds
/// - `GET /cache/:key` - Retrieve a value by key
/// - `DELETE /cache/:key` - Delete a key
/// - `GET /events` - WebSocket feed of cache snapshots
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: any origin, GET/POST/DELETE with a Content-Type header
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/cache", get(snapshot_handler).post(set_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/events", get(events_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
