//! LRU TTL Cache - an in-memory cache server
//!
//! Capacity-bounded LRU storage with per-entry TTL expiration and a live
//! snapshot feed of every change.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_sweep_task;
