//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// TTL in seconds for set requests that omit one
    pub default_ttl: i64,
    /// HTTP server port
    pub server_port: u16,
    /// Expiration sweep interval in seconds
    pub sweep_interval: u64,
    /// Undelivered snapshot events retained per subscriber
    pub notify_buffer: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 100)
    /// - `DEFAULT_TTL` - TTL in seconds when a request omits one (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `SWEEP_INTERVAL` - Expiration sweep frequency in seconds (default: 1)
    /// - `NOTIFY_BUFFER` - Snapshot events buffered per subscriber (default: 64)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env_or("CACHE_CAPACITY", defaults.capacity),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            notify_buffer: env_or("NOTIFY_BUFFER", defaults.notify_buffer),
        }
    }

    /// Sweep interval as a Duration, never shorter than one second.
    pub fn sweep_period(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 100,
            default_ttl: 300,
            server_port: 8080,
            sweep_interval: 1,
            notify_buffer: 64,
        }
    }
}

/// Parses `name`, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
