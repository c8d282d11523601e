//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::ShardOptions;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of independent cache partitions
    pub shard_count: usize,
    /// Largest accepted value, in bytes
    pub max_payload_size_bytes: usize,
    /// TTL in seconds applied to writes that carry none (None = never expire)
    pub default_ttl: Option<u64>,
    /// Background cleanup interval in seconds
    pub cleanup_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SHARD_COUNT` - Number of shards (default: 4)
    /// - `MAX_PAYLOAD_SIZE_BYTES` - Value size limit (default: 1000000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: unset)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 10)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            shard_count: env_or("SHARD_COUNT", defaults.shard_count),
            max_payload_size_bytes: env_or(
                "MAX_PAYLOAD_SIZE_BYTES",
                defaults.max_payload_size_bytes,
            ),
            default_ttl: env::var("DEFAULT_TTL").ok().and_then(|v| v.parse().ok()),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    /// Per-shard limits derived from this configuration.
    pub fn shard_options(&self) -> ShardOptions {
        ShardOptions {
            max_payload_size_bytes: self.max_payload_size_bytes,
            default_ttl_seconds: self.default_ttl,
        }
    }

    /// Interval between background sweeps.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: 4,
            max_payload_size_bytes: 1_000_000,
            default_ttl: None,
            cleanup_interval: 10,
            server_port: 3000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
