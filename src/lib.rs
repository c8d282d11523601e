//! Sharded Cache - An in-memory key-value cache server
//!
//! Partitions keys over independent shards, expires entries lazily on read
//! and through a periodic background sweep, and keeps an approximate count of
//! live entries.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::ShardedCacheService;
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
