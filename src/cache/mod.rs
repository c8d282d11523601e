//! Cache Module
//!
//! Sharded in-memory key-value storage with lazy (on-read) and background
//! (sweep) TTL expiration.

mod entry;
mod service;
mod shard;
mod strategy;
mod tracker;


// Re-export public types
pub use entry::{expiry_from_ttl, CacheEntry};
pub use service::{CacheLookup, ShardedCacheService};
pub use shard::{MemoryShard, Shard, ShardOptions, SweepOutcome};
pub use strategy::{shard_index_for, HashModuloStrategy, ShardingStrategy};
pub use tracker::ExpirationTracker;

// == Public Constants ==
/// Maximum allowed key length in bytes (HTTP layer)
pub const MAX_KEY_LENGTH: usize = 256;
