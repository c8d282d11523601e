//! Sharding Strategy Module
//!
//! Maps keys to shard indices.

use std::fmt;
use std::num::NonZeroUsize;

use sha2::{Digest, Sha256};

use crate::error::{CacheError, Result};

/// Deterministic mapping from a key to a shard index.
///
/// Implementations must be pure functions of the key and shard count so that
/// every caller (request path or cleanup sweep) routes a key identically.
pub trait ShardingStrategy: fmt::Debug + Send + Sync {
    /// Returns an index in `[0, total_shards)`.
    fn shard_index(&self, key: &str, total_shards: NonZeroUsize) -> usize;
}

/// SHA-256 of the key's UTF-8 bytes, first four bytes read as a
/// little-endian `u32`, reduced modulo the shard count.
///
/// Stable across processes and platforms, unlike `std`'s randomized hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashModuloStrategy;

impl ShardingStrategy for HashModuloStrategy {
    fn shard_index(&self, key: &str, total_shards: NonZeroUsize) -> usize {
        if total_shards.get() == 1 {
            return 0;
        }

        let digest = Sha256::digest(key.as_bytes());
        let prefix = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
        (prefix as usize) % total_shards.get()
    }
}

/// Checked routing for callers holding a raw shard count.
///
/// Fails with [`CacheError::InvalidShardCount`] when `total_shards` is zero.
pub fn shard_index_for(
    strategy: &dyn ShardingStrategy,
    key: &str,
    total_shards: usize,
) -> Result<usize> {
    let total =
        NonZeroUsize::new(total_shards).ok_or(CacheError::InvalidShardCount(total_shards))?;
    Ok(strategy.shard_index(key, total))
}
