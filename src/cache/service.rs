//! Sharded Cache Service Module
//!
//! Routes single-key operations to exactly one shard and fans aggregate
//! operations out over all of them.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;

use crate::cache::{
    ExpirationTracker, HashModuloStrategy, MemoryShard, Shard, ShardOptions, ShardingStrategy,
    SweepOutcome,
};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLookup {
    /// The requested key
    pub key: String,
    /// The stored value, None on a miss
    pub value: Option<String>,
}

impl CacheLookup {
    /// True when a live value was found.
    pub fn found(&self) -> bool {
        self.value.is_some()
    }
}

// == Sharded Cache Service ==
/// Fixed set of shards behind a sharding strategy.
///
/// The shard array is built once and never resized. Every operation on a key
/// touches only the shard the strategy assigns it to.
#[derive(Debug)]
pub struct ShardedCacheService {
    shards: Box<[Arc<dyn Shard>]>,
    strategy: Box<dyn ShardingStrategy>,
    shard_count: NonZeroUsize,
}

impl ShardedCacheService {
    // == Constructor ==
    /// Builds `shard_count` shards by calling `shard_factory` with each index.
    ///
    /// Fails with [`CacheError::InvalidShardCount`] when `shard_count` is zero.
    pub fn new<S, F, T>(shard_count: usize, mut shard_factory: F, strategy: T) -> Result<Self>
    where
        S: Shard + 'static,
        F: FnMut(usize) -> S,
        T: ShardingStrategy + 'static,
    {
        let count =
            NonZeroUsize::new(shard_count).ok_or(CacheError::InvalidShardCount(shard_count))?;

        let shards = (0..shard_count)
            .map(|index| Arc::new(shard_factory(index)) as Arc<dyn Shard>)
            .collect();

        Ok(Self {
            shards,
            strategy: Box::new(strategy),
            shard_count: count,
        })
    }

    /// Builds in-memory shards sharing `tracker`, routed by SHA-256 modulo.
    pub fn with_memory_shards(
        shard_count: usize,
        options: ShardOptions,
        tracker: Arc<ExpirationTracker>,
    ) -> Result<Self> {
        Self::new(
            shard_count,
            |_| MemoryShard::new(options, Arc::clone(&tracker)),
            HashModuloStrategy,
        )
    }

    /// Builds the service described by `config`.
    pub fn from_config(config: &Config, tracker: Arc<ExpirationTracker>) -> Result<Self> {
        Self::with_memory_shards(config.shard_count, config.shard_options(), tracker)
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.shard_count.get()
    }

    /// Index of the shard responsible for `key`.
    pub fn shard_index(&self, key: &str) -> usize {
        self.strategy.shard_index(key, self.shard_count)
    }

    fn shard(&self, key: &str) -> &dyn Shard {
        self.shards[self.shard_index(key)].as_ref()
    }

    // == Single-key operations ==
    /// Looks up `key`, lazily evicting it if expired.
    pub fn get(&self, key: &str) -> CacheLookup {
        CacheLookup {
            key: key.to_owned(),
            value: self.shard(key).get(key),
        }
    }

    /// Stores `value` under `key` with an optional TTL in seconds.
    pub fn set(&self, key: String, value: String, ttl_seconds: Option<u64>) -> Result<()> {
        self.shard(&key).set(key, value, ttl_seconds)
    }

    /// True iff `key` holds a live value.
    pub fn exists(&self, key: &str) -> bool {
        self.shard(key).exists(key)
    }

    /// Deletes `key`, returning whether anything was stored.
    pub fn remove(&self, key: &str) -> bool {
        self.shard(key).remove(key)
    }

    /// Removes `key` only if its stored entry has expired as of `now`.
    pub fn remove_expired(&self, key: &str, now: DateTime<Utc>) -> SweepOutcome {
        self.shard(key).remove_expired(key, now)
    }

    // == Aggregate operations ==
    /// Sum of the shards' live counts.
    ///
    /// Shards are read concurrently and independently, so a write landing
    /// mid-way makes the total a point-in-time approximation.
    pub async fn count(&self) -> Result<usize> {
        let counts = self.fan_out(|shard| shard.count()).await?;
        Ok(counts.into_iter().sum())
    }

    /// Merged snapshot of every shard.
    ///
    /// Keys never collide across shards since each key routes to exactly one.
    pub async fn dump(&self, include_expired: bool) -> Result<HashMap<String, String>> {
        let dumps = self.fan_out(move |shard| shard.dump(include_expired)).await?;

        let mut merged = HashMap::with_capacity(dumps.iter().map(HashMap::len).sum());
        for dump in dumps {
            merged.extend(dump);
        }
        Ok(merged)
    }

    async fn fan_out<T, F>(&self, op: F) -> Result<Vec<T>>
    where
        T: Send + 'static,
        F: Fn(&dyn Shard) -> T + Clone + Send + 'static,
    {
        let mut tasks = JoinSet::new();
        for shard in self.shards.iter() {
            let shard = Arc::clone(shard);
            let op = op.clone();
            tasks.spawn_blocking(move || op(shard.as_ref()));
        }

        let mut results = Vec::with_capacity(self.shards.len());
        while let Some(joined) = tasks.join_next().await {
            let value =
                joined.map_err(|err| CacheError::Internal(format!("shard task failed: {err}")))?;
            results.push(value);
        }
        Ok(results)
    }
}
