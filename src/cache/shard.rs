//! Shard Module
//!
//! One partition of the key space: a concurrent map plus an approximate
//! live-entry counter.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::cache::{CacheEntry, ExpirationTracker};
use crate::error::{CacheError, Result};

/// Result of a sweep check on a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The stored entry was expired and has been removed.
    Removed,
    /// The key holds a live entry; carries its current expiry, if any.
    Live(Option<DateTime<Utc>>),
    /// Nothing is stored under the key.
    Absent,
}

/// Operations every shard provides.
///
/// The sharded service only ever talks to shards through this trait, so
/// alternative implementations can be injected through its shard factory.
pub trait Shard: fmt::Debug + Send + Sync {
    /// Returns the value if present and not expired; evicts it if expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any prior entry.
    fn set(&self, key: String, value: String, ttl_seconds: Option<u64>) -> Result<()>;

    /// True iff the key is present and not expired. No side effects.
    fn exists(&self, key: &str) -> bool;

    /// Deletes the key, returning whether anything was stored.
    fn remove(&self, key: &str) -> bool;

    /// Removes the key only if its stored entry is expired as of `now`.
    fn remove_expired(&self, key: &str, now: DateTime<Utc>) -> SweepOutcome;

    /// Approximate number of live entries.
    fn count(&self) -> usize;

    /// Snapshot of the shard's contents.
    fn dump(&self, include_expired: bool) -> HashMap<String, String>;
}

/// Limits applied by a [`MemoryShard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardOptions {
    /// Largest accepted value, in bytes
    pub max_payload_size_bytes: usize,
    /// TTL applied when a write carries none
    pub default_ttl_seconds: Option<u64>,
}

impl Default for ShardOptions {
    fn default() -> Self {
        Self {
            max_payload_size_bytes: 1_000_000,
            default_ttl_seconds: None,
        }
    }
}

// == Memory Shard ==
/// In-memory shard backed by a [`DashMap`].
///
/// Counting rule: every entry contributes one to `live_count` from insertion
/// until it leaves the map, whether by lazy eviction, removal or sweep.
/// Overwrites replace in place and leave the count untouched. Map mutation and
/// counter update are not one atomic step, so concurrent readers may observe a
/// transiently skewed (even negative) counter; [`count`](Shard::count) clamps
/// at zero and is exact once writers quiesce.
pub struct MemoryShard {
    store: DashMap<String, CacheEntry>,
    live_count: AtomicIsize,
    options: ShardOptions,
    tracker: Arc<ExpirationTracker>,
}

impl MemoryShard {
    // == Constructor ==
    /// Creates an empty shard registering TTL writes with `tracker`.
    pub fn new(options: ShardOptions, tracker: Arc<ExpirationTracker>) -> Self {
        Self {
            store: DashMap::new(),
            live_count: AtomicIsize::new(0),
            options,
            tracker,
        }
    }

    /// Number of entries physically stored, expired ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub(crate) fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        // The read guard must be dropped before `remove_if` touches the same bucket.
        match self.store.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(now) => {
                return Some(entry.value().value().to_owned());
            }
            Some(_) => {}
        }

        if self.evict_if_expired(key, now) {
            tracing::trace!(key, "lazily evicted expired entry");
        }
        None
    }

    pub(crate) fn set_at(
        &self,
        key: String,
        value: String,
        ttl_seconds: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if value.len() > self.options.max_payload_size_bytes {
            return Err(CacheError::EntryTooLarge {
                actual: value.len(),
                max: self.options.max_payload_size_bytes,
            });
        }

        let ttl = ttl_seconds.or(self.options.default_ttl_seconds);
        let entry = CacheEntry::with_ttl(value, ttl, now);
        let expires_at = entry.expires_at();

        if let Some(expires_at) = expires_at {
            self.tracker.add(&key, expires_at);
        }
        if self.store.insert(key, entry).is_none() {
            self.live_count.fetch_add(1, Ordering::AcqRel);
        }

        Ok(())
    }

    pub(crate) fn exists_at(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.store
            .get(key)
            .map(|entry| !entry.is_expired(now))
            .unwrap_or(false)
    }

    pub(crate) fn dump_at(
        &self,
        include_expired: bool,
        now: DateTime<Utc>,
    ) -> HashMap<String, String> {
        self.store
            .iter()
            .filter(|item| include_expired || !item.value().is_expired(now))
            .map(|item| (item.key().clone(), item.value().value().to_owned()))
            .collect()
    }

    fn evict_if_expired(&self, key: &str, now: DateTime<Utc>) -> bool {
        let removed = self
            .store
            .remove_if(key, |_, entry| entry.is_expired(now))
            .is_some();
        if removed {
            self.live_count.fetch_sub(1, Ordering::AcqRel);
        }
        removed
    }
}

impl Shard for MemoryShard {
    fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Utc::now())
    }

    fn set(&self, key: String, value: String, ttl_seconds: Option<u64>) -> Result<()> {
        self.set_at(key, value, ttl_seconds, Utc::now())
    }

    fn exists(&self, key: &str) -> bool {
        self.exists_at(key, Utc::now())
    }

    fn remove(&self, key: &str) -> bool {
        let removed = self.store.remove(key).is_some();
        if removed {
            self.live_count.fetch_sub(1, Ordering::AcqRel);
        }
        removed
    }

    fn remove_expired(&self, key: &str, now: DateTime<Utc>) -> SweepOutcome {
        if self.evict_if_expired(key, now) {
            return SweepOutcome::Removed;
        }
        match self.store.get(key) {
            Some(entry) => SweepOutcome::Live(entry.expires_at()),
            None => SweepOutcome::Absent,
        }
    }

    fn count(&self) -> usize {
        self.live_count.load(Ordering::Acquire).max(0) as usize
    }

    fn dump(&self, include_expired: bool) -> HashMap<String, String> {
        self.dump_at(include_expired, Utc::now())
    }
}

impl fmt::Debug for MemoryShard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryShard")
            .field("entries", &self.store.len())
            .field("live_count", &self.live_count.load(Ordering::Relaxed))
            .field("options", &self.options)
            .finish()
    }
}
