//! Cache Entry Module
//!
//! Defines the immutable value record stored by each shard.

use chrono::{DateTime, TimeDelta, Utc};

// == Cache Entry ==
/// A stored value with an optional absolute expiry.
///
/// Entries are never mutated; an overwrite always stores a fresh entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring at `expires_at` (None = never).
    pub fn new(value: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { value, expires_at }
    }

    /// Creates an entry whose expiry is `ttl_seconds` after `now`.
    ///
    /// A missing or zero TTL produces an entry that never expires.
    pub fn with_ttl(value: String, ttl_seconds: Option<u64>, now: DateTime<Utc>) -> Self {
        Self::new(value, expiry_from_ttl(now, ttl_seconds))
    }

    /// The stored value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Absolute expiry, if any.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }
}

// == Utility Functions ==
/// Converts a relative TTL into an absolute expiry.
///
/// Returns None for a missing or zero TTL, and for TTLs too large to
/// represent as a timestamp (those entries effectively never expire).
pub fn expiry_from_ttl(now: DateTime<Utc>, ttl_seconds: Option<u64>) -> Option<DateTime<Utc>> {
    let ttl = ttl_seconds.filter(|ttl| *ttl > 0)?;
    let ttl = i64::try_from(ttl).ok().and_then(TimeDelta::try_seconds)?;
    now.checked_add_signed(ttl)
}
