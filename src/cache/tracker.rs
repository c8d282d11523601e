//! Expiration Tracker Module
//!
//! Records (key, expiry) registrations made by TTL writes so the background
//! sweep can find due keys without scanning every shard.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// One registration made by a TTL write.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackedExpiry {
    key: String,
    expires_at: DateTime<Utc>,
}

// == Expiration Tracker ==
/// Append-mostly log of pending expirations shared by all shards.
///
/// A key may appear several times (or with an outdated expiry) when it was
/// rewritten before the sweep purged its earlier registration. Keys returned
/// by [`get_expired_keys`](Self::get_expired_keys) are only candidates: the
/// stored entry must be re-checked before it is removed.
#[derive(Debug, Default)]
pub struct ExpirationTracker {
    entries: Mutex<Vec<TrackedExpiry>>,
}

impl ExpirationTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Add ==
    /// Registers `key` as due at `expires_at`. O(1) amortized.
    pub fn add(&self, key: &str, expires_at: DateTime<Utc>) {
        self.entries.lock().push(TrackedExpiry {
            key: key.to_owned(),
            expires_at,
        });
    }

    // == Get Expired Keys ==
    /// Returns every tracked key whose expiry is at or before `now`.
    ///
    /// Read-only; duplicates are preserved in registration order.
    pub fn get_expired_keys(&self, now: DateTime<Utc>) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|tracked| tracked.expires_at <= now)
            .map(|tracked| tracked.key.clone())
            .collect()
    }

    // == Remove Keys ==
    /// Purges all registrations for the given keys, returning how many were dropped.
    ///
    /// Rebuilds the backing log, O(n).
    pub fn remove_keys<I, S>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.purge(keys, |_| true)
    }

    // == Remove Due ==
    /// Purges the registrations of `keys` that are due as of `now`, returning
    /// how many were dropped.
    ///
    /// Registrations for the same keys expiring after `now` are kept, so a
    /// TTL write racing the sweep is not forgotten. Rebuilds the backing log,
    /// O(n). Intended for the cleanup cycle only.
    pub fn remove_due<I, S>(&self, keys: I, now: DateTime<Utc>) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.purge(keys, |tracked| tracked.expires_at <= now)
    }

    fn purge<I, S, F>(&self, keys: I, doomed_if: F) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&TrackedExpiry) -> bool,
    {
        let doomed: HashSet<String> = keys
            .into_iter()
            .map(|key| key.as_ref().to_owned())
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|tracked| !(doomed.contains(&tracked.key) && doomed_if(tracked)));
        before - entries.len()
    }

    /// Number of registrations currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
