//! TTL Cleanup Task
//!
//! Background sweep that removes entries whose recorded expiry has passed,
//! independently of request traffic.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::cache::{ExpirationTracker, ShardedCacheService, SweepOutcome};

/// Totals for one sweep cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Distinct keys the tracker reported as due
    pub due: usize,
    /// Entries actually removed from the cache
    pub removed: usize,
}

// == Cleanup Service ==
/// Periodic sweep driven by the [`ExpirationTracker`].
///
/// Due keys are removed through [`ShardedCacheService`], the same routing
/// path requests use.
#[derive(Debug, Clone)]
pub struct CleanupService {
    cache: Arc<ShardedCacheService>,
    tracker: Arc<ExpirationTracker>,
    interval: Duration,
}

impl CleanupService {
    /// Creates a sweep running every `interval`.
    pub fn new(
        cache: Arc<ShardedCacheService>,
        tracker: Arc<ExpirationTracker>,
        interval: Duration,
    ) -> Self {
        Self {
            cache,
            tracker,
            interval,
        }
    }

    /// Interval between cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    // == One Cycle ==
    /// Sweeps every key due as of `now`.
    ///
    /// Tracker hits are only candidates: a key rewritten after registration is
    /// left alone. Only registrations due as of `now` are purged, so the
    /// expiry of a newer write stays tracked.
    pub fn run_cycle(&self, now: DateTime<Utc>) -> CleanupReport {
        let due: HashSet<String> = self.tracker.get_expired_keys(now).into_iter().collect();
        if due.is_empty() {
            return CleanupReport::default();
        }

        let removed = due
            .iter()
            .filter(|key| self.cache.remove_expired(key, now) == SweepOutcome::Removed)
            .count();
        self.tracker.remove_due(&due, now);

        CleanupReport {
            due: due.len(),
            removed,
        }
    }

    // == Loop ==
    /// Runs cycles until `shutdown` flips to true or its sender is dropped.
    ///
    /// A panicking cycle is logged and the loop carries on at the next tick.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs_f64(),
            "Starting TTL cleanup task"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let now = Utc::now();
            match panic::catch_unwind(AssertUnwindSafe(|| self.run_cycle(now))) {
                Ok(report) if report.removed > 0 => {
                    info!(
                        removed = report.removed,
                        due = report.due,
                        "TTL cleanup: removed expired entries"
                    );
                }
                Ok(report) => {
                    debug!(due = report.due, "TTL cleanup: no expired entries removed");
                }
                Err(panic_info) => {
                    let message = panic_info
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic_info.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    error!(error = %message, "Error during background cleanup");
                }
            }
        }

        info!("TTL cleanup task stopped");
    }
}

/// Spawns a [`CleanupService`] loop on the tokio runtime.
///
/// Send `true` on the paired `watch::Sender` (or drop it) to stop the task,
/// then await the returned handle.
///
/// # Example
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let handle = spawn_cleanup_task(cache, tracker, Duration::from_secs(10), shutdown_rx);
/// // Later, during shutdown:
/// shutdown_tx.send(true)?;
/// handle.await?;
/// ```
pub fn spawn_cleanup_task(
    cache: Arc<ShardedCacheService>,
    tracker: Arc<ExpirationTracker>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(CleanupService::new(cache, tracker, interval).run(shutdown))
}
