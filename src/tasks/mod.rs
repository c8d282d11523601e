//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - TTL Cleanup: Removes entries whose recorded expiry has passed

mod cleanup;

pub use cleanup::{spawn_cleanup_task, CleanupReport, CleanupService};
