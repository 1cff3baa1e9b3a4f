//! Event notifications emitted by the table.
//!
//! Observers are told what happened after the table lock has been released,
//! in order per calling thread. Events from racing threads may interleave
//! differently from the order their operations took effect. Observers return
//! nothing and cannot affect the outcome of the operation that produced the
//! event.

use crate::error::ValidationError;
use log::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent<'a> {
    Inserted { key: &'a str },
    DuplicateRejected { key: &'a str },
    InsertRejected { key: &'a str, error: &'a ValidationError },
    Removed { key: &'a str },
    RemoveMissed { key: &'a str },
    Updated { key: &'a str },
    UpdateMissed { key: &'a str },
    UpdateRejected { key: &'a str, error: &'a ValidationError },
    /// Growth was triggered; `load_factor` is the value that exceeded the limit.
    RehashStarted { load_factor: f64, bucket_count: usize },
    RehashCompleted { bucket_count: usize },
    /// Contents were swapped in from another table or reset.
    Replaced { element_count: usize },
    SearchCompleted { matches: usize },
}

pub trait Observer: Send + Sync {
    fn notify(&self, event: &TableEvent<'_>);
}

/// Discards every event.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    #[inline]
    fn notify(&self, _event: &TableEvent<'_>) {}
}

/// Forwards events to the `log` facade. The default observer of a table.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn notify(&self, event: &TableEvent<'_>) {
        match *event {
            TableEvent::Inserted { key } => info!("record inserted: {}", key),
            TableEvent::DuplicateRejected { key } => warn!("duplicate record key attempted: {}", key),
            TableEvent::InsertRejected { key, error } => {
                error!("record validation failed for {}: {}", key, error)
            }
            TableEvent::Removed { key } => info!("record removed: {}", key),
            TableEvent::RemoveMissed { key } => warn!("record not found for removal: {}", key),
            TableEvent::Updated { key } => info!("record updated: {}", key),
            TableEvent::UpdateMissed { key } => warn!("record not found for update: {}", key),
            TableEvent::UpdateRejected { key, error } => {
                error!("record update validation failed for {}: {}", key, error)
            }
            TableEvent::RehashStarted {
                load_factor,
                bucket_count,
            } => info!(
                "rehashing {} buckets, current load factor: {:.3}",
                bucket_count, load_factor
            ),
            TableEvent::RehashCompleted { bucket_count } => {
                info!("rehashing completed, new bucket count: {}", bucket_count)
            }
            TableEvent::Replaced { element_count } => {
                info!("table contents replaced, {} records", element_count)
            }
            TableEvent::SearchCompleted { matches } => {
                debug!("search completed, found {} results", matches)
            }
        }
    }
}
