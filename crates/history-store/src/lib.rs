//! Status History Store
//!
//! Append-only record of observed statuses, queried by the outage timeline
//! to recover the true start of an in-progress outage across monitor
//! restarts. Persistence mechanics live behind the `HistoryStore` trait;
//! this crate ships the bounded in-memory implementation.

mod memory;

pub use memory::InMemoryHistory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sync_status::StatusCategory;

/// One history record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: StatusCategory,
    pub detail: String,
    /// True if this entry recorded a confirmed-state change (as opposed to
    /// a periodic heartbeat)
    pub is_change: bool,
}

/// Query/append surface consumed by the outage timeline and the tick loop
pub trait HistoryStore: Send + Sync {
    /// Timestamp of the most recent `OK` record, if any
    fn last_ok_timestamp(&self) -> Option<DateTime<Utc>>;

    /// Timestamp of the earliest record in the store, if any
    fn earliest_record_timestamp(&self) -> Option<DateTime<Utc>>;

    /// Timestamp of the earliest record strictly after `after`, if any
    fn first_record_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>>;

    /// Append a record
    fn append(&self, entry: HistoryEntry);
}
