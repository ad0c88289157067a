//! Status report snapshot written to the status file

use crate::StatusCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of the monitor's view of the sync client, written atomically to
/// the status file on every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    /// When this report was produced
    pub timestamp: DateTime<Utc>,
    /// Confirmed category at report time
    pub category: StatusCategory,
    /// Observer detail for the current sample
    pub detail: String,
    /// Whether the monitored process was alive
    pub process_alive: bool,
    /// Human-readable message for the category
    pub message: String,
    /// Start of the current outage, if one is open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_of_sync_since: Option<DateTime<Utc>>,
}

impl StatusReport {
    /// Build a report for the given category, filling in its stock message
    pub fn new(
        timestamp: DateTime<Utc>,
        category: StatusCategory,
        detail: impl Into<String>,
        process_alive: bool,
        out_of_sync_since: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            timestamp,
            category,
            detail: detail.into(),
            process_alive,
            message: category.message().to_string(),
            out_of_sync_since,
        }
    }
}
