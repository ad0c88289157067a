//! Per-tick samples and the debounced confirmed state

use crate::StatusCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw observation, produced once per tick by the status observer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSample {
    /// When the observation was taken
    pub timestamp: DateTime<Utc>,
    /// Observed category
    pub category: StatusCategory,
    /// Free-text detail from the observer (tooltip text, error string, ...)
    pub detail: String,
    /// Whether the monitored process was alive at observation time
    pub process_alive: bool,
}

impl StatusSample {
    /// Build a sample with empty detail
    pub fn new(timestamp: DateTime<Utc>, category: StatusCategory, process_alive: bool) -> Self {
        Self {
            timestamp,
            category,
            detail: String::new(),
            process_alive,
        }
    }
}

/// The debounced state accepted as real. Replaced wholesale whenever the
/// confirmed category changes, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedState {
    /// Confirmed category
    pub category: StatusCategory,
    /// When this category was first observed in the current raw streak
    pub first_observed_at: DateTime<Utc>,
    /// Start of the surrounding outage, if one is open
    pub source_outage_start: Option<DateTime<Utc>>,
}

impl ConfirmedState {
    /// New confirmed state starting at `first_observed_at`
    pub fn new(category: StatusCategory, first_observed_at: DateTime<Utc>) -> Self {
        Self {
            category,
            first_observed_at,
            source_outage_start: None,
        }
    }
}
