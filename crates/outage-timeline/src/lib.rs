//! Outage Timeline Tracker
//!
//! Remembers when the current non-OK streak began. A freshly opened outage
//! is seeded from the history store, so a monitor restart in the middle of
//! an outage reports the true original start time instead of resetting the
//! clock.

use chrono::{DateTime, Utc};
use history_store::HistoryStore;
use sync_status::StatusCategory;
use tracing::{debug, info};

/// Current outage window. `None` while the confirmed category is `OK`.
#[derive(Debug, Default)]
pub struct OutageTimeline {
    outage_started_at: Option<DateTime<Utc>>,
}

impl OutageTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start of the current outage, if one is open
    pub fn outage_start(&self) -> Option<DateTime<Utc>> {
        self.outage_started_at
    }

    /// Update the timeline for a confirmed-state change. Idempotent while an
    /// outage stays open: the start time never moves forward.
    pub fn on_confirmed_change(
        &mut self,
        category: StatusCategory,
        now: DateTime<Utc>,
        history: &dyn HistoryStore,
    ) -> Option<DateTime<Utc>> {
        if category == StatusCategory::Ok {
            if self.outage_started_at.take().is_some() {
                info!("outage closed");
            }
            return None;
        }

        if self.outage_started_at.is_none() {
            let seeded = Self::seed_from_history(history).unwrap_or(now);
            // A seed ahead of the clock would make the outage look negative
            let start = seeded.min(now);
            info!(start = %start, "outage opened");
            self.outage_started_at = Some(start);
        } else {
            debug!(start = ?self.outage_started_at, "outage already open");
        }

        self.outage_started_at
    }

    /// Earliest record after the most recent OK; with no OK on record, the
    /// earliest record overall; with an empty store, nothing.
    fn seed_from_history(history: &dyn HistoryStore) -> Option<DateTime<Utc>> {
        match history.last_ok_timestamp() {
            Some(last_ok) => history.first_record_after(last_ok),
            None => history.earliest_record_timestamp(),
        }
    }
}
