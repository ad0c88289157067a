//! Bounded in-memory history

use crate::{HistoryEntry, HistoryStore};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use sync_status::StatusCategory;
use tracing::info;

const DEFAULT_MAX_RECORDS: usize = 10_000;

/// In-memory history with retention enforcement. Oldest records are dropped
/// once the cap is reached.
pub struct InMemoryHistory {
    entries: Mutex<VecDeque<HistoryEntry>>,
    max_records: usize,
}

impl InMemoryHistory {
    pub fn new(max_records: usize) -> Self {
        info!("Creating in-memory history (retention: {} records)", max_records);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(max_records.min(1024))),
            max_records,
        }
    }

    /// Number of records currently retained
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recent records, newest first
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .map(|e| e.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Drop all records (for testing)
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECORDS)
    }
}

impl HistoryStore for InMemoryHistory {
    fn last_ok_timestamp(&self) -> Option<DateTime<Utc>> {
        self.entries.lock().ok().and_then(|entries| {
            entries
                .iter()
                .rev()
                .find(|e| e.category == StatusCategory::Ok)
                .map(|e| e.timestamp)
        })
    }

    fn earliest_record_timestamp(&self) -> Option<DateTime<Utc>> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.front().map(|e| e.timestamp))
    }

    fn first_record_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.entries.lock().ok().and_then(|entries| {
            entries
                .iter()
                .find(|e| e.timestamp > after)
                .map(|e| e.timestamp)
        })
    }

    fn append(&self, entry: HistoryEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            // A cap of zero means unbounded
            while self.max_records > 0 && entries.len() >= self.max_records {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }
}
