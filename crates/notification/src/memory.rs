//! Per-incident notification bookkeeping

use crate::{classify, Intent};
use sync_status::StatusCategory;

/// Tracks what the classifier needs between confirmed changes: the previous
/// confirmed category, whether the current incident has been announced, and
/// the category that preceded the current run of SYNCING.
#[derive(Debug, Clone)]
pub struct NotificationMemory {
    last_confirmed: Option<StatusCategory>,
    incident_notified: bool,
    first_evaluation: bool,
    pending_transient_predecessor: Option<StatusCategory>,
}

impl NotificationMemory {
    pub fn new() -> Self {
        Self {
            last_confirmed: None,
            incident_notified: false,
            first_evaluation: true,
            pending_transient_predecessor: None,
        }
    }

    /// Previous confirmed category seen by the classifier
    pub fn last_confirmed(&self) -> Option<StatusCategory> {
        self.last_confirmed
    }

    /// Whether the current incident has already been announced
    pub fn incident_notified(&self) -> bool {
        self.incident_notified
    }

    /// Classify a confirmed-state change and advance the tracking state.
    /// Call only when the confirmed category actually changed.
    pub fn on_confirmed_change(&mut self, curr: StatusCategory) -> Vec<Intent> {
        let prev = self.last_confirmed;
        let intents = classify(
            prev,
            curr,
            self.first_evaluation,
            self.pending_transient_predecessor,
        );

        if curr == StatusCategory::Syncing {
            if prev != Some(StatusCategory::Syncing) {
                self.pending_transient_predecessor = prev;
            }
        } else {
            self.pending_transient_predecessor = None;
        }

        self.last_confirmed = Some(curr);
        self.first_evaluation = false;
        intents
    }

    /// Record that an intent was handed to the dispatcher. Incident-style
    /// intents arm the flag, resolution-style intents clear it; the flag
    /// must never cause a second announcement for an incident.
    pub fn on_dispatched(&mut self, intent: Intent) {
        match intent {
            Intent::Incident | Intent::Transient => self.incident_notified = true,
            Intent::Resolved | Intent::Ok => self.incident_notified = false,
            Intent::RemediationError => {}
        }
    }
}

impl Default for NotificationMemory {
    fn default() -> Self {
        Self::new()
    }
}
