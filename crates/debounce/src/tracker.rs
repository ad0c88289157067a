//! Persistence tracker over the raw sample stream

use crate::DwellPolicy;
use chrono::{DateTime, Duration, Utc};
use sync_status::{ConfirmedState, StatusCategory, StatusSample};
use tracing::debug;

/// Result of feeding one sample (or one observation gap) to the tracker
#[derive(Debug, Clone)]
pub struct DebounceUpdate {
    /// Whether the confirmed category changed on this call
    pub changed: bool,
    /// Current confirmed state
    pub confirmed: ConfirmedState,
    /// Elapsed dwell of the confirmed category
    pub dwell: Duration,
    /// Whether the category has dwelled past its required threshold
    pub persisted: bool,
}

/// Converts raw samples into a confirmed state with per-category dwell.
///
/// A raw transition is confirmed provisionally on the tick it is first seen;
/// the `persisted` flag only turns true once the category has been observed
/// continuously for its required dwell, and remediation keys off that flag.
pub struct PersistenceTracker {
    policy: DwellPolicy,
    confirmed: Option<ConfirmedState>,
}

impl PersistenceTracker {
    pub fn new(policy: DwellPolicy) -> Self {
        Self {
            policy,
            confirmed: None,
        }
    }

    /// Dwell policy in effect
    pub fn policy(&self) -> &DwellPolicy {
        &self.policy
    }

    /// Current confirmed state, if any sample has been seen yet
    pub fn confirmed(&self) -> Option<&ConfirmedState> {
        self.confirmed.as_ref()
    }

    /// Feed one raw sample. The first sample ever, and any sample whose
    /// category differs from the current confirmed one, resets the dwell
    /// timer to the sample timestamp and reports a change.
    pub fn update(&mut self, sample: &StatusSample) -> DebounceUpdate {
        let changed = self
            .confirmed
            .as_ref()
            .map_or(true, |c| c.category != sample.category);

        if changed {
            debug!(
                from = ?self.confirmed.as_ref().map(|c| c.category),
                to = %sample.category,
                "raw status transition, dwell timer reset"
            );
            self.confirmed = Some(ConfirmedState::new(sample.category, sample.timestamp));
        }

        self.snapshot(sample.timestamp, changed)
    }

    /// Observation gap: the observer call failed or timed out. Reports the
    /// elapsed dwell of whatever is currently confirmed without resetting
    /// the timer. With no prior sample the stream starts as `Unknown`.
    pub fn hold(&mut self, now: DateTime<Utc>) -> DebounceUpdate {
        if self.confirmed.is_none() {
            self.confirmed = Some(ConfirmedState::new(StatusCategory::Unknown, now));
            return self.snapshot(now, true);
        }
        self.snapshot(now, false)
    }

    /// Record the outage start on the stored confirmed state so downstream
    /// consumers see it on later updates.
    pub fn set_source_outage(&mut self, start: Option<DateTime<Utc>>) {
        if let Some(confirmed) = self.confirmed.as_mut() {
            confirmed.source_outage_start = start;
        }
    }

    fn snapshot(&self, now: DateTime<Utc>, changed: bool) -> DebounceUpdate {
        // Both callers set `confirmed` before calling snapshot
        let confirmed = self
            .confirmed
            .clone()
            .unwrap_or_else(|| ConfirmedState::new(StatusCategory::Unknown, now));
        let dwell = now - confirmed.first_observed_at;
        let persisted = dwell >= self.policy.required(confirmed.category);

        DebounceUpdate {
            changed,
            confirmed,
            dwell,
            persisted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn sample(secs: i64, category: StatusCategory) -> StatusSample {
        StatusSample::new(at(secs), category, category != StatusCategory::NotRunning)
    }

    #[test]
    fn test_first_sample_confirms_immediately() {
        let mut tracker = PersistenceTracker::new(DwellPolicy::default());
        let update = tracker.update(&sample(0, StatusCategory::Ok));

        assert!(update.changed);
        assert_eq!(update.confirmed.category, StatusCategory::Ok);
        assert_eq!(update.dwell, Duration::zero());
    }

    #[test]
    fn test_transition_resets_dwell_timer() {
        let mut tracker = PersistenceTracker::new(DwellPolicy::default());
        tracker.update(&sample(0, StatusCategory::Ok));
        tracker.update(&sample(60, StatusCategory::Ok));

        let update = tracker.update(&sample(120, StatusCategory::Error));
        assert!(update.changed);
        assert_eq!(update.dwell, Duration::zero());
        assert!(!update.persisted);

        let update = tracker.update(&sample(150, StatusCategory::Error));
        assert!(!update.changed);
        assert_eq!(update.dwell, Duration::seconds(30));
        assert!(update.persisted);
    }

    #[test]
    fn test_persistence_threshold_is_per_category() {
        let mut tracker = PersistenceTracker::new(DwellPolicy::default());
        tracker.update(&sample(0, StatusCategory::NotRunning));

        // NOT_RUNNING persists after 10s, PAUSED needs 90s
        assert!(tracker.update(&sample(10, StatusCategory::NotRunning)).persisted);

        tracker.update(&sample(11, StatusCategory::Paused));
        assert!(!tracker.update(&sample(61, StatusCategory::Paused)).persisted);
        assert!(tracker.update(&sample(101, StatusCategory::Paused)).persisted);
    }

    #[test]
    fn test_hold_does_not_reset_dwell() {
        let mut tracker = PersistenceTracker::new(DwellPolicy::default());
        tracker.update(&sample(0, StatusCategory::NotRunning));

        let held = tracker.hold(at(6));
        assert!(!held.changed);
        assert_eq!(held.confirmed.category, StatusCategory::NotRunning);
        assert_eq!(held.dwell, Duration::seconds(6));

        // Dwell kept accumulating through the gap
        let update = tracker.update(&sample(12, StatusCategory::NotRunning));
        assert!(!update.changed);
        assert!(update.persisted);
    }

    #[test]
    fn test_hold_with_no_history_starts_unknown() {
        let mut tracker = PersistenceTracker::new(DwellPolicy::default());
        let held = tracker.hold(at(0));

        assert!(held.changed);
        assert_eq!(held.confirmed.category, StatusCategory::Unknown);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn category_strategy() -> impl Strategy<Value = StatusCategory> {
            prop_oneof![
                Just(StatusCategory::Ok),
                Just(StatusCategory::Syncing),
                Just(StatusCategory::Error),
                Just(StatusCategory::NotRunning),
                Just(StatusCategory::Paused),
            ]
        }

        proptest! {
            // A category is only ever reported persisted once it has been
            // continuously observed for at least its required dwell.
            #[test]
            fn persisted_implies_continuous_dwell(seq in prop::collection::vec(category_strategy(), 1..80)) {
                let policy = DwellPolicy::default();
                let mut tracker = PersistenceTracker::new(policy.clone());
                let mut run_started = 0i64;

                for (tick, &category) in seq.iter().enumerate() {
                    let tick = tick as i64;
                    let update = tracker.update(&sample(tick, category));
                    if update.changed {
                        run_started = tick;
                    }
                    let continuous = Duration::seconds(tick - run_started);
                    prop_assert_eq!(update.persisted, continuous >= policy.required(category));
                }
            }
        }
    }
}
