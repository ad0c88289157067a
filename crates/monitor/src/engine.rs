//! The tick-evaluate-act loop

use crate::{write_status_atomic, MonitorConfig, StatusObserver};
use chrono::{DateTime, Duration, Utc};
use debounce::PersistenceTracker;
use history_store::{HistoryEntry, HistoryStore};
use notification::{Intent, Notification, NotificationDispatcher, NotificationMemory};
use outage_timeline::OutageTimeline;
use remediation::{RemediationController, RemediationDecision, RestartExecutor};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use sync_status::{StatusCategory, StatusReport};
use tokio::sync::watch;
use tokio::time::{timeout, MissedTickBehavior};
use tracing::{error, info, warn};

/// Owns all decision state and drives one evaluation per tick. Single
/// writer: no other task touches the tracker, timeline, controller, or
/// notification memory.
pub struct MonitorEngine {
    interval: StdDuration,
    call_timeout: StdDuration,
    heartbeat_interval: Duration,
    status_path: PathBuf,
    tracker: PersistenceTracker,
    timeline: OutageTimeline,
    controller: RemediationController,
    memory: NotificationMemory,
    observer: Box<dyn StatusObserver>,
    executor: Box<dyn RestartExecutor>,
    dispatcher: Box<dyn NotificationDispatcher>,
    history: Arc<dyn HistoryStore>,
    last_history_at: Option<DateTime<Utc>>,
    last_logged: String,
    tick_count: u64,
    current_detail: String,
    process_alive: bool,
}

impl MonitorEngine {
    pub fn new(
        config: MonitorConfig,
        observer: Box<dyn StatusObserver>,
        executor: Box<dyn RestartExecutor>,
        dispatcher: Box<dyn NotificationDispatcher>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            interval: StdDuration::from_secs(config.check_interval_seconds),
            call_timeout: StdDuration::from_secs(config.call_timeout_seconds),
            heartbeat_interval: Duration::seconds(config.heartbeat_interval_seconds as i64),
            status_path: config.status_file.clone(),
            tracker: PersistenceTracker::new(config.dwell.clone()),
            timeline: OutageTimeline::new(),
            controller: RemediationController::new(config.remediation.clone(), config.dwell),
            memory: NotificationMemory::new(),
            observer,
            executor,
            dispatcher,
            history,
            last_history_at: None,
            last_logged: String::new(),
            tick_count: 0,
            current_detail: String::new(),
            process_alive: false,
        }
    }

    /// Run until the shutdown signal flips. The signal is checked at the
    /// top of every iteration; an evaluation in flight always completes, so
    /// no decision is left half-committed.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_s = self.interval.as_secs(),
            status_file = %self.status_path.display(),
            "monitor loop starting"
        );

        // Seed the status file so consumers never read an empty or stale one
        let initial = StatusReport::new(
            Utc::now(),
            StatusCategory::Unknown,
            "monitor starting",
            false,
            None,
        );
        if let Err(e) = write_status_atomic(&initial, &self.status_path) {
            warn!("failed to write initial status file: {}", e);
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("shutdown signal received, exiting monitor loop");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.evaluate(Utc::now()).await;
                }
            }
        }
    }

    /// One full evaluation: observe, debounce, track the outage, classify
    /// and dispatch notifications, record history, consider remediation,
    /// write the status snapshot. Every failure is contained to this tick.
    pub async fn evaluate(&mut self, now: DateTime<Utc>) {
        self.tick_count += 1;

        let update = match timeout(self.call_timeout, self.observer.sample()).await {
            Ok(Ok(sample)) => {
                self.current_detail = sample.detail.clone();
                self.process_alive = sample.process_alive;
                self.tracker.update(&sample)
            }
            Ok(Err(e)) => {
                warn!("status observation failed: {}", e);
                self.current_detail = format!("observation failed: {}", e);
                self.process_alive = false;
                self.tracker.hold(now)
            }
            Err(_) => {
                warn!(
                    timeout_s = self.call_timeout.as_secs(),
                    "status observation timed out"
                );
                self.current_detail = "observation timed out".to_string();
                self.process_alive = false;
                self.tracker.hold(now)
            }
        };

        let confirmed = update.confirmed.clone();
        let category = confirmed.category;

        if update.changed {
            let start = self
                .timeline
                .on_confirmed_change(category, now, self.history.as_ref());
            self.tracker.set_source_outage(start);
        }
        let outage_start = self.timeline.outage_start();

        if update.changed {
            let intents = self.memory.on_confirmed_change(category);
            for intent in intents {
                let notification = Notification::new(
                    intent,
                    category,
                    outage_start.unwrap_or(confirmed.first_observed_at),
                    self.reason_for(intent, category),
                );
                self.dispatch(&notification).await;
                self.memory.on_dispatched(intent);
            }
        }

        let heartbeat_due = self
            .last_history_at
            .map_or(true, |t| now - t >= self.heartbeat_interval);
        if update.changed || heartbeat_due {
            self.history.append(HistoryEntry {
                timestamp: now,
                category,
                detail: self.current_detail.clone(),
                is_change: update.changed,
            });
            self.last_history_at = Some(now);
        }

        let decision = match timeout(
            self.call_timeout,
            self.controller
                .consider(&confirmed, update.dwell, outage_start, now, self.executor.as_ref()),
        )
        .await
        {
            Ok(decision) => decision,
            Err(_) => {
                warn!(
                    timeout_s = self.call_timeout.as_secs(),
                    "remediation call timed out"
                );
                RemediationDecision::NoAction
            }
        };

        match decision {
            RemediationDecision::NoAction | RemediationDecision::Restarted => {}
            // Suppressed action, logged distinctly by the controller
            RemediationDecision::BudgetExhausted => {}
            RemediationDecision::ExecutorFailed(e) => {
                error!("remediation failed: {}", e);
                let notification = Notification::new(
                    Intent::RemediationError,
                    category,
                    outage_start.unwrap_or(now),
                    format!("Restart of the sync client failed: {}", e),
                );
                self.dispatch(&notification).await;
            }
            RemediationDecision::RestartIneffective { attempted_at } => {
                let notification = Notification::new(
                    Intent::RemediationError,
                    category,
                    outage_start.unwrap_or(now),
                    format!(
                        "Status is still {} after the restart at {}",
                        category, attempted_at
                    ),
                );
                self.dispatch(&notification).await;
            }
        }

        let report = StatusReport::new(
            now,
            category,
            self.current_detail.clone(),
            self.process_alive,
            outage_start,
        );
        if let Err(e) = write_status_atomic(&report, &self.status_path) {
            warn!("failed to write status file: {}", e);
        }

        let line = format!("status: {} | detail: {}", category, self.current_detail);
        if line != self.last_logged || self.tick_count % 20 == 0 {
            info!("{}", line);
            self.last_logged = line;
        }
    }

    fn reason_for(&self, intent: Intent, category: StatusCategory) -> String {
        match intent {
            Intent::Incident => {
                if self.current_detail.is_empty() {
                    category.message().to_string()
                } else {
                    format!("{}: {}", category.message(), self.current_detail)
                }
            }
            Intent::Resolved => "Synchronization incident resolved".to_string(),
            Intent::Transient => "Sync client is catching up".to_string(),
            Intent::Ok => category.message().to_string(),
            Intent::RemediationError => category.message().to_string(),
        }
    }

    async fn dispatch(&self, notification: &Notification) {
        match timeout(self.call_timeout, self.dispatcher.dispatch(notification)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("notification dispatch failed: {}", e),
            Err(_) => warn!(
                timeout_s = self.call_timeout.as_secs(),
                "notification dispatch timed out"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObserveError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use history_store::InMemoryHistory;
    use notification::DispatchError;
    use remediation::RestartError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use sync_status::StatusSample;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_002_800, 0).unwrap() + Duration::seconds(secs)
    }

    struct ScriptedObserver {
        samples: Mutex<VecDeque<Result<StatusSample, ObserveError>>>,
    }

    impl ScriptedObserver {
        fn new() -> Self {
            Self {
                samples: Mutex::new(VecDeque::new()),
            }
        }

        fn push(&self, secs: i64, category: StatusCategory) {
            self.samples
                .lock()
                .unwrap()
                .push_back(Ok(StatusSample::new(at(secs), category, true)));
        }

        fn push_error(&self) {
            self.samples
                .lock()
                .unwrap()
                .push_back(Err(ObserveError::Spawn("probe unavailable".to_string())));
        }
    }

    #[async_trait]
    impl StatusObserver for ScriptedObserver {
        async fn sample(&self) -> Result<StatusSample, ObserveError> {
            self.samples
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ObserveError::Spawn("script exhausted".to_string())))
        }
    }

    struct CountingExecutor {
        calls: AtomicU32,
        fail_with: Option<RestartError>,
    }

    #[async_trait]
    impl RestartExecutor for CountingExecutor {
        async fn restart(&self) -> Result<(), RestartError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    struct RecordingDispatcher {
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    struct Harness {
        engine: MonitorEngine,
        observer: Arc<ScriptedObserver>,
        executor: Arc<CountingExecutor>,
        dispatcher: Arc<RecordingDispatcher>,
        history: Arc<InMemoryHistory>,
    }

    // Arc-wrapped collaborators so the test keeps handles to the doubles
    // the engine owns.
    struct ArcObserver(Arc<ScriptedObserver>);
    struct ArcExecutor(Arc<CountingExecutor>);
    struct ArcDispatcher(Arc<RecordingDispatcher>);

    #[async_trait]
    impl StatusObserver for ArcObserver {
        async fn sample(&self) -> Result<StatusSample, ObserveError> {
            self.0.sample().await
        }
    }

    #[async_trait]
    impl RestartExecutor for ArcExecutor {
        async fn restart(&self) -> Result<(), RestartError> {
            self.0.restart().await
        }
    }

    #[async_trait]
    impl NotificationDispatcher for ArcDispatcher {
        async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError> {
            self.0.dispatch(notification).await
        }
    }

    fn harness(fail_with: Option<RestartError>) -> Harness {
        let observer = Arc::new(ScriptedObserver::new());
        let executor = Arc::new(CountingExecutor {
            calls: AtomicU32::new(0),
            fail_with,
        });
        let dispatcher = Arc::new(RecordingDispatcher {
            sent: Mutex::new(Vec::new()),
        });
        let history = Arc::new(InMemoryHistory::default());

        let config = MonitorConfig {
            status_file: std::env::temp_dir()
                .join(format!("syncwatch-engine-test-{:p}", Arc::as_ptr(&observer)))
                .join("status.json"),
            ..Default::default()
        };

        let engine = MonitorEngine::new(
            config,
            Box::new(ArcObserver(observer.clone())),
            Box::new(ArcExecutor(executor.clone())),
            Box::new(ArcDispatcher(dispatcher.clone())),
            history.clone(),
        );

        Harness {
            engine,
            observer,
            executor,
            dispatcher,
            history,
        }
    }

    fn intents(harness: &Harness) -> Vec<Intent> {
        harness
            .dispatcher
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.intent)
            .collect()
    }

    #[tokio::test]
    async fn test_incident_streak_notifies_once_and_restarts_once() {
        let mut h = harness(None);

        for t in 1..=5 {
            h.observer.push(t, StatusCategory::Ok);
        }
        for t in 6..=25 {
            h.observer.push(t, StatusCategory::NotRunning);
        }
        for t in 26..=27 {
            h.observer.push(t, StatusCategory::Ok);
        }

        for t in 1..=27 {
            h.engine.evaluate(at(t)).await;
        }

        // Startup confirmation, one incident for the whole streak, one
        // resolution when it clears
        assert_eq!(
            intents(&h),
            vec![Intent::Ok, Intent::Incident, Intent::Resolved]
        );
        // Restart fired once, ten seconds into the NOT_RUNNING streak
        assert_eq!(h.executor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_observation_failure_does_not_reset_dwell() {
        let mut h = harness(None);

        h.observer.push(1, StatusCategory::NotRunning);
        for _ in 2..=10 {
            h.observer.push_error();
        }
        h.observer.push(11, StatusCategory::NotRunning);

        for t in 1..=11 {
            h.engine.evaluate(at(t)).await;
        }

        // The gap did not restart the dwell clock: ten seconds after the
        // first NOT_RUNNING sample the restart goes out, and the streak was
        // announced exactly once.
        assert_eq!(h.executor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(intents(&h), vec![Intent::Incident]);
    }

    #[tokio::test]
    async fn test_failed_restart_surfaces_remediation_error() {
        let mut h = harness(Some(RestartError::NotFound));

        for t in 1..=12 {
            h.observer.push(t, StatusCategory::NotRunning);
        }
        for t in 1..=12 {
            h.engine.evaluate(at(t)).await;
        }

        let sent = intents(&h);
        assert_eq!(sent[0], Intent::Incident);
        // Attempted on every tick past the dwell; surfaced each time
        let errors = sent
            .iter()
            .filter(|i| **i == Intent::RemediationError)
            .count();
        assert_eq!(errors, 2);
        assert_eq!(h.executor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_outage_start_recovered_from_history() {
        let mut h = harness(None);

        // A previous monitor run recorded the outage beginning at t=-400
        h.history.append(HistoryEntry {
            timestamp: at(-500),
            category: StatusCategory::Ok,
            detail: String::new(),
            is_change: true,
        });
        h.history.append(HistoryEntry {
            timestamp: at(-400),
            category: StatusCategory::Error,
            detail: String::new(),
            is_change: true,
        });

        h.observer.push(0, StatusCategory::Error);
        h.engine.evaluate(at(0)).await;

        let sent = h.dispatcher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].intent, Intent::Incident);
        assert_eq!(sent[0].timestamp, at(-400));
    }

    #[tokio::test]
    async fn test_heartbeat_history_appends() {
        let mut h = harness(None);

        h.observer.push(0, StatusCategory::Ok);
        h.observer.push(60, StatusCategory::Ok);
        h.observer.push(360, StatusCategory::Ok);

        h.engine.evaluate(at(0)).await;
        h.engine.evaluate(at(60)).await;
        h.engine.evaluate(at(360)).await;

        // Change record at t=0, nothing at t=60, heartbeat at t=360
        assert_eq!(h.history.len(), 2);
        let recent = h.history.recent(2);
        assert!(!recent[0].is_change);
        assert!(recent[1].is_change);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_exits_loop() {
        let mut h = harness(None);
        h.observer.push(0, StatusCategory::Ok);

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        // Returns instead of ticking forever
        h.engine.run(rx).await;
    }
}
