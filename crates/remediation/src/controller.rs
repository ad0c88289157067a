//! Restart decision state machine

use crate::{RestartError, RestartExecutor};
use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use debounce::DwellPolicy;
use serde::{Deserialize, Serialize};
use sync_status::{ConfirmedState, StatusCategory};
use tracing::{debug, error, info, warn};

/// Remediation policy knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    /// Minimum gap between restart attempts
    pub cooldown_seconds: u64,
    /// Restart budget per wall-clock hour
    pub max_per_hour: u32,
    /// How long SYNCING may run (measured from the outage start) before it
    /// is escalated to a restart. Decoupled from the SYNCING dwell; 0
    /// disables the escalation.
    pub syncing_stuck_timeout_seconds: u64,
    /// How long a restarted process gets to come back healthy before the
    /// attempt is judged ineffective
    pub failed_grace_seconds: u64,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 60,
            max_per_hour: 3,
            syncing_stuck_timeout_seconds: 600,
            failed_grace_seconds: 300,
        }
    }
}

/// Outcome of one remediation evaluation
#[derive(Debug, Clone)]
pub enum RemediationDecision {
    /// Nothing to do this tick
    NoAction,
    /// Restart was invoked successfully
    Restarted,
    /// A restart was warranted but the hourly budget is spent
    BudgetExhausted,
    /// The executor could not locate or launch the binary. Consumes no
    /// budget slot; operator intervention is needed.
    ExecutorFailed(RestartError),
    /// The state is still bad after a restart plus grace period
    RestartIneffective { attempted_at: DateTime<Utc> },
}

/// Decides whether to restart the monitored process this tick.
///
/// Evaluated every tick, not only on confirmed-state changes: a stuck state
/// produces no further change events, yet must still escalate.
pub struct RemediationController {
    config: RemediationConfig,
    dwell: DwellPolicy,
    attempts_this_window: u32,
    window_started_at: Option<DateTime<Utc>>,
    cooldown_ends_at: Option<DateTime<Utc>>,
    last_action_at: Option<DateTime<Utc>>,
    ineffective_reported: bool,
}

impl RemediationController {
    pub fn new(config: RemediationConfig, dwell: DwellPolicy) -> Self {
        Self {
            config,
            dwell,
            attempts_this_window: 0,
            window_started_at: None,
            cooldown_ends_at: None,
            last_action_at: None,
            ineffective_reported: false,
        }
    }

    /// Restart attempts in the current budget window
    pub fn attempts_this_window(&self) -> u32 {
        self.attempts_this_window
    }

    /// When the last restart was taken, if any
    pub fn last_action_at(&self) -> Option<DateTime<Utc>> {
        self.last_action_at
    }

    /// Evaluate the confirmed state and possibly invoke the executor.
    pub async fn consider(
        &mut self,
        confirmed: &ConfirmedState,
        dwell: Duration,
        outage_start: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        executor: &dyn RestartExecutor,
    ) -> RemediationDecision {
        let category = confirmed.category;

        if !category.triggers_remediation() && category != StatusCategory::Syncing {
            // UNKNOWN is inert both ways: no action, but it also cannot
            // clear a live cooldown the way a healthy reading does.
            if category == StatusCategory::Ok {
                self.reset_on_healthy();
            }
            self.roll_window(now);
            return RemediationDecision::NoAction;
        }

        self.roll_window(now);

        if dwell < self.dwell.required(category) {
            debug!(
                category = %category,
                dwell_s = dwell.num_seconds(),
                "not persisted long enough for remediation"
            );
            return RemediationDecision::NoAction;
        }

        // A fresh restart gets its grace period before anything else happens;
        // once it expires with the state still bad, report that once.
        if let Some(attempted_at) = self.last_action_at {
            let grace = Duration::seconds(self.config.failed_grace_seconds as i64);
            if now - attempted_at < grace {
                debug!("within post-restart grace period, holding off");
                return RemediationDecision::NoAction;
            }
            if !self.ineffective_reported {
                self.ineffective_reported = true;
                warn!(
                    category = %category,
                    attempted_at = %attempted_at,
                    "state still bad after restart and grace period"
                );
                return RemediationDecision::RestartIneffective { attempted_at };
            }
        }

        if self.in_cooldown(now) {
            debug!("remediation cooldown active");
            return RemediationDecision::NoAction;
        }

        if category == StatusCategory::Syncing {
            let timeout = self.config.syncing_stuck_timeout_seconds;
            if timeout == 0 {
                return RemediationDecision::NoAction;
            }
            let since = outage_start.unwrap_or(confirmed.first_observed_at);
            let stuck_for = now - since;
            if stuck_for < Duration::seconds(timeout as i64) {
                return RemediationDecision::NoAction;
            }
            warn!(
                stuck_s = stuck_for.num_seconds(),
                timeout_s = timeout,
                "SYNCING exceeded stuck timeout, escalating to restart"
            );
        }

        if self.attempts_this_window >= self.config.max_per_hour {
            warn!(
                attempts = self.attempts_this_window,
                max = self.config.max_per_hour,
                "restart budget exhausted, skipping remediation"
            );
            return RemediationDecision::BudgetExhausted;
        }

        info!(category = %category, "triggering restart of monitored process");
        match executor.restart().await {
            Ok(()) => {
                self.attempts_this_window += 1;
                self.cooldown_ends_at =
                    Some(now + Duration::seconds(self.config.cooldown_seconds as i64));
                self.last_action_at = Some(now);
                self.ineffective_reported = false;
                RemediationDecision::Restarted
            }
            Err(e) => {
                error!("restart executor failed: {}", e);
                RemediationDecision::ExecutorFailed(e)
            }
        }
    }

    fn in_cooldown(&self, now: DateTime<Utc>) -> bool {
        self.cooldown_ends_at.map_or(false, |ends| now < ends)
    }

    fn reset_on_healthy(&mut self) {
        self.cooldown_ends_at = None;
        self.last_action_at = None;
        self.ineffective_reported = false;
    }

    fn roll_window(&mut self, now: DateTime<Utc>) {
        match self.window_started_at {
            None => self.window_started_at = Some(now),
            Some(started) if hour_changed(started, now) => {
                debug!(attempts = self.attempts_this_window, "hour boundary advanced, budget reset");
                self.attempts_this_window = 0;
                self.window_started_at = Some(now);
            }
            Some(_) => {}
        }
    }
}

fn hour_changed(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() != b.date_naive() || a.hour() != b.hour()
}
