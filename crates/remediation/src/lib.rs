//! Remediation Controller
//!
//! Decides when a persisted bad state warrants restarting the monitored
//! process, subject to a cooldown, an hourly action budget, and a
//! post-restart grace period before a restart is judged ineffective.

mod controller;
mod executor;

pub use controller::{RemediationConfig, RemediationController, RemediationDecision};
pub use executor::{ProcessRestart, ProcessRestartConfig, RestartError, RestartExecutor};
