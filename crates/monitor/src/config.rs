//! Monitor configuration

use config::{Config, ConfigError, Environment, File};
use debounce::DwellPolicy;
use remediation::{ProcessRestartConfig, RemediationConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Status probe configuration. The command must print a line of the form
/// `CATEGORY [detail...]` on stdout (e.g. `SYNCING uploading 3 files`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    pub command: Option<String>,
    pub args: Vec<String>,
}

/// Top-level configuration for the monitor loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Tick period
    pub check_interval_seconds: u64,
    /// Timeout applied to each collaborator call (observer, restart,
    /// notification channel)
    pub call_timeout_seconds: u64,
    /// Where the status snapshot is written each tick
    pub status_file: PathBuf,
    /// Period between heartbeat history records while the status is stable
    pub heartbeat_interval_seconds: u64,
    /// Retention cap for the in-memory history
    pub history_max_records: usize,
    /// Per-category debounce thresholds
    pub dwell: DwellPolicy,
    /// Restart policy
    pub remediation: RemediationConfig,
    /// Status probe
    pub observer: ObserverConfig,
    /// Restart mechanics for the monitored process
    pub restart: ProcessRestartConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: 60,
            call_timeout_seconds: 10,
            status_file: PathBuf::from("status.json"),
            heartbeat_interval_seconds: 300,
            history_max_records: 10_000,
            dwell: DwellPolicy::default(),
            remediation: RemediationConfig::default(),
            observer: ObserverConfig::default(),
            restart: ProcessRestartConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from an optional file layered under
    /// `SYNCWATCH_`-prefixed environment overrides. A missing file yields
    /// the defaults.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path.unwrap_or("syncwatch")).required(false))
            .add_source(Environment::with_prefix("SYNCWATCH").separator("__"))
            .build()?
            .try_deserialize()
    }
}
