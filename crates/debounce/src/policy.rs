//! Per-category dwell thresholds

use chrono::Duration;
use serde::{Deserialize, Serialize};
use sync_status::StatusCategory;

/// Minimum time a raw category must be continuously observed before it is
/// trusted for remediation purposes. Values are policy data keyed by
/// category; anything unlisted falls back to the default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DwellPolicy {
    /// Critical, act fast
    pub not_running_seconds: u64,
    /// Needs user action, give the client a chance to recover first
    pub auth_required_seconds: u64,
    /// May auto-resume
    pub paused_seconds: u64,
    pub error_seconds: u64,
    /// Transient by nature, several ticks worth
    pub syncing_seconds: u64,
    pub not_found_seconds: u64,
    /// Fallback for unlisted categories
    pub default_seconds: u64,
}

impl Default for DwellPolicy {
    fn default() -> Self {
        Self {
            not_running_seconds: 10,
            auth_required_seconds: 60,
            paused_seconds: 90,
            error_seconds: 30,
            syncing_seconds: 45,
            not_found_seconds: 30,
            default_seconds: 30,
        }
    }
}

impl DwellPolicy {
    /// Required dwell for a category
    pub fn required(&self, category: StatusCategory) -> Duration {
        let seconds = match category {
            StatusCategory::NotRunning => self.not_running_seconds,
            StatusCategory::AuthRequired => self.auth_required_seconds,
            StatusCategory::Paused => self.paused_seconds,
            StatusCategory::Error => self.error_seconds,
            StatusCategory::Syncing => self.syncing_seconds,
            StatusCategory::NotFound => self.not_found_seconds,
            _ => self.default_seconds,
        };
        Duration::seconds(seconds as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let policy = DwellPolicy::default();
        assert_eq!(policy.required(StatusCategory::NotRunning), Duration::seconds(10));
        assert_eq!(policy.required(StatusCategory::Paused), Duration::seconds(90));
        assert_eq!(policy.required(StatusCategory::Unknown), Duration::seconds(30));
    }
}
