//! Status categories and their policy partition

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw status category produced by the status observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCategory {
    /// Client is up to date
    Ok,
    /// Client is transferring files
    Syncing,
    /// Synchronization paused
    Paused,
    /// Re-authentication needed (critical)
    AuthRequired,
    /// Client reported a sync error
    Error,
    /// Client process not running
    NotRunning,
    /// Target account not present on this machine
    NotFound,
    /// Observer could not classify the status
    Unknown,
}

/// Policy partition used by the decision engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusClass {
    Healthy,
    Transient,
    Incident,
}

impl StatusCategory {
    /// Partition class for this category. `Unknown` counts as incident-like
    /// for persistence tracking.
    pub fn class(self) -> StatusClass {
        match self {
            StatusCategory::Ok => StatusClass::Healthy,
            StatusCategory::Syncing => StatusClass::Transient,
            _ => StatusClass::Incident,
        }
    }

    /// True for the incident categories proper. `Unknown` is excluded: it is
    /// persisted like an incident but never announced or remediated as one.
    pub fn is_incident(self) -> bool {
        matches!(
            self,
            StatusCategory::Paused
                | StatusCategory::AuthRequired
                | StatusCategory::Error
                | StatusCategory::NotRunning
                | StatusCategory::NotFound
        )
    }

    /// Whether a persisted streak of this category may trigger a restart
    pub fn triggers_remediation(self) -> bool {
        self.is_incident()
    }

    /// Wire/storage name for this category
    pub fn as_str(self) -> &'static str {
        match self {
            StatusCategory::Ok => "OK",
            StatusCategory::Syncing => "SYNCING",
            StatusCategory::Paused => "PAUSED",
            StatusCategory::AuthRequired => "AUTH_REQUIRED",
            StatusCategory::Error => "ERROR",
            StatusCategory::NotRunning => "NOT_RUNNING",
            StatusCategory::NotFound => "NOT_FOUND",
            StatusCategory::Unknown => "UNKNOWN",
        }
    }

    /// Human-readable message for status reports and notifications
    pub fn message(self) -> &'static str {
        match self {
            StatusCategory::Ok => "Sync client is up to date",
            StatusCategory::Syncing => "Sync client is transferring files",
            StatusCategory::Paused => "Synchronization is paused",
            StatusCategory::AuthRequired => "Sync client requires re-authentication",
            StatusCategory::Error => "Sync client has encountered an error",
            StatusCategory::NotRunning => "Sync client process is not running",
            StatusCategory::NotFound => "Target sync account not found",
            StatusCategory::Unknown => "Sync client status is unknown",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a category token from observer output
#[derive(Debug, Clone, Error)]
#[error("unrecognized status category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for StatusCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OK" => Ok(StatusCategory::Ok),
            "SYNCING" => Ok(StatusCategory::Syncing),
            "PAUSED" => Ok(StatusCategory::Paused),
            "AUTH_REQUIRED" => Ok(StatusCategory::AuthRequired),
            "ERROR" => Ok(StatusCategory::Error),
            "NOT_RUNNING" => Ok(StatusCategory::NotRunning),
            "NOT_FOUND" => Ok(StatusCategory::NotFound),
            "UNKNOWN" => Ok(StatusCategory::Unknown),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}
