//! Restart executor boundary and process implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{info, warn};

/// Errors from the external restart collaborator
#[derive(Debug, Clone, Error)]
pub enum RestartError {
    /// Monitored binary not present in any configured location
    #[error("monitored binary not found in any configured location")]
    NotFound,

    /// Kill succeeded (or was skipped) but the relaunch failed
    #[error("failed to launch monitored binary: {0}")]
    LaunchFailed(String),
}

/// Kills and relaunches the monitored process
#[async_trait]
pub trait RestartExecutor: Send + Sync {
    async fn restart(&self) -> Result<(), RestartError>;
}

/// Configuration for [`ProcessRestart`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessRestartConfig {
    /// Optional terminate step run before relaunch (e.g. `taskkill` / `pkill`)
    pub kill_command: Option<String>,
    pub kill_args: Vec<String>,
    /// Wait after the kill step so the process fully terminates
    pub kill_wait_seconds: u64,
    /// Ordered candidate paths for the monitored binary; first existing wins
    pub binary_candidates: Vec<PathBuf>,
    /// Arguments passed to the relaunched binary
    pub args: Vec<String>,
}

impl Default for ProcessRestartConfig {
    fn default() -> Self {
        Self {
            kill_command: None,
            kill_args: Vec::new(),
            kill_wait_seconds: 5,
            binary_candidates: Vec::new(),
            args: Vec::new(),
        }
    }
}

/// Kill-then-relaunch executor for the monitored sync client
pub struct ProcessRestart {
    config: ProcessRestartConfig,
}

impl ProcessRestart {
    pub fn new(config: ProcessRestartConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RestartExecutor for ProcessRestart {
    async fn restart(&self) -> Result<(), RestartError> {
        if let Some(kill) = &self.config.kill_command {
            match Command::new(kill).args(&self.config.kill_args).output().await {
                Ok(output) if !output.status.success() => {
                    // Process may simply not be running; relaunch regardless
                    warn!(command = %kill, status = ?output.status.code(), "kill step exited non-zero");
                }
                Ok(_) => {}
                Err(e) => warn!(command = %kill, "kill step could not be run: {}", e),
            }
            tokio::time::sleep(Duration::from_secs(self.config.kill_wait_seconds)).await;
        }

        let binary = self
            .config
            .binary_candidates
            .iter()
            .find(|p| p.exists())
            .ok_or(RestartError::NotFound)?;

        Command::new(binary)
            .args(&self.config.args)
            .spawn()
            .map_err(|e| RestartError::LaunchFailed(e.to_string()))?;

        info!(binary = %binary.display(), "relaunched monitored process");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_restart_without_candidates_is_not_found() {
        let executor = ProcessRestart::new(ProcessRestartConfig {
            kill_wait_seconds: 0,
            ..Default::default()
        });

        match executor.restart().await {
            Err(RestartError::NotFound) => {}
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_restart_with_missing_candidates_is_not_found() {
        let executor = ProcessRestart::new(ProcessRestartConfig {
            kill_wait_seconds: 0,
            binary_candidates: vec![PathBuf::from("/nonexistent/sync-client")],
            ..Default::default()
        });

        assert!(matches!(
            executor.restart().await,
            Err(RestartError::NotFound)
        ));
    }
}
