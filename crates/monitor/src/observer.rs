//! Status observer boundary

use crate::ObserverConfig;
use async_trait::async_trait;
use chrono::Utc;
use sync_status::{StatusCategory, StatusSample};
use thiserror::Error;
use tokio::process::Command;

/// Errors from the status probe
#[derive(Debug, Clone, Error)]
pub enum ObserveError {
    #[error("observer command could not be run: {0}")]
    Spawn(String),

    #[error("observer command exited with status {0}")]
    Failed(i32),

    #[error("observer output could not be parsed: {0}")]
    Parse(String),
}

/// Produces one raw status sample per tick. Implementations must not block
/// beyond the loop's per-call timeout.
#[async_trait]
pub trait StatusObserver: Send + Sync {
    async fn sample(&self) -> Result<StatusSample, ObserveError>;
}

/// Observer that shells out to a configured probe command. The probe owns
/// all platform- and locale-specific status detection and reports a single
/// line: `CATEGORY [detail...]`.
pub struct CommandObserver {
    program: String,
    args: Vec<String>,
}

impl CommandObserver {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from config; `None` if no command is configured
    pub fn from_config(config: &ObserverConfig) -> Option<Self> {
        config
            .command
            .as_ref()
            .map(|command| Self::new(command.clone(), config.args.clone()))
    }
}

#[async_trait]
impl StatusObserver for CommandObserver {
    async fn sample(&self) -> Result<StatusSample, ObserveError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| ObserveError::Spawn(e.to_string()))?;

        if !output.status.success() {
            return Err(ObserveError::Failed(output.status.code().unwrap_or(-1)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().next().unwrap_or("").trim();
        let (token, detail) = match line.split_once(char::is_whitespace) {
            Some((token, detail)) => (token, detail.trim().to_string()),
            None => (line, String::new()),
        };

        let category = token
            .parse::<StatusCategory>()
            .map_err(|e| ObserveError::Parse(e.to_string()))?;

        Ok(StatusSample {
            timestamp: Utc::now(),
            category,
            detail,
            process_alive: category != StatusCategory::NotRunning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_output_is_parsed() {
        let observer = CommandObserver::new(
            "sh",
            vec!["-c".to_string(), "echo 'SYNCING uploading 3 files'".to_string()],
        );

        let sample = observer.sample().await.unwrap();
        assert_eq!(sample.category, StatusCategory::Syncing);
        assert_eq!(sample.detail, "uploading 3 files");
        assert!(sample.process_alive);
    }

    #[tokio::test]
    async fn test_bare_category_has_empty_detail() {
        let observer = CommandObserver::new("sh", vec!["-c".to_string(), "echo OK".to_string()]);

        let sample = observer.sample().await.unwrap();
        assert_eq!(sample.category, StatusCategory::Ok);
        assert!(sample.detail.is_empty());
    }

    #[tokio::test]
    async fn test_garbage_output_is_a_parse_error() {
        let observer =
            CommandObserver::new("sh", vec!["-c".to_string(), "echo whatever".to_string()]);

        assert!(matches!(
            observer.sample().await,
            Err(ObserveError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_probe_failure_is_surfaced() {
        let observer = CommandObserver::new("sh", vec!["-c".to_string(), "exit 3".to_string()]);

        assert!(matches!(
            observer.sample().await,
            Err(ObserveError::Failed(3))
        ));
    }

    #[tokio::test]
    async fn test_missing_probe_is_a_spawn_error() {
        let observer = CommandObserver::new("/nonexistent/probe", Vec::new());

        assert!(matches!(
            observer.sample().await,
            Err(ObserveError::Spawn(_))
        ));
    }
}
