//! Dispatcher boundary and channel fan-out

use crate::Intent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sync_status::StatusCategory;
use thiserror::Error;
use tracing::{info, warn};

/// One notification handed to a delivery channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub intent: Intent,
    pub category: StatusCategory,
    /// Outage start when one is known, otherwise the confirmation time
    pub timestamp: DateTime<Utc>,
    /// Human-readable reason line
    pub reason: String,
}

impl Notification {
    pub fn new(
        intent: Intent,
        category: StatusCategory,
        timestamp: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            intent,
            category,
            timestamp,
            reason: reason.into(),
        }
    }
}

/// Channel delivery error
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("notification channel failed: {0}")]
    Channel(String),
}

/// Delivers a notification. The core treats dispatch as fire-and-forget:
/// failures are logged, never rolled back into decision state.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError>;
}

/// Built-in channel that writes notifications to the log
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError> {
        info!(
            intent = %notification.intent,
            category = %notification.category,
            since = %notification.timestamp,
            "{}",
            notification.reason
        );
        Ok(())
    }
}

/// Fans a notification out to every configured channel. A failing channel
/// never blocks the remaining ones.
pub struct FanoutDispatcher {
    channels: Vec<Box<dyn NotificationDispatcher>>,
}

impl FanoutDispatcher {
    pub fn new(channels: Vec<Box<dyn NotificationDispatcher>>) -> Self {
        Self { channels }
    }

    pub fn push(&mut self, channel: Box<dyn NotificationDispatcher>) {
        self.channels.push(channel);
    }
}

#[async_trait]
impl NotificationDispatcher for FanoutDispatcher {
    async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError> {
        let mut delivered = self.channels.is_empty();

        for channel in &self.channels {
            match channel.dispatch(notification).await {
                Ok(()) => delivered = true,
                Err(e) => warn!("notification channel failed: {}", e),
            }
        }

        if delivered {
            Ok(())
        } else {
            Err(DispatchError::Channel("all channels failed".to_string()))
        }
    }
}
