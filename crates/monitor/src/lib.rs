//! Sync Client Monitor
//!
//! Single control loop sampling the sync client's status on a fixed
//! interval, debouncing it, recovering the outage start from history,
//! classifying notifications, and invoking remediation. All collaborator
//! calls run under a per-call timeout so one slow probe or channel cannot
//! starve the loop.

mod config;
mod engine;
mod observer;
mod report;

pub use config::{MonitorConfig, ObserverConfig};
pub use engine::MonitorEngine;
pub use observer::{CommandObserver, ObserveError, StatusObserver};
pub use report::write_status_atomic;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging for the monitor binary
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
