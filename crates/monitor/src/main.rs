//! Sync Client Monitor - Main Entry Point

use anyhow::Context;
use history_store::InMemoryHistory;
use monitor::{init_logging, CommandObserver, MonitorConfig, MonitorEngine};
use notification::{FanoutDispatcher, LogDispatcher, NotificationDispatcher};
use remediation::ProcessRestart;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Syncwatch v{} ===", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1);
    let config = MonitorConfig::load(config_path.as_deref())
        .context("failed to load monitor configuration")?;

    info!("Check interval: {}s", config.check_interval_seconds);
    info!("Status file: {}", config.status_file.display());
    info!(
        "Remediation: max {}/hour, cooldown {}s",
        config.remediation.max_per_hour, config.remediation.cooldown_seconds
    );

    let observer = CommandObserver::from_config(&config.observer).context(
        "observer.command must be configured (a probe printing `CATEGORY [detail]` on stdout)",
    )?;
    let executor = ProcessRestart::new(config.restart.clone());
    let channels: Vec<Box<dyn NotificationDispatcher>> = vec![Box::new(LogDispatcher)];
    let dispatcher = FanoutDispatcher::new(channels);
    let history = Arc::new(InMemoryHistory::new(config.history_max_records));

    let mut engine = MonitorEngine::new(
        config,
        Box::new(observer),
        Box::new(executor),
        Box::new(dispatcher),
        history,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            let _ = shutdown_tx.send(true);
        }
    });

    engine.run(shutdown_rx).await;
    info!("Monitor stopped");

    Ok(())
}
