//! # Background Sync Service
//!
//! Drains offline practice attempts to the backend whenever connectivity
//! allows, without the learner having to ask.
//!
//! ## Architecture
//!
//! - **Engine** (`engine.rs`): one guarded sync cycle over the local queue
//! - **Network Monitor** (`network_monitor.rs`): connectivity state and transitions
//! - **Sync State** (`sync_state.rs`): cycle reports and engine status
//! - **Metrics** (`metrics.rs`): cycle counters
//! - **Backoff** (`backoff.rs`): retry delay after failed cycles
//!
//! ## Triggers
//!
//! - every Offline to Online transition
//! - service start, when already online
//! - the periodic interval while online, if configured
//! - a failure retry once the backoff delay has passed, while online
//! - [`SyncService::force_sync`]
//!
//! Overlapping triggers are absorbed by the engine, so a reconnect during a
//! running cycle does not send anything twice.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use studycache::client::api_client::HttpBackend;
//! use studycache::client::local_db::LocalStore;
//! use studycache::client::sync::{ReachabilityMonitor, SyncConfig, SyncEngine, SyncService};
//! use studycache::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let store = LocalStore::in_memory().await?;
//! let backend = Arc::new(HttpBackend::new(config.clone())?);
//! let engine = Arc::new(SyncEngine::new(store, backend));
//! let monitor = ReachabilityMonitor::default();
//!
//! let mut service = SyncService::new(engine, monitor, SyncConfig::from(&config));
//! service.start()?;
//!
//! let report = service.force_sync().await;
//! println!("synced {} attempts", report.synced);
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod engine;
pub mod metrics;
pub mod network_monitor;
pub mod sync_state;

pub use backoff::BackoffStrategy;
pub use engine::SyncEngine;
pub use metrics::SyncMetrics;
pub use network_monitor::{NetworkStatus, ReachabilityMonitor, Subscription, Transition};
pub use sync_state::{SyncPhase, SyncReport, SyncStatus};

use crate::shared::config::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Configuration for the sync service
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Sync periodically while online; `None` relies on the other triggers
    pub auto_sync_interval: Option<Duration>,
    /// Retry delay after failed cycles
    pub backoff: BackoffStrategy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync_interval: None,
            backoff: BackoffStrategy::default(),
        }
    }
}

impl From<&AppConfig> for SyncConfig {
    fn from(config: &AppConfig) -> Self {
        let backoff = match BackoffStrategy::default() {
            BackoffStrategy::Exponential { base, jitter, .. } => BackoffStrategy::Exponential {
                base: base.min(config.max_retry_interval),
                max: config.max_retry_interval,
                jitter,
            },
            fixed => fixed,
        };
        Self {
            auto_sync_interval: config.auto_sync_interval,
            backoff,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncServiceError {
    #[error("sync service is already running")]
    AlreadyRunning,
}

/// Main sync service coordinator
#[derive(Debug)]
pub struct SyncService {
    engine: Arc<SyncEngine>,
    monitor: ReachabilityMonitor,
    config: SyncConfig,
    /// Background sync task handle
    background_task: Option<JoinHandle<()>>,
    /// Reconnect listener; dropping it unregisters from the monitor
    subscription: Option<Subscription>,
}

impl SyncService {
    pub fn new(engine: Arc<SyncEngine>, monitor: ReachabilityMonitor, config: SyncConfig) -> Self {
        Self {
            engine,
            monitor,
            config,
            background_task: None,
            subscription: None,
        }
    }

    /// Start the background sync service
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<(), SyncServiceError> {
        if self.background_task.is_some() {
            return Err(SyncServiceError::AlreadyRunning);
        }

        // A channel rather than the watch receiver: every reconnect must
        // produce a trigger even if the link flaps faster than the loop runs.
        let (reconnect_tx, reconnect_rx) = mpsc::unbounded_channel();
        let subscription = self.monitor.on_change(move |transition| {
            if transition.is_reconnect() {
                let _ = reconnect_tx.send(());
            }
        });

        let handle = tokio::spawn(background_sync_loop(
            Arc::clone(&self.engine),
            self.monitor.clone(),
            self.config.clone(),
            reconnect_rx,
        ));

        self.subscription = Some(subscription);
        self.background_task = Some(handle);
        tracing::info!(interval = ?self.config.auto_sync_interval, "Sync service started");
        Ok(())
    }

    /// Stop the background sync service
    ///
    /// A cycle that is mid-flight is cancelled; its attempts stay pending.
    pub fn stop(&mut self) {
        self.subscription.take();
        if let Some(handle) = self.background_task.take() {
            handle.abort();
            tracing::info!("Sync service stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.background_task
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Run a cycle now, regardless of connectivity
    pub async fn force_sync(&self) -> SyncReport {
        self.engine.sync().await
    }

    /// Get current sync status
    pub async fn status(&self) -> SyncStatus {
        self.engine.status().await
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }
}

impl Drop for SyncService {
    fn drop(&mut self) {
        if let Some(handle) = self.background_task.take() {
            handle.abort();
        }
    }
}

/// Background sync loop
async fn background_sync_loop(
    engine: Arc<SyncEngine>,
    monitor: ReachabilityMonitor,
    config: SyncConfig,
    mut reconnects: mpsc::UnboundedReceiver<()>,
) {
    let mut failures = 0;

    if monitor.is_online() {
        failures = run_cycle(&engine, "startup").await;
    }

    loop {
        let wait = next_wake(&config, failures);
        let timer = async {
            match wait {
                Some(delay) => tokio::time::sleep(delay).await,
                None => std::future::pending::<()>().await,
            }
        };

        let trigger = tokio::select! {
            signal = reconnects.recv() => match signal {
                Some(()) => "reconnect",
                None => break,
            },
            _ = timer => {
                if !monitor.is_online() {
                    continue;
                }
                if failures > 0 { "retry" } else { "interval" }
            }
        };

        failures = run_cycle(&engine, trigger).await;
    }

    tracing::debug!("Sync loop exited");
}

/// Run one cycle and return the current failure streak
async fn run_cycle(engine: &SyncEngine, trigger: &'static str) -> u32 {
    let report = engine.sync().await;
    if !report.skipped {
        tracing::debug!(trigger, synced = report.synced, failed = report.failed, "Sync cycle finished");
    }
    engine.status().await.consecutive_failures
}

fn next_wake(config: &SyncConfig, failures: u32) -> Option<Duration> {
    if failures > 0 {
        let delay = config.backoff.delay(failures);
        Some(match config.auto_sync_interval {
            Some(interval) => delay.min(interval),
            None => delay,
        })
    } else {
        config.auto_sync_interval
    }
}
