//! # Sync Engine
//!
//! Drains the pending attempt queue to the backend in one batch per cycle.
//!
//! ## Cycle
//!
//! 1. Purge rows left `synced` by an interrupted earlier cycle
//! 2. Read every pending attempt; an empty queue ends the cycle without a
//!    network call
//! 3. Send one batch with all of them
//! 4. On success mark the transmitted ids `synced`, then purge them
//! 5. On failure change nothing; the rows are picked up by the next cycle
//!
//! Only one cycle runs at a time. A trigger that arrives while a cycle is in
//! flight returns a skipped report instead of sending the same rows twice.
//!
//! Delivery is at-least-once: if the process dies after the backend accepted
//! a batch but before the rows were marked, the batch is sent again. Every
//! attempt carries its idempotency key so the backend can drop the repeat.
//!
//! Errors never leave this module; they are logged and turned into the
//! failure count and `errored` flag of the returned [`SyncReport`].
//!
//! A cycle dropped mid-flight (its task aborted) resets the phase to `Idle`
//! on a best-effort basis; if the status lock is contended at that moment the
//! phase reads `Draining` until the next cycle finishes.

use crate::client::local_db::{AttemptFilter, LocalStore};
use crate::client::remote::AttemptSink;
use crate::client::sync::metrics::SyncMetrics;
use crate::client::sync::sync_state::{SyncPhase, SyncReport, SyncStatus};
use crate::shared::attempt::{AttemptBatch, LocalId};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Reconciles locally recorded attempts with the backend
pub struct SyncEngine {
    store: LocalStore,
    sink: Arc<dyn AttemptSink>,
    /// Held for the whole Draining phase
    in_flight: Mutex<()>,
    status: RwLock<SyncStatus>,
    metrics: RwLock<SyncMetrics>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("store", &self.store)
            .field("syncing", &self.is_syncing())
            .finish_non_exhaustive()
    }
}

struct CycleOutcome {
    report: SyncReport,
    error: Option<String>,
}

impl CycleOutcome {
    fn ok(report: SyncReport) -> Self {
        Self { report, error: None }
    }

    fn failed(count: usize, error: impl std::fmt::Display) -> Self {
        Self {
            report: SyncReport::failed(count),
            error: Some(error.to_string()),
        }
    }
}

/// Resets the phase when a cycle is dropped before recording its outcome
struct DrainingPhase<'a> {
    status: &'a RwLock<SyncStatus>,
    armed: bool,
}

impl Drop for DrainingPhase<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.status.try_write() {
            Ok(mut status) => status.phase = SyncPhase::Idle,
            Err(_) => tracing::debug!("Sync cycle dropped while status was locked"),
        }
    }
}

impl SyncEngine {
    pub fn new(store: LocalStore, sink: Arc<dyn AttemptSink>) -> Self {
        Self {
            store,
            sink,
            in_flight: Mutex::new(()),
            status: RwLock::new(SyncStatus::default()),
            metrics: RwLock::new(SyncMetrics::new()),
        }
    }

    /// Run one sync cycle
    ///
    /// Never fails: transport and storage problems come back as an
    /// `errored` report (`is_failure()`), an overlapping call as `skipped`.
    pub async fn sync(&self) -> SyncReport {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("Sync cycle already in flight, skipping trigger");
            return SyncReport::skipped();
        };

        self.status.write().await.phase = SyncPhase::Draining;
        let mut phase = DrainingPhase {
            status: &self.status,
            armed: true,
        };

        let outcome = self.run_cycle().await;

        self.status
            .write()
            .await
            .record(outcome.report, outcome.error, chrono::Utc::now());
        phase.armed = false;

        outcome.report
    }

    /// Whether a cycle is running right now
    pub fn is_syncing(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Current engine state
    pub async fn status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }

    /// Cycle counters
    pub async fn metrics(&self) -> SyncMetrics {
        self.metrics.read().await.clone()
    }

    async fn run_cycle(&self) -> CycleOutcome {
        match self.store.purge_synced().await {
            Ok(0) => {}
            Ok(purged) => tracing::info!(purged, "Purged attempts left synced by an earlier cycle"),
            Err(e) => tracing::warn!(error = %e, "Could not purge leftover synced attempts"),
        }

        let pending = match self.store.list_pending_attempts(&AttemptFilter::default()).await {
            Ok(pending) => pending,
            Err(e) => {
                // The queue size is unknown; the report still flags the error
                tracing::error!(error = %e, "Could not read pending attempts");
                return CycleOutcome::failed(0, e);
            }
        };

        if pending.is_empty() {
            tracing::debug!("No pending attempts to sync");
            return CycleOutcome::ok(SyncReport::empty());
        }

        let count = pending.len();
        let batch = AttemptBatch {
            attempts: pending.iter().map(|a| a.to_submission()).collect(),
        };
        let local_ids: Vec<LocalId> = pending.iter().map(|a| a.local_id).collect();

        self.metrics.write().await.record_cycle_start();
        tracing::debug!(count, "Transmitting pending attempts");

        if let Err(e) = self.sink.submit_attempts(&batch).await {
            self.metrics.write().await.record_cycle_failure();
            tracing::warn!(error = %e, count, "Attempt batch rejected, keeping records pending");
            return CycleOutcome::failed(count, e);
        }

        self.metrics.write().await.record_cycle_success(count);

        // The backend has the batch from here on; local bookkeeping failures
        // only mean the same rows (and keys) go out again next cycle.
        match self.store.mark_synced(&local_ids).await {
            Ok(_) => {
                if let Err(e) = self.store.purge_synced().await {
                    tracing::warn!(error = %e, "Could not purge synced attempts");
                }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    count,
                    "Backend accepted attempts but they could not be marked synced"
                );
            }
        }

        tracing::info!(count, "Synced offline attempts");
        CycleOutcome::ok(SyncReport::synced(count))
    }
}
