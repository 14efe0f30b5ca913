//! # Sync State Management
//!
//! Outcome of a single sync cycle and the engine state visible to the UI.
//!
//! ## Features
//!
//! - **Cycle Reports**: synced / failed counts, or a skipped marker when a
//!   cycle was already in flight
//! - **Phase Tracking**: `Idle` or `Draining`
//! - **Failure Streaks**: consecutive failed cycles and the last error, for a
//!   "pending sync" indicator

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of one `sync()` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Attempts accepted by the backend in this cycle
    pub synced: usize,
    /// Attempts that stayed pending because the cycle failed
    pub failed: usize,
    /// Another cycle was in flight; nothing was done
    pub skipped: bool,
    /// The cycle hit a transport or storage error, even if no count says so
    pub errored: bool,
}

impl SyncReport {
    /// Nothing to send
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn synced(count: usize) -> Self {
        Self {
            synced: count,
            ..Self::default()
        }
    }

    pub fn failed(count: usize) -> Self {
        Self {
            failed: count,
            errored: true,
            ..Self::default()
        }
    }

    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// Whether the cycle left work behind because of an error
    pub fn is_failure(&self) -> bool {
        self.errored || self.failed > 0
    }
}

/// Where the engine currently is in its cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SyncPhase {
    #[default]
    Idle,
    Draining,
}

/// Engine state snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    /// Completion time of the last cycle that did not fail
    pub last_sync: Option<DateTime<Utc>>,
    pub last_report: Option<SyncReport>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

impl SyncStatus {
    /// Fold a finished (non-skipped) cycle into the status
    pub fn record(&mut self, report: SyncReport, error: Option<String>, finished_at: DateTime<Utc>) {
        self.phase = SyncPhase::Idle;
        self.last_report = Some(report);
        match error {
            Some(error) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.last_error = Some(error);
            }
            None => {
                self.consecutive_failures = 0;
                self.last_error = None;
                self.last_sync = Some(finished_at);
            }
        }
    }
}
