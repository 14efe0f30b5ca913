//! # Sync Metrics
//!
//! Counters for sync cycles that reached the backend. Cycles that found an
//! empty queue or were skipped are not counted.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct SyncMetrics {
    pub total_cycles: u64,
    pub successful_cycles: u64,
    pub failed_cycles: u64,
    pub attempts_transmitted: u64,
    pub average_cycle_duration: Duration,
    pub last_cycle_duration: Option<Duration>,
    last_cycle_start: Option<Instant>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cycle_start(&mut self) {
        self.last_cycle_start = Some(Instant::now());
        self.total_cycles += 1;
    }

    pub fn record_cycle_success(&mut self, attempts: usize) {
        if let Some(start) = self.last_cycle_start.take() {
            let duration = start.elapsed();
            self.last_cycle_duration = Some(duration);
            self.successful_cycles += 1;
            self.attempts_transmitted += attempts as u64;

            // Rolling average over successful cycles
            let previous = self.successful_cycles.saturating_sub(1) as f64;
            let total = self.average_cycle_duration.mul_f64(previous) + duration;
            self.average_cycle_duration = total.div_f64(self.successful_cycles as f64);
        }
    }

    pub fn record_cycle_failure(&mut self) {
        if let Some(start) = self.last_cycle_start.take() {
            self.last_cycle_duration = Some(start.elapsed());
        }
        self.failed_cycles += 1;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_cycles == 0 {
            0.0
        } else {
            self.successful_cycles as f64 / self.total_cycles as f64
        }
    }
}
