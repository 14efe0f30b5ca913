//! # Retry Backoff
//!
//! Delay before the next automatic sync attempt after consecutive failures.
//! Exponential growth with jitter keeps many clients that reconnect at once
//! from retrying in lockstep.

use rand::Rng;
use std::time::Duration;

/// Backoff strategy configuration
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed interval between retries
    Fixed {
        interval: Duration,
    },
    /// Exponential backoff with jitter
    Exponential {
        /// Delay after the first failure
        base: Duration,
        /// Upper bound before jitter
        max: Duration,
        /// Extra random delay as a fraction of the computed delay (0.0 to 1.0)
        jitter: f64,
    },
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        BackoffStrategy::Exponential {
            base: Duration::from_secs(5),
            max: Duration::from_secs(300),
            jitter: 0.1,
        }
    }
}

impl BackoffStrategy {
    /// Delay to wait after `failures` consecutive failed cycles (`failures >= 1`)
    pub fn delay(&self, failures: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed { interval } => *interval,
            BackoffStrategy::Exponential { base, max, jitter } => {
                let exponent = failures.saturating_sub(1).min(31);
                let delay = base.saturating_mul(1u32 << exponent).min(*max);

                let jitter = jitter.clamp(0.0, 1.0);
                if jitter == 0.0 || delay.is_zero() {
                    return delay;
                }
                let spread = delay.mul_f64(jitter);
                let extra = rand::thread_rng().gen_range(Duration::ZERO..=spread);
                delay + extra
            }
        }
    }
}
