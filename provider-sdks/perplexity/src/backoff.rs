//! Exponential backoff with jitter for the retry loop.

use std::time::Duration;

use rand::Rng;

/// Upper bound (exclusive) of the jitter fraction drawn per delay.
const JITTER_RATIO: f64 = 0.5;

/// Largest fraction of the base delay that jitter may add.
const MAX_ADDED_JITTER: f64 = 0.25;

/// Retry delay policy.
///
/// The base delay doubles on every attempt starting from `initial` and is
/// capped at `max`. A random fraction in `[0, 0.5)` of the capped base is
/// then subtracted, or added with the addition capped at 25%, so every delay
/// falls within `[0.5, 1.25]` times the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Self::DEFAULT_INITIAL,
            max: Self::DEFAULT_MAX,
        }
    }
}

impl Backoff {
    /// Default delay before the first retry.
    pub const DEFAULT_INITIAL: Duration = Duration::from_millis(500);

    /// Default upper bound on the base delay.
    pub const DEFAULT_MAX: Duration = Duration::from_secs(60);

    /// Create a policy with the given initial delay and cap.
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max }
    }

    pub fn initial(&self) -> Duration {
        self.initial
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Capped exponential delay for `attempt` (1-based), before jitter.
    pub fn base(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63);
        let factor = 2_f64.powi(exponent as i32);
        let base = self.initial.as_secs_f64() * factor;
        Duration::try_from_secs_f64(base)
            .unwrap_or(self.max)
            .min(self.max)
    }

    /// Delay to wait before retry `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base(attempt);
        let mut rng = rand::rng();
        let fraction = rng.random_range(0.0..JITTER_RATIO);
        if rng.random_bool(0.5) {
            base + base.mul_f64(fraction.min(MAX_ADDED_JITTER))
        } else {
            base.saturating_sub(base.mul_f64(fraction))
        }
    }
}

#[cfg(test)]
#[path = "backoff.test.rs"]
mod tests;
