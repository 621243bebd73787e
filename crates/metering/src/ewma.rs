//! Decaying rate estimator
//!
//! Unix load-average style smoothing: marks accumulate lock-free between
//! ticks, and a fixed-cadence tick folds them into an exponentially
//! weighted moving average. Accumulation and smoothing are decoupled so
//! the rate is a property of wall-clock cadence, not call frequency;
//! bursts arriving between two ticks cannot distort the estimate.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::RateWindow;

#[cfg(test)]
#[path = "ewma_test.rs"]
mod tests;

/// Per-second rate estimator decayed over one time window
///
/// `mark` is a single relaxed atomic add and is safe under high
/// contention. `tick` must be driven at the fixed cadence the estimator
/// was constructed with; the smoothing constant is derived from that
/// cadence once, never per tick.
#[derive(Debug)]
pub struct Ewma {
    /// Marks accumulated since the last tick
    uncounted: AtomicU64,

    /// Smoothed per-second rate; None until the first tick seeds it
    rate: Mutex<Option<f64>>,

    /// Smoothing constant: 1 - exp(-tick_secs / (window_minutes * 60))
    alpha: f64,

    /// Tick cadence in seconds
    tick_secs: f64,
}

impl Ewma {
    /// Create an estimator for the given window, ticked at `tick_interval`
    pub fn new(window: RateWindow, tick_interval: Duration) -> Self {
        let tick_secs = tick_interval.as_secs_f64();
        let window_secs = (window.minutes() * 60) as f64;

        Self {
            uncounted: AtomicU64::new(0),
            rate: Mutex::new(None),
            alpha: 1.0 - (-tick_secs / window_secs).exp(),
            tick_secs,
        }
    }

    /// Record `n` events
    ///
    /// Side effect only: adds to the uncounted accumulator. Never blocks,
    /// never fails, never touches the smoothed rate.
    #[inline]
    pub fn mark(&self, n: u64) {
        self.uncounted.fetch_add(n, Ordering::Relaxed);
    }

    /// Fold accumulated marks into the smoothed rate
    ///
    /// The first tick seeds the rate with the instantaneous value; later
    /// ticks apply the exponential smoothing formula. Marks racing a tick
    /// land in either this window or the next.
    pub fn tick(&self) {
        let instantaneous = self.uncounted.swap(0, Ordering::Relaxed) as f64 / self.tick_secs;

        let mut rate = self.rate.lock();
        *rate = Some(match *rate {
            None => instantaneous,
            Some(current) => current + self.alpha * (instantaneous - current),
        });
    }

    /// Smoothed per-second rate, or None before the first tick
    #[inline]
    pub fn rate_per_second(&self) -> Option<f64> {
        *self.rate.lock()
    }

    /// Smoothed per-minute rate; 0.0 before the first tick
    #[inline]
    pub fn rate_per_minute(&self) -> f64 {
        self.rate_per_second().map_or(0.0, |r| r * 60.0)
    }

    /// Marks accumulated since the last tick
    #[inline]
    pub fn uncounted(&self) -> u64 {
        self.uncounted.load(Ordering::Relaxed)
    }

    /// Return to the pre-first-tick state
    ///
    /// The next tick after a reset seeds the rate again instead of
    /// decaying the old value.
    pub fn reset(&self) {
        self.uncounted.store(0, Ordering::Relaxed);
        *self.rate.lock() = None;
    }
}
