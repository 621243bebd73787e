//! Per-key meter state
//!
//! A meter combines a monotonic event count with one decaying rate
//! estimator per configured window, plus the two interval counters the
//! flush cycle uses to decide when this key is due for a snapshot or a
//! clear. Counts and marks are exact under concurrent producers; the
//! interval counters are advanced only by the flush cycle and reset only
//! by the flush or clear action for this same key.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::RateWindow;
use crate::ewma::Ewma;
use crate::snapshot::{MetricSnapshot, SNAPSHOT_MESSAGE};

#[cfg(test)]
#[path = "meter_test.rs"]
mod tests;

/// State for one metric key
#[derive(Debug)]
pub struct Meter {
    /// Metric key, immutable after creation
    key: String,

    /// Total marks since creation or the last clear
    count: AtomicU64,

    /// One-minute rate, when configured
    rate_1m: Option<Ewma>,

    /// Five-minute rate, when configured
    rate_5m: Option<Ewma>,

    /// Fifteen-minute rate, when configured
    rate_15m: Option<Ewma>,

    /// Seconds since this key last emitted a snapshot
    secs_since_flush: AtomicU64,

    /// Seconds since this key's counters were last cleared
    secs_since_clear: AtomicU64,
}

impl Meter {
    /// Create a meter computing the given windows at the given tick cadence
    pub fn new(key: impl Into<String>, rates: &[RateWindow], tick_interval: Duration) -> Self {
        let ewma = |window: RateWindow| {
            rates
                .contains(&window)
                .then(|| Ewma::new(window, tick_interval))
        };

        Self {
            key: key.into(),
            count: AtomicU64::new(0),
            rate_1m: ewma(RateWindow::OneMinute),
            rate_5m: ewma(RateWindow::FiveMinutes),
            rate_15m: ewma(RateWindow::FifteenMinutes),
            secs_since_flush: AtomicU64::new(0),
            secs_since_clear: AtomicU64::new(0),
        }
    }

    /// Metric key
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record one event
    #[inline]
    pub fn mark(&self) {
        self.mark_n(1);
    }

    /// Record `n` events
    ///
    /// Exact under concurrent callers: the count and every estimator's
    /// accumulator reflect the full sum regardless of interleaving.
    pub fn mark_n(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
        for ewma in self.estimators() {
            ewma.mark(n);
        }
    }

    /// Total marks since creation or the last clear
    #[inline]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Tick every configured estimator exactly once
    pub fn tick(&self) {
        for ewma in self.estimators() {
            ewma.tick();
        }
    }

    /// Advance both interval counters by one tick's worth of seconds
    pub fn advance(&self, secs: u64) {
        self.secs_since_flush.fetch_add(secs, Ordering::Relaxed);
        self.secs_since_clear.fetch_add(secs, Ordering::Relaxed);
    }

    /// Whether the flush interval has elapsed for this key
    #[inline]
    pub fn flush_due(&self, flush_secs: u64) -> bool {
        self.secs_since_flush.load(Ordering::Relaxed) >= flush_secs
    }

    /// Whether the clear interval has elapsed for this key
    #[inline]
    pub fn clear_due(&self, clear_secs: u64) -> bool {
        self.secs_since_clear.load(Ordering::Relaxed) >= clear_secs
    }

    /// Restart the flush interval after emitting a snapshot
    #[inline]
    pub fn reset_flush_timer(&self) {
        self.secs_since_flush.store(0, Ordering::Relaxed);
    }

    /// Restart the clear interval after clearing
    #[inline]
    pub fn reset_clear_timer(&self) {
        self.secs_since_clear.store(0, Ordering::Relaxed);
    }

    /// Build the snapshot record for this key
    pub fn snapshot(&self, host: &str, timestamp: DateTime<Utc>) -> MetricSnapshot {
        MetricSnapshot {
            name: self.key.clone(),
            count: self.count(),
            rate_1m: self.rate_1m.as_ref().map(Ewma::rate_per_minute),
            rate_5m: self.rate_5m.as_ref().map(Ewma::rate_per_minute),
            rate_15m: self.rate_15m.as_ref().map(Ewma::rate_per_minute),
            host: host.to_string(),
            timestamp,
            message: SNAPSHOT_MESSAGE,
        }
    }

    /// Reset the count and every estimator to its pre-first-tick state
    pub fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
        for ewma in self.estimators() {
            ewma.reset();
        }
    }

    fn estimators(&self) -> impl Iterator<Item = &Ewma> {
        [&self.rate_1m, &self.rate_5m, &self.rate_15m]
            .into_iter()
            .filter_map(Option::as_ref)
    }
}
