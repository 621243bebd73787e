//! Metering engine façade
//!
//! Two independent callers drive the engine: any number of concurrent
//! producers call `mark` (once per matched record), and exactly one
//! periodic caller drives `flush` at the configured tick cadence. `mark`
//! never blocks on more than a shard lock; `flush` holds no lock across
//! the whole registry scan, only per-key state for the duration of one
//! tick, so producers keep marking while a large key set is flushed.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::config::MeterConfig;
use crate::error::MeterError;
use crate::MeterResult;
use crate::registry::MeterRegistry;
use crate::snapshot::MetricSnapshot;

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;

/// Windowed metering engine
///
/// Tracks an event count and decayed 1/5/15-minute rates per metric key,
/// emitting one snapshot record per key each time its flush interval
/// elapses and optionally resetting its counters on a clear interval.
/// The engine performs no I/O and never schedules itself; the host
/// supplies timestamps and the flush cadence.
#[derive(Debug)]
pub struct MeterEngine {
    config: MeterConfig,
    registry: MeterRegistry,
    host: String,
}

impl MeterEngine {
    /// Create an engine, validating the configuration up front
    ///
    /// `host` is stamped into every emitted snapshot.
    pub fn new(config: MeterConfig, host: impl Into<String>) -> MeterResult<Self> {
        config.validate()?;

        let registry = MeterRegistry::new(config.rates.clone(), config.tick_interval);
        Ok(Self {
            config,
            registry,
            host: host.into(),
        })
    }

    /// Count one event against `key`
    ///
    /// Events older than `ignore_older_than` are skipped without touching
    /// the registry; the skip is not an error, only a trace-level
    /// diagnostic. Returns whether the event was counted.
    pub fn mark(&self, key: &str, event_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if let Some(max_age) = self.config.ignore_older_than {
            let age_secs = now.signed_duration_since(event_time).num_seconds();
            if age_secs > max_age.as_secs() as i64 {
                trace!(key, age_secs, "ignoring stale event");
                return false;
            }
        }

        self.registry.get_or_create(key).mark();
        true
    }

    /// Run one flush cycle and return the emitted snapshots
    ///
    /// For every meter, in unspecified order: advance its interval
    /// counters by one tick, tick every estimator exactly once, emit a
    /// snapshot if its flush interval elapsed, and clear its counters if
    /// its clear interval elapsed. A clear fires after the snapshot is
    /// built, so a cycle where both trigger emits pre-clear values.
    pub fn flush(&self, now: DateTime<Utc>) -> Vec<MetricSnapshot> {
        let tick_secs = self.config.tick_secs();
        let flush_secs = self.config.flush_secs();
        let clear_secs = self.config.clear_secs();

        let mut batch = Vec::new();
        self.registry.for_each(|meter| {
            meter.advance(tick_secs);
            meter.tick();

            if meter.flush_due(flush_secs) {
                batch.push(meter.snapshot(&self.host, now));
                meter.reset_flush_timer();
            }

            if let Some(clear_secs) = clear_secs {
                if meter.clear_due(clear_secs) {
                    meter.clear();
                    meter.reset_clear_timer();
                }
            }
        });

        batch
    }

    /// Engine configuration
    #[inline]
    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// The key registry backing this engine
    #[inline]
    pub fn registry(&self) -> &MeterRegistry {
        &self.registry
    }

    /// Number of metric keys seen so far
    #[inline]
    pub fn meter_count(&self) -> usize {
        self.registry.len()
    }
}
