//! Metrics filter
//!
//! Glue between an event stream and the metering engine: resolves each
//! configured key template against an inbound event and marks the
//! resulting keys. Flushes are delegated to the engine; the caller (or
//! the [`crate::worker::FlushWorker`]) delivers the returned snapshots
//! to a sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use meterflow_metering::{MeterEngine, MetricSnapshot};

use crate::clock::{Clock, SystemClock};
use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::event::Event;
use crate::template::KeyTemplate;
use crate::FilterResult;

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;

/// Diagnostic counters for the filter
#[derive(Debug, Default)]
pub struct FilterMetrics {
    /// Events handed to `process`
    pub events_processed: AtomicU64,
    /// Key marks accepted by the engine
    pub marks_counted: AtomicU64,
    /// Key marks skipped by the age gate
    pub marks_ignored: AtomicU64,
    /// Flush cycles run
    pub flush_cycles: AtomicU64,
    /// Snapshots emitted across all cycles
    pub snapshots_emitted: AtomicU64,
}

/// Counts events per resolved metric key and emits periodic snapshots
pub struct MetricsFilter {
    templates: Vec<KeyTemplate>,
    engine: MeterEngine,
    clock: Arc<dyn Clock>,
    metrics: FilterMetrics,
}

impl MetricsFilter {
    /// Create a filter using the system clock
    pub fn new(config: FilterConfig) -> FilterResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a filter with an explicit clock
    pub fn with_clock(config: FilterConfig, clock: Arc<dyn Clock>) -> FilterResult<Self> {
        config.validate()?;

        let templates = config
            .meter
            .iter()
            .map(|t| KeyTemplate::parse(t))
            .collect::<Result<Vec<_>, _>>()?;

        let host = match config.host {
            Some(host) => host,
            None => resolve_hostname(),
        };

        Ok(Self {
            templates,
            engine: MeterEngine::new(config.engine, host)?,
            clock,
            metrics: FilterMetrics::default(),
        })
    }

    /// Count one event under every configured template
    ///
    /// Total over its input: an unresolvable field only changes the key,
    /// and a gated event is a silent no-op recorded in the diagnostics.
    pub fn process(&self, event: &Event) {
        self.metrics.events_processed.fetch_add(1, Ordering::Relaxed);

        let now = self.clock.now();
        for template in &self.templates {
            let key = template.resolve(event);
            if self.engine.mark(&key, event.timestamp(), now) {
                self.metrics.marks_counted.fetch_add(1, Ordering::Relaxed);
            } else {
                self.metrics.marks_ignored.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Run one flush cycle, returning the snapshots to deliver downstream
    pub fn flush(&self) -> Vec<MetricSnapshot> {
        let batch = self.engine.flush(self.clock.now());

        self.metrics.flush_cycles.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .snapshots_emitted
            .fetch_add(batch.len() as u64, Ordering::Relaxed);

        batch
    }

    /// Diagnostic counters
    #[inline]
    pub fn metrics(&self) -> &FilterMetrics {
        &self.metrics
    }

    /// The underlying metering engine
    #[inline]
    pub fn engine(&self) -> &MeterEngine {
        &self.engine
    }
}

impl std::fmt::Debug for MetricsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsFilter")
            .field("templates", &self.templates)
            .field("engine", &self.engine)
            .field("metrics", &self.metrics)
            .finish()
    }
}

fn resolve_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string())
}
