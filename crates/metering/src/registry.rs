//! Concurrent metric key registry
//!
//! Maps metric keys to their meters, creating meters lazily on first
//! mark. Shard-level locking keeps `get_or_create` atomic when several
//! producers race on an unseen key, and lets the flush cycle iterate
//! without stalling concurrent marks. Keys are never evicted; memory is
//! bounded only by the key cardinality of the input.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RateWindow;
use crate::meter::Meter;

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

/// Lazily-populated map from metric key to meter
#[derive(Debug)]
pub struct MeterRegistry {
    meters: DashMap<String, Arc<Meter>>,
    rates: Vec<RateWindow>,
    tick_interval: Duration,
}

impl MeterRegistry {
    /// Create an empty registry; new meters compute `rates` at `tick_interval`
    pub fn new(rates: Vec<RateWindow>, tick_interval: Duration) -> Self {
        Self {
            meters: DashMap::new(),
            rates,
            tick_interval,
        }
    }

    /// Get the meter for `key`, creating it on first access
    ///
    /// Exactly one meter ever exists per key: racing first-access callers
    /// serialize on the key's shard and all receive the same instance.
    /// The hit path takes a shard read lock and allocates nothing.
    pub fn get_or_create(&self, key: &str) -> Arc<Meter> {
        if let Some(meter) = self.meters.get(key) {
            return Arc::clone(meter.value());
        }

        Arc::clone(
            self.meters
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Meter::new(key, &self.rates, self.tick_interval)))
                .value(),
        )
    }

    /// Visit every registered meter
    ///
    /// Iterates shard by shard, so concurrent marks proceed on other
    /// shards and keys inserted mid-iteration may or may not be visited.
    pub fn for_each(&self, mut f: impl FnMut(&Arc<Meter>)) {
        for entry in self.meters.iter() {
            f(entry.value());
        }
    }

    /// Number of registered keys
    #[inline]
    pub fn len(&self) -> usize {
        self.meters.len()
    }

    /// Whether no key has been marked yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }
}
