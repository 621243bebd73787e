//! Periodic flush worker
//!
//! Drives the filter's flush cycle on the configured tick cadence and
//! delivers every emitted snapshot to the sink. The worker is the only
//! scheduler in the system; the engine itself never self-schedules.

use std::sync::Arc;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::filter::MetricsFilter;
use crate::sink::SnapshotSink;

/// Runs the flush cycle until cancelled
pub struct FlushWorker {
    filter: Arc<MetricsFilter>,
    sink: Arc<dyn SnapshotSink>,
}

impl FlushWorker {
    /// Create a worker for the given filter and sink
    pub fn new(filter: Arc<MetricsFilter>, sink: Arc<dyn SnapshotSink>) -> Self {
        Self { filter, sink }
    }

    /// Run until cancellation
    ///
    /// Spawn this as a tokio task. The first cycle fires one full tick
    /// after start; a stalled cycle delays emission but is never cut
    /// short, and missed ticks are skipped rather than replayed.
    pub async fn run(self, cancel: CancellationToken) {
        let tick = self.filter.engine().config().tick_interval;

        let mut ticker = interval_at(Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            tick_secs = tick.as_secs(),
            sink = self.sink.name(),
            "flush worker started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("flush worker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.cycle();
                }
            }
        }
    }

    /// Run one flush cycle and emit the batch
    fn cycle(&self) {
        for snapshot in self.filter.flush() {
            if let Err(error) = self.sink.emit(&snapshot) {
                warn!(%error, name = %snapshot.name, "failed to emit snapshot");
            }
        }
    }
}
