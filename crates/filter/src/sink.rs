//! Snapshot sinks
//!
//! The downstream capability the metering core does not know about: a
//! sink receives each snapshot record produced by a flush cycle. Sink
//! failures never feed back into the engine; the worker logs them and
//! moves on.

use std::io::Write;

use meterflow_metering::MetricSnapshot;
use tokio::sync::mpsc;

use crate::error::FilterError;
use crate::FilterResult;

/// Destination for emitted snapshots
pub trait SnapshotSink: Send + Sync {
    /// Deliver one snapshot downstream
    fn emit(&self, snapshot: &MetricSnapshot) -> FilterResult<()>;

    /// Sink name for logging
    fn name(&self) -> &'static str;
}

/// Writes snapshots to stdout as JSON lines
///
/// Debugging and piping into other tools; not meant for high-volume
/// production output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl StdoutSink {
    /// Create a stdout sink
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotSink for StdoutSink {
    fn emit(&self, snapshot: &MetricSnapshot) -> FilterResult<()> {
        let line =
            serde_json::to_string(snapshot).map_err(|e| FilterError::sink(e.to_string()))?;
        writeln!(std::io::stdout().lock(), "{line}")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// Forwards snapshots into a tokio channel
///
/// Lets the host wire flush output into its own pipeline stage; tests
/// use it to observe emissions.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<MetricSnapshot>,
}

impl ChannelSink {
    /// Create a channel sink and the receiving half
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MetricSnapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SnapshotSink for ChannelSink {
    fn emit(&self, snapshot: &MetricSnapshot) -> FilterResult<()> {
        self.tx
            .send(snapshot.clone())
            .map_err(|_| FilterError::sink("snapshot channel closed"))
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}
