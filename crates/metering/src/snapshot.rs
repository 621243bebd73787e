//! Emitted snapshot records
//!
//! One record per flushed key per cycle. Field names are the downstream
//! contract; rate fields for windows excluded by the `rates` option are
//! omitted entirely rather than serialized as null.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Marker value carried in every snapshot's `message` field
pub const SNAPSHOT_MESSAGE: &str = "metric";

/// Point-in-time snapshot of one metric key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    /// Metric key this snapshot belongs to
    pub name: String,

    /// Total marks recorded since creation (or the last clear)
    pub count: u64,

    /// One-minute decayed rate, per minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_1m: Option<f64>,

    /// Five-minute decayed rate, per minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_5m: Option<f64>,

    /// Fifteen-minute decayed rate, per minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_15m: Option<f64>,

    /// Host that produced the snapshot
    pub host: String,

    /// When the flush cycle emitted this record
    pub timestamp: DateTime<Utc>,

    /// Constant record type marker
    pub message: &'static str,
}
