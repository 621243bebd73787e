//! Meterflow - Filter
//!
//! Glue around the metering core: turns inbound event records into
//! per-key marks and delivers periodic snapshot records downstream.
//!
//! # Overview
//!
//! This crate provides everything the core deliberately leaves out:
//! - [`Event`] records (JSON object + timestamp) with dot-notation
//!   field access
//! - [`KeyTemplate`] `%{field}` interpolation for dynamic metric keys
//! - [`Clock`] abstraction so time is injectable under test
//! - [`SnapshotSink`] implementations for delivering snapshots
//! - [`FlushWorker`], the periodic driver of the engine's flush cycle
//! - TOML configuration via [`FilterConfig`]
//!
//! # Example
//!
//! ```ignore
//! use meterflow_filter::{Event, FilterConfig, FlushWorker, MetricsFilter, StdoutSink};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = FilterConfig::from_toml(r#"
//!     meter = ["events_%{type}"]
//!     flush_interval = "10s"
//! "#)?;
//!
//! let filter = Arc::new(MetricsFilter::new(config)?);
//!
//! let cancel = CancellationToken::new();
//! let worker = FlushWorker::new(filter.clone(), Arc::new(StdoutSink::new()));
//! tokio::spawn(worker.run(cancel.clone()));
//!
//! // Per inbound record:
//! filter.process(&event);
//! ```

mod clock;
mod config;
mod error;
mod event;
mod filter;
mod sink;
mod template;
mod worker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::FilterConfig;
pub use error::FilterError;
pub use event::Event;
pub use filter::{FilterMetrics, MetricsFilter};
pub use sink::{ChannelSink, SnapshotSink, StdoutSink};
pub use template::KeyTemplate;
pub use worker::FlushWorker;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
