//! Meterflow - Metering
//!
//! Windowed metering core: per-key event counts with exponentially
//! decayed 1/5/15-minute rate estimates.
//!
//! # Overview
//!
//! The engine tracks one [`Meter`] per dynamically-named metric key. A
//! meter combines a monotonic count with one [`Ewma`] estimator per
//! configured window. Producers call [`MeterEngine::mark`] once per
//! matched record; a single periodic caller drives
//! [`MeterEngine::flush`] at a fixed cadence, which ticks every
//! estimator, emits a [`MetricSnapshot`] for each key whose flush
//! interval elapsed, and clears counters for each key whose clear
//! interval elapsed.
//!
//! # Design Principles
//!
//! - **Non-blocking hot path**: `mark` is atomics plus at most one shard
//!   lock; producers never stall behind a registry-wide scan
//! - **Cadence-driven rates**: marks accumulate between ticks and are
//!   folded in at the fixed tick cadence, so bursty arrival patterns do
//!   not distort the estimates
//! - **No I/O, no clocks, no scheduling**: timestamps and the flush
//!   cadence come from the host, which keeps every path deterministic
//!   under test
//! - **Fail fast**: configuration is validated at construction; `mark`
//!   and `flush` are total functions over their inputs
//!
//! # Example
//!
//! ```ignore
//! use meterflow_metering::{MeterConfig, MeterEngine};
//! use chrono::Utc;
//!
//! let engine = MeterEngine::new(MeterConfig::default(), "node-1")?;
//!
//! let now = Utc::now();
//! engine.mark("requests_error", now, now);
//!
//! // Driven by the host every tick_interval:
//! for snapshot in engine.flush(Utc::now()) {
//!     println!("{} = {}", snapshot.name, snapshot.count);
//! }
//! ```

mod config;
mod engine;
mod error;
mod ewma;
mod meter;
mod registry;
mod snapshot;

pub use config::{MeterConfig, RateWindow};
pub use engine::MeterEngine;
pub use error::MeterError;
pub use ewma::Ewma;
pub use meter::Meter;
pub use registry::MeterRegistry;
pub use snapshot::{MetricSnapshot, SNAPSHOT_MESSAGE};

/// Result type for metering operations
pub type MeterResult<T> = Result<T, MeterError>;
