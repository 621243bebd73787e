//! Metering error types
//!
//! The hot path (`mark`, `flush`) is total and never fails; the only
//! failure mode in this crate is invalid configuration, rejected at
//! construction time.

use thiserror::Error;

/// Errors raised by the metering core
#[derive(Debug, Error)]
pub enum MeterError {
    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MeterError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
