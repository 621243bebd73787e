//! Filter error types

use meterflow_metering::MeterError;
use thiserror::Error;

/// Errors raised by the metrics filter glue
#[derive(Debug, Error)]
pub enum FilterError {
    /// Malformed key template
    #[error("invalid key template: {0}")]
    Template(String),

    /// Invalid filter configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Invalid metering configuration
    #[error(transparent)]
    Meter(#[from] MeterError),

    /// Configuration failed to parse
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Snapshot could not be delivered downstream
    #[error("sink error: {0}")]
    Sink(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilterError {
    /// Create a template error
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a sink error
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }
}
