//! Metrics filter configuration
//!
//! The only required option is `meter`: the key template(s) each event
//! is counted under. Everything else falls back to the engine defaults.
//!
//! # Example
//!
//! ```toml
//! meter = ["events_%{type}", "events_total"]
//! flush_interval = "10s"
//! clear_interval = "1m"
//! ignore_older_than = "30s"
//! rates = [1, 5, 15]
//! ```

use meterflow_metering::MeterConfig;
use serde::Deserialize;

use crate::error::FilterError;
use crate::template::KeyTemplate;
use crate::FilterResult;

/// Metrics filter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Key templates each event is counted under; at least one required
    pub meter: Vec<String>,

    /// Host stamped into snapshots; defaults to the system hostname
    #[serde(default)]
    pub host: Option<String>,

    /// Engine options (flush/clear intervals, rates, age gate, tick)
    #[serde(flatten)]
    pub engine: MeterConfig,
}

impl FilterConfig {
    /// Create a config with one template and engine defaults
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            meter: vec![template.into()],
            host: None,
            engine: MeterConfig::default(),
        }
    }

    /// Add another key template
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.meter.push(template.into());
        self
    }

    /// Override the snapshot host field
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Replace the engine options
    pub fn with_engine(mut self, engine: MeterConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml(toml: &str) -> FilterResult<Self> {
        let config: FilterConfig = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, compiling every template once
    pub fn validate(&self) -> FilterResult<()> {
        if self.meter.is_empty() {
            return Err(FilterError::config(
                "meter must name at least one key template",
            ));
        }

        for template in &self.meter {
            KeyTemplate::parse(template)?;
        }

        self.engine.validate()?;
        Ok(())
    }
}
