//! Metering engine configuration
//!
//! # Defaults
//!
//! A default config meters every key with all three rate windows:
//! - `flush_interval`: 5s
//! - `clear_interval`: none (counters are never cleared)
//! - `ignore_older_than`: none (no age gate)
//! - `rates`: 1, 5 and 15 minutes
//! - `tick_interval`: 5s
//!
//! Both intervals must be positive multiples of `tick_interval`; the
//! flush cycle advances time in whole ticks, so anything finer can
//! never fire. Validation fails fast at construction, never at runtime.

use serde::Deserialize;
use std::time::Duration;

use crate::error::MeterError;
use crate::MeterResult;

/// Decay window for a rate estimate
///
/// Only these three windows exist; any other value is rejected while
/// deserializing, before an engine is ever built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u64")]
pub enum RateWindow {
    /// One-minute decay
    OneMinute,
    /// Five-minute decay
    FiveMinutes,
    /// Fifteen-minute decay
    FifteenMinutes,
}

impl RateWindow {
    /// All windows, in ascending order
    pub const ALL: [RateWindow; 3] = [
        RateWindow::OneMinute,
        RateWindow::FiveMinutes,
        RateWindow::FifteenMinutes,
    ];

    /// Window length in minutes
    #[inline]
    pub fn minutes(self) -> u64 {
        match self {
            RateWindow::OneMinute => 1,
            RateWindow::FiveMinutes => 5,
            RateWindow::FifteenMinutes => 15,
        }
    }
}

impl TryFrom<u64> for RateWindow {
    type Error = MeterError;

    fn try_from(minutes: u64) -> Result<Self, Self::Error> {
        match minutes {
            1 => Ok(RateWindow::OneMinute),
            5 => Ok(RateWindow::FiveMinutes),
            15 => Ok(RateWindow::FifteenMinutes),
            other => Err(MeterError::config(format!(
                "rates must contain only 1, 5 or 15, got {other}"
            ))),
        }
    }
}

/// Metering engine configuration
///
/// # Example
///
/// ```toml
/// flush_interval = "10s"
/// clear_interval = "1m"
/// ignore_older_than = "30s"
/// rates = [1, 5]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// How often each key emits a snapshot
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,

    /// How often each key's counters are reset; absent means never
    /// Default: none
    #[serde(with = "humantime_serde")]
    pub clear_interval: Option<Duration>,

    /// Skip events older than this at mark time; absent means no gate
    /// Default: none
    #[serde(with = "humantime_serde")]
    pub ignore_older_than: Option<Duration>,

    /// Which decay windows to compute, in minutes
    /// Default: [1, 5, 15]
    pub rates: Vec<RateWindow>,

    /// Cadence the host drives `flush` at
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(5),
            clear_interval: None,
            ignore_older_than: None,
            rates: RateWindow::ALL.to_vec(),
            tick_interval: Duration::from_secs(5),
        }
    }
}

impl MeterConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the snapshot emission interval
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Set the counter reset interval
    pub fn with_clear_interval(mut self, interval: Duration) -> Self {
        self.clear_interval = Some(interval);
        self
    }

    /// Set the maximum event age accepted at mark time
    pub fn with_ignore_older_than(mut self, age: Duration) -> Self {
        self.ignore_older_than = Some(age);
        self
    }

    /// Set which decay windows to compute
    pub fn with_rates(mut self, rates: Vec<RateWindow>) -> Self {
        self.rates = rates;
        self
    }

    /// Set the tick cadence
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Tick cadence in whole seconds
    #[inline]
    pub fn tick_secs(&self) -> u64 {
        self.tick_interval.as_secs()
    }

    /// Flush interval in whole seconds
    #[inline]
    pub fn flush_secs(&self) -> u64 {
        self.flush_interval.as_secs()
    }

    /// Clear interval in whole seconds, if clearing is enabled
    #[inline]
    pub fn clear_secs(&self) -> Option<u64> {
        self.clear_interval.map(|d| d.as_secs())
    }

    /// Validate the configuration
    pub fn validate(&self) -> MeterResult<()> {
        if self.tick_interval.is_zero() || self.tick_interval.subsec_nanos() != 0 {
            return Err(MeterError::config(
                "tick_interval must be a positive whole number of seconds",
            ));
        }

        let tick = self.tick_interval.as_secs();

        if self.flush_interval.is_zero()
            || self.flush_interval.subsec_nanos() != 0
            || self.flush_interval.as_secs() % tick != 0
        {
            return Err(MeterError::config(format!(
                "flush_interval must be a positive multiple of the {tick}s tick_interval"
            )));
        }

        if let Some(clear) = self.clear_interval {
            if clear.is_zero() || clear.subsec_nanos() != 0 || clear.as_secs() % tick != 0 {
                return Err(MeterError::config(format!(
                    "clear_interval must be a positive multiple of the {tick}s tick_interval"
                )));
            }
        }

        if let Some(age) = self.ignore_older_than {
            if age.is_zero() {
                return Err(MeterError::config(
                    "ignore_older_than must be greater than zero when set",
                ));
            }
        }

        if self.rates.is_empty() {
            return Err(MeterError::config("rates must name at least one window"));
        }

        for (i, window) in self.rates.iter().enumerate() {
            if self.rates[..i].contains(window) {
                return Err(MeterError::config(format!(
                    "rates lists the {}-minute window twice",
                    window.minutes()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MeterConfig::default();
        assert_eq!(config.flush_interval, Duration::from_secs(5));
        assert_eq!(config.clear_interval, None);
        assert_eq!(config.ignore_older_than, None);
        assert_eq!(config.rates, RateWindow::ALL.to_vec());
        assert_eq!(config.tick_interval, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_empty() {
        let config: MeterConfig = toml::from_str("").unwrap();
        assert_eq!(config.flush_interval, Duration::from_secs(5));
        assert_eq!(config.rates.len(), 3);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
flush_interval = "10s"
clear_interval = "1m"
ignore_older_than = "30s"
rates = [1, 5]
tick_interval = "5s"
"#;
        let config: MeterConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.flush_interval, Duration::from_secs(10));
        assert_eq!(config.clear_interval, Some(Duration::from_secs(60)));
        assert_eq!(config.ignore_older_than, Some(Duration::from_secs(30)));
        assert_eq!(
            config.rates,
            vec![RateWindow::OneMinute, RateWindow::FiveMinutes]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_rejects_unknown_window() {
        let result = toml::from_str::<MeterConfig>("rates = [1, 7]");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("1, 5 or 15"), "unexpected error: {err}");
    }

    #[test]
    fn test_validate_rejects_empty_rates() {
        let config = MeterConfig::default().with_rates(vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_rates() {
        let config = MeterConfig::default()
            .with_rates(vec![RateWindow::OneMinute, RateWindow::OneMinute]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_misaligned_flush_interval() {
        let config = MeterConfig::default().with_flush_interval(Duration::from_secs(7));
        assert!(config.validate().is_err());

        let config = MeterConfig::default().with_flush_interval(Duration::from_millis(5500));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_intervals() {
        let config = MeterConfig::default().with_flush_interval(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = MeterConfig::default().with_clear_interval(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = MeterConfig::default().with_tick_interval(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = MeterConfig::default().with_ignore_older_than(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_multiples_of_tick() {
        let config = MeterConfig::default()
            .with_flush_interval(Duration::from_secs(15))
            .with_clear_interval(Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rate_window_try_from() {
        assert_eq!(RateWindow::try_from(1).unwrap(), RateWindow::OneMinute);
        assert_eq!(RateWindow::try_from(5).unwrap(), RateWindow::FiveMinutes);
        assert_eq!(RateWindow::try_from(15).unwrap(), RateWindow::FifteenMinutes);
        assert!(RateWindow::try_from(0).is_err());
        assert!(RateWindow::try_from(10).is_err());
    }
}
