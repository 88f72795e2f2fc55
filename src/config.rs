//! Per-mug configuration.

use std::time::Duration;

use crate::data::TemperatureUnit;

/// Settings the hosting platform persists for one mug.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MugConfig {
    /// Bluetooth address of the mug.
    pub mac_address: String,
    /// Display name chosen at setup, falls back to the device name.
    pub name: Option<String>,
    /// Unit temperatures are displayed and commanded in.
    pub temperature_unit: TemperatureUnit,
}

impl MugConfig {
    /// Configuration for a mug at the given address, with defaults.
    pub fn new(mac_address: impl Into<String>) -> Self {
        Self {
            mac_address: mac_address.into(),
            name: None,
            temperature_unit: TemperatureUnit::Celsius,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the display unit.
    pub fn with_temperature_unit(mut self, unit: TemperatureUnit) -> Self {
        self.temperature_unit = unit;
        self
    }
}

/// Timing of the polling supervisor.
///
/// The defaults connect, take a full poll, then keep the link warm with a
/// dirty poll every 2 seconds for roughly five minutes before forcing the
/// next full poll. Tests override these with much smaller values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Number of dirty polls between full polls.
    pub dirty_polls_per_cycle: u32,
    /// Delay between dirty polls.
    pub dirty_poll_interval: Duration,
    /// Delay before the first restart after a failed cycle.
    pub initial_backoff: Duration,
    /// Upper bound for the restart delay.
    pub max_backoff: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            dirty_polls_per_cycle: 150,
            dirty_poll_interval: Duration::from_secs(2),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mug_config_builder() {
        let config = MugConfig::new("aa:bb:cc:dd:ee:ff")
            .with_name("Kitchen Mug")
            .with_temperature_unit(TemperatureUnit::Fahrenheit);

        assert_eq!(config.mac_address, "aa:bb:cc:dd:ee:ff");
        assert_eq!(config.name.as_deref(), Some("Kitchen Mug"));
        assert_eq!(config.temperature_unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_poll_config_defaults() {
        let config = PollConfig::default();
        assert_eq!(config.dirty_polls_per_cycle, 150);
        assert_eq!(config.dirty_poll_interval, Duration::from_secs(2));
        assert!(config.initial_backoff < config.max_backoff);
    }
}
