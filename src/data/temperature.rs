//! Temperature data structures.
//!
//! The mug reports temperatures as unsigned 16-bit little-endian values in
//! hundredths of a degree Celsius.

use crate::error::{Error, Result};

/// A drink temperature in degrees Celsius.
///
/// The conversion from the wire encoding is `celsius = raw * 0.01`, giving
/// a range of 0°C to ~655°C with 0.01°C resolution. Heating only happens
/// between [`Temperature::MIN_TARGET_CELSIUS`] and
/// [`Temperature::MAX_TARGET_CELSIUS`]; a target of exactly 0°C turns the
/// heater off.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Temperature(pub f64);

impl Temperature {
    /// Lowest target temperature the mug will hold (120°F).
    pub const MIN_TARGET_CELSIUS: f64 = 49.0;

    /// Highest target temperature the mug will hold (145°F).
    pub const MAX_TARGET_CELSIUS: f64 = 63.0;

    /// Create a temperature from degrees Celsius.
    pub fn from_celsius(celsius: f64) -> Self {
        Self(celsius)
    }

    /// Parse a temperature from its wire encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two bytes are provided.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(Error::InvalidData {
                context: format!("temperature needs 2 bytes, got {}", data.len()),
            });
        }
        let raw = u16::from_le_bytes([data[0], data[1]]);
        Ok(Self(f64::from(raw) * 0.01))
    }

    /// Encode this temperature for transmission.
    pub fn to_bytes(&self) -> [u8; 2] {
        let raw = (self.0 * 100.0).round().clamp(0.0, f64::from(u16::MAX)) as u16;
        raw.to_le_bytes()
    }

    /// Get the value in degrees Celsius.
    pub fn celsius(&self) -> f64 {
        self.0
    }

    /// Get the value in degrees Fahrenheit.
    pub fn fahrenheit(&self) -> f64 {
        TemperatureUnit::Fahrenheit.from_celsius(self.0)
    }

    /// Get the value in the given unit.
    pub fn in_unit(&self, unit: TemperatureUnit) -> f64 {
        unit.from_celsius(self.0)
    }

    /// Check whether this value is accepted as a target temperature.
    ///
    /// Exactly 0°C is accepted as the heater-off sentinel.
    pub fn is_valid_target(&self) -> bool {
        self.0 == 0.0 || (Self::MIN_TARGET_CELSIUS..=Self::MAX_TARGET_CELSIUS).contains(&self.0)
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}°C", self.0)
    }
}

/// Unit a temperature is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemperatureUnit {
    /// Degrees Celsius. The mug's native unit.
    #[default]
    Celsius,
    /// Degrees Fahrenheit.
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a value in this unit to degrees Celsius.
    pub fn to_celsius(&self, value: f64) -> f64 {
        match self {
            Self::Celsius => value,
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }

    /// Convert a value in degrees Celsius to this unit.
    pub fn from_celsius(&self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Celsius => write!(f, "°C"),
            Self::Fahrenheit => write!(f, "°F"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_from_bytes() {
        // 55.0°C = 5500 = 0x157C little-endian
        assert_eq!(
            Temperature::from_bytes(&[0x7c, 0x15]).unwrap(),
            Temperature(55.0)
        );

        // 0°C
        assert_eq!(Temperature::from_bytes(&[0, 0]).unwrap(), Temperature(0.0));

        // 55.5°C = 5550 = 0x15AE
        assert_eq!(
            Temperature::from_bytes(&[0xae, 0x15]).unwrap(),
            Temperature(55.5)
        );

        // Trailing bytes are ignored
        assert_eq!(
            Temperature::from_bytes(&[0x7c, 0x15, 0xff]).unwrap(),
            Temperature(55.0)
        );
    }

    #[test]
    fn test_temperature_from_bytes_too_short() {
        assert!(Temperature::from_bytes(&[]).is_err());
        assert!(Temperature::from_bytes(&[0x7c]).is_err());
    }

    #[test]
    fn test_temperature_to_bytes() {
        assert_eq!(Temperature(55.0).to_bytes(), [0x7c, 0x15]);
        assert_eq!(Temperature(55.5).to_bytes(), [0xae, 0x15]);
        assert_eq!(Temperature(0.0).to_bytes(), [0, 0]);
    }

    #[test]
    fn test_temperature_fahrenheit() {
        assert!((Temperature(0.0).fahrenheit() - 32.0).abs() < 0.001);
        assert!((Temperature(100.0).fahrenheit() - 212.0).abs() < 0.001);
        assert!((Temperature(55.0).fahrenheit() - 131.0).abs() < 0.001);
    }

    #[test]
    fn test_unit_conversions() {
        assert!((TemperatureUnit::Fahrenheit.to_celsius(131.0) - 55.0).abs() < 0.001);
        assert!((TemperatureUnit::Fahrenheit.from_celsius(55.0) - 131.0).abs() < 0.001);
        assert_eq!(TemperatureUnit::Celsius.to_celsius(55.0), 55.0);
        assert_eq!(TemperatureUnit::Celsius.from_celsius(55.0), 55.0);
    }

    #[test]
    fn test_unit_roundtrip() {
        let original = 63.5;
        let converted =
            TemperatureUnit::Fahrenheit.to_celsius(TemperatureUnit::Fahrenheit.from_celsius(original));
        assert!((converted - original).abs() < 0.0001);
    }

    #[test]
    fn test_is_valid_target() {
        assert!(Temperature(49.0).is_valid_target());
        assert!(Temperature(55.5).is_valid_target());
        assert!(Temperature(63.0).is_valid_target());
        // Heater off
        assert!(Temperature(0.0).is_valid_target());

        assert!(!Temperature(48.9).is_valid_target());
        assert!(!Temperature(63.1).is_valid_target());
        assert!(!Temperature(-5.0).is_valid_target());
        assert!(!Temperature(100.0).is_valid_target());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Temperature(55.5)), "55.50°C");
        assert_eq!(format!("{}", TemperatureUnit::Celsius), "°C");
        assert_eq!(format!("{}", TemperatureUnit::Fahrenheit), "°F");
    }
}
