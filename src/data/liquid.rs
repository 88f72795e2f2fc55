//! Liquid state and level data structures.

use crate::error::{Error, Result};

/// What the mug is currently doing with its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LiquidState {
    /// No liquid state reported yet.
    #[default]
    Unknown,
    /// The mug is empty.
    Empty,
    /// Liquid is being poured in.
    Filling,
    /// Contents are below the controllable range; the heater is idle.
    ColdNoControl,
    /// Contents are above the target and cooling towards it.
    Cooling,
    /// Contents are below the target and being heated.
    Heating,
    /// Contents are at the target temperature.
    Perfect,
    /// Contents are above the controllable range; the heater is idle.
    WarmNoControl,
}

impl LiquidState {
    /// Parse a liquid state from its wire byte.
    ///
    /// Unrecognised values decode as [`LiquidState::Unknown`]; newer firmware
    /// may report states this library does not know about.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            1 => Self::Empty,
            2 => Self::Filling,
            3 => Self::ColdNoControl,
            4 => Self::Cooling,
            5 => Self::Heating,
            6 => Self::Perfect,
            7 => Self::WarmNoControl,
            _ => Self::Unknown,
        }
    }

    /// Human readable label, as shown by the Ember app.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Empty => "Empty",
            Self::Filling => "Filling",
            Self::ColdNoControl => "Cold (No control)",
            Self::Cooling => "Cooling",
            Self::Heating => "Heating",
            Self::Perfect => "Perfect",
            Self::WarmNoControl => "Warm (No control)",
        }
    }

    /// Check if the mug is actively controlling the drink temperature.
    pub fn is_controlling(&self) -> bool {
        matches!(self, Self::Cooling | Self::Heating | Self::Perfect)
    }
}

impl std::fmt::Display for LiquidState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Fill level of the mug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LiquidLevel(pub u8);

impl LiquidLevel {
    /// The reading that corresponds to a full mug.
    pub const FULL: u8 = 30;

    /// Parse a liquid level from its wire encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if no bytes are provided.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match data.first() {
            Some(level) => Ok(Self(*level)),
            None => Err(Error::InvalidData {
                context: "liquid level needs 1 byte, got 0".to_string(),
            }),
        }
    }

    /// Fill level as a percentage of a full mug.
    pub fn percent(&self) -> f64 {
        f64::from(self.0.min(Self::FULL)) / f64::from(Self::FULL) * 100.0
    }

    /// Check if the mug is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for LiquidLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.percent())
    }
}
