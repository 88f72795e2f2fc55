//! Battery data structures.

use crate::error::{Error, Result};

/// Battery charge state of the mug.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battery {
    /// Charge level in percent (0-100).
    pub percent: f64,
    /// Whether the mug is sitting on its charging base.
    pub on_charging_base: bool,
}

impl Battery {
    /// Parse battery state from its wire encoding.
    ///
    /// Byte 0 is the charge percent, byte 1 is 1 when the mug is on the base.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two bytes are provided.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(Error::InvalidData {
                context: format!("battery needs 2 bytes, got {}", data.len()),
            });
        }
        Ok(Self {
            percent: f64::from(data[0]),
            on_charging_base: data[1] == 1,
        })
    }

    /// Check if the battery is low (below 15%).
    pub fn is_low(&self) -> bool {
        self.percent < 15.0
    }
}

impl std::fmt::Display for Battery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.on_charging_base {
            write!(f, "{:.0}% (charging)", self.percent)
        } else {
            write!(f, "{:.0}%", self.percent)
        }
    }
}
