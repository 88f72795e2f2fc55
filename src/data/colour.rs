//! LED colour data structures.

use crate::error::{Error, Result};

/// The colour of the LED on the front of the mug.
///
/// The mug stores an RGBA quadruple, though the alpha channel has no visible
/// effect and the app always writes 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedColour {
    /// Red component.
    pub red: u8,
    /// Green component.
    pub green: u8,
    /// Blue component.
    pub blue: u8,
    /// Alpha component. Always written as 255.
    pub alpha: u8,
}

impl LedColour {
    /// Create a colour from RGB components with full alpha.
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 255,
        }
    }

    /// Create a colour from unvalidated RGB components.
    ///
    /// Service calls hand through plain integers, so each component is
    /// checked to fit a byte before any of them are truncated.
    ///
    /// # Errors
    ///
    /// Returns an error if any component is greater than 255.
    pub fn from_rgb(rgb: (u16, u16, u16)) -> Result<Self> {
        let (red, green, blue) = rgb;
        for (name, value) in [("red", red), ("green", green), ("blue", blue)] {
            if value > 255 {
                return Err(Error::InvalidParameter {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(Self::new(red as u8, green as u8, blue as u8))
    }

    /// Parse a colour from its wire encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than four bytes are provided.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::InvalidData {
                context: format!("LED colour needs 4 bytes, got {}", data.len()),
            });
        }
        Ok(Self {
            red: data[0],
            green: data[1],
            blue: data[2],
            alpha: data[3],
        })
    }

    /// Encode this colour for transmission.
    pub fn to_bytes(&self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    /// Hex representation, e.g. `#ff0000ff`.
    pub fn as_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

impl Default for LedColour {
    /// Factory default is white.
    fn default() -> Self {
        Self::new(255, 255, 255)
    }
}

impl std::fmt::Display for LedColour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}
