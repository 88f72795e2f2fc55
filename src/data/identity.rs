//! Mug identity and naming.

use base64::prelude::*;

use crate::error::{Error, Result};

/// Maximum length of a mug name in characters.
pub const MAX_NAME_LENGTH: usize = 16;

/// Punctuation the mug accepts in names, besides ASCII letters and digits.
const NAME_PUNCTUATION: &str = ",.[]#()!\"';:|-_+<>%= ";

/// Immutable identity of a mug, read once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MugIdentity {
    /// Device ID, base64 encoded the way the Ember app shows it.
    pub mug_id: String,
    /// Serial number printed on the underside of the mug.
    pub serial_number: String,
}

impl MugIdentity {
    /// Parse the identity from the mug ID characteristic.
    ///
    /// Bytes 0..6 hold the device ID, byte 6 is a separator, and the
    /// remainder is the serial number as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than seven bytes are provided or the serial
    /// number is not valid UTF-8.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 7 {
            return Err(Error::InvalidData {
                context: format!("mug id needs at least 7 bytes, got {}", data.len()),
            });
        }

        let serial_number =
            std::str::from_utf8(&data[7..]).map_err(|_| Error::InvalidData {
                context: "serial number is not valid UTF-8".to_string(),
            })?;

        Ok(Self {
            mug_id: encode_byte_string(&data[..6]),
            serial_number: serial_number.to_string(),
        })
    }
}

impl std::fmt::Display for MugIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.mug_id, self.serial_number)
    }
}

/// Encode raw bytes as base64 text, the form Ember uses for IDs and keys.
pub fn encode_byte_string(data: &[u8]) -> String {
    BASE64_STANDARD.encode(data)
}

/// Check whether a name is accepted by the mug.
///
/// Names are 1 to 16 characters from a limited ASCII set.
pub fn is_valid_mug_name(name: &str) -> bool {
    let length = name.chars().count();
    if length == 0 || length > MAX_NAME_LENGTH {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || NAME_PUNCTUATION.contains(c))
}
