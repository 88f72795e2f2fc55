//! Mug clock data structures.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Clock state reported by the mug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MugDateTime {
    /// Current time according to the mug, `None` when the clock is unset.
    pub time: Option<DateTime<Utc>>,
    /// Timezone offset in hours, when the mug reports one.
    pub offset_hours: Option<i8>,
}

impl MugDateTime {
    /// Parse the date/time/zone characteristic.
    ///
    /// The first four bytes are a little-endian UNIX timestamp; an epoch of
    /// zero means the clock was never set. A fifth byte, when present, is a
    /// signed timezone offset in hours.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than four bytes are provided.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::InvalidData {
                context: format!("date/time needs at least 4 bytes, got {}", data.len()),
            });
        }

        let epoch = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let time = if epoch == 0 {
            None
        } else {
            DateTime::from_timestamp(i64::from(epoch), 0)
        };

        Ok(Self {
            time,
            offset_hours: data.get(4).map(|&b| b as i8),
        })
    }
}

impl std::fmt::Display for MugDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.time {
            Some(time) => match self.offset_hours {
                Some(offset) => write!(f, "{} (UTC{:+})", time.format("%Y-%m-%d %H:%M:%S"), offset),
                None => write!(f, "{}", time.format("%Y-%m-%d %H:%M:%S")),
            },
            None => write!(f, "unset"),
        }
    }
}
