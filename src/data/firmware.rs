//! Firmware information data structures.

use crate::error::{Error, Result};

/// Firmware details reported by the mug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FirmwareInfo {
    /// Firmware version.
    pub version: u16,
    /// Hardware revision, when reported.
    pub hardware: Option<u16>,
    /// Bootloader version, when reported.
    pub bootloader: Option<u16>,
}

impl FirmwareInfo {
    /// Parse firmware info from its wire encoding.
    ///
    /// The payload is up to three u16 LE values: firmware version, hardware
    /// revision and bootloader version. Older firmware omits the trailing
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two bytes are provided.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(Error::InvalidData {
                context: format!("firmware info needs at least 2 bytes, got {}", data.len()),
            });
        }

        let field = |index: usize| {
            data.get(index * 2..index * 2 + 2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]))
        };

        Ok(Self {
            version: u16::from_le_bytes([data[0], data[1]]),
            hardware: field(1),
            bootloader: field(2),
        })
    }
}

impl std::fmt::Display for FirmwareInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.version)?;
        if let Some(hardware) = self.hardware {
            write!(f, " (hw {})", hardware)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firmware_full() {
        // version 355, hardware 12, bootloader 1
        let info = FirmwareInfo::from_bytes(&[0x63, 0x01, 0x0c, 0x00, 0x01, 0x00]).unwrap();
        assert_eq!(info.version, 355);
        assert_eq!(info.hardware, Some(12));
        assert_eq!(info.bootloader, Some(1));
    }

    #[test]
    fn test_firmware_version_only() {
        let info = FirmwareInfo::from_bytes(&[0x63, 0x01]).unwrap();
        assert_eq!(info.version, 355);
        assert_eq!(info.hardware, None);
        assert_eq!(info.bootloader, None);
    }

    #[test]
    fn test_firmware_partial_trailing_field() {
        // A lone trailing byte is not a complete u16 and is dropped
        let info = FirmwareInfo::from_bytes(&[0x63, 0x01, 0x0c, 0x00, 0x01]).unwrap();
        assert_eq!(info.hardware, Some(12));
        assert_eq!(info.bootloader, None);
    }

    #[test]
    fn test_firmware_too_short() {
        assert!(FirmwareInfo::from_bytes(&[]).is_err());
        assert!(FirmwareInfo::from_bytes(&[0x63]).is_err());
    }

    #[test]
    fn test_firmware_display() {
        let info = FirmwareInfo::from_bytes(&[0x63, 0x01, 0x0c, 0x00]).unwrap();
        assert_eq!(format!("{}", info), "355 (hw 12)");

        let info = FirmwareInfo::from_bytes(&[0x63, 0x01]).unwrap();
        assert_eq!(format!("{}", info), "355");
    }
}
