//! Attribute table mapping mug characteristics to typed values.

use uuid::Uuid;

use crate::ble::uuids;
use crate::data::{
    encode_byte_string, Battery, FirmwareInfo, LedColour, LiquidLevel, LiquidState, MugDateTime,
    MugIdentity, Temperature,
};
use crate::error::{Error, Result};

/// A readable attribute of the mug.
///
/// Each attribute names one GATT characteristic and knows how to decode its
/// wire format. [`MugAttribute::POLLED`] fixes the order a full refresh reads
/// them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MugAttribute {
    /// LED colour shown on the front of the mug.
    Led,
    /// Temperature of the drink right now.
    CurrentTemperature,
    /// Temperature the heater tries to hold.
    TargetTemperature,
    /// Battery level and charging flag.
    Battery,
    /// How full the mug is.
    LiquidLevel,
    /// Heater state machine position.
    LiquidState,
    /// User-assigned name.
    Name,
    /// On-device clock and timezone offset.
    DateTimeZone,
    /// Firmware, hardware and bootloader versions.
    Firmware,
    /// Device-unique pairing key.
    Udsk,
    /// Device secret key.
    Dsk,
    /// Device ID and serial number, read once after connecting.
    MugId,
}

impl MugAttribute {
    /// Attributes a full refresh reads, in read order.
    ///
    /// [`MugAttribute::MugId`] is immutable, so it is read once per
    /// connection instead.
    pub const POLLED: &'static [MugAttribute] = &[
        MugAttribute::Led,
        MugAttribute::CurrentTemperature,
        MugAttribute::TargetTemperature,
        MugAttribute::Battery,
        MugAttribute::LiquidLevel,
        MugAttribute::LiquidState,
        MugAttribute::Name,
        MugAttribute::DateTimeZone,
        MugAttribute::Firmware,
        MugAttribute::Udsk,
        MugAttribute::Dsk,
    ];

    /// UUID of the characteristic backing this attribute.
    pub fn uuid(&self) -> Uuid {
        match self {
            MugAttribute::Led => uuids::LED_UUID,
            MugAttribute::CurrentTemperature => uuids::CURRENT_TEMPERATURE_UUID,
            MugAttribute::TargetTemperature => uuids::TARGET_TEMPERATURE_UUID,
            MugAttribute::Battery => uuids::BATTERY_UUID,
            MugAttribute::LiquidLevel => uuids::LIQUID_LEVEL_UUID,
            MugAttribute::LiquidState => uuids::LIQUID_STATE_UUID,
            MugAttribute::Name => uuids::MUG_NAME_UUID,
            MugAttribute::DateTimeZone => uuids::DATE_TIME_ZONE_UUID,
            MugAttribute::Firmware => uuids::FIRMWARE_UUID,
            MugAttribute::Udsk => uuids::UDSK_UUID,
            MugAttribute::Dsk => uuids::DSK_UUID,
            MugAttribute::MugId => uuids::MUG_ID_UUID,
        }
    }

    /// Whether a full refresh must surface a failure to read this attribute.
    ///
    /// Optional attributes are skipped with a log line when they fail, since
    /// some firmware revisions withhold them.
    pub fn is_mandatory(&self) -> bool {
        matches!(
            self,
            MugAttribute::Led
                | MugAttribute::CurrentTemperature
                | MugAttribute::TargetTemperature
                | MugAttribute::Battery
                | MugAttribute::LiquidLevel
                | MugAttribute::LiquidState
        )
    }

    /// Decode the raw characteristic payload into a typed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is shorter than the attribute's wire
    /// format or otherwise malformed.
    pub fn decode(&self, data: &[u8]) -> Result<AttributeValue> {
        match self {
            MugAttribute::Led => Ok(AttributeValue::Led(LedColour::from_bytes(data)?)),
            MugAttribute::CurrentTemperature => Ok(AttributeValue::CurrentTemperature(
                Temperature::from_bytes(data)?,
            )),
            MugAttribute::TargetTemperature => Ok(AttributeValue::TargetTemperature(
                Temperature::from_bytes(data)?,
            )),
            MugAttribute::Battery => Ok(AttributeValue::Battery(Battery::from_bytes(data)?)),
            MugAttribute::LiquidLevel => {
                Ok(AttributeValue::LiquidLevel(LiquidLevel::from_bytes(data)?))
            }
            MugAttribute::LiquidState => {
                let byte = data.first().ok_or_else(|| Error::InvalidData {
                    context: "liquid state needs at least 1 byte".to_string(),
                })?;
                Ok(AttributeValue::LiquidState(LiquidState::from_byte(*byte)))
            }
            MugAttribute::Name => {
                let name = std::str::from_utf8(data).map_err(|_| Error::InvalidData {
                    context: "mug name is not valid UTF-8".to_string(),
                })?;
                Ok(AttributeValue::Name(name.to_string()))
            }
            MugAttribute::DateTimeZone => Ok(AttributeValue::DateTimeZone(
                MugDateTime::from_bytes(data)?,
            )),
            MugAttribute::Firmware => {
                Ok(AttributeValue::Firmware(FirmwareInfo::from_bytes(data)?))
            }
            MugAttribute::Udsk => Ok(AttributeValue::Udsk(encode_byte_string(data))),
            MugAttribute::Dsk => Ok(AttributeValue::Dsk(encode_byte_string(data))),
            MugAttribute::MugId => Ok(AttributeValue::MugId(MugIdentity::from_bytes(data)?)),
        }
    }
}

impl std::fmt::Display for MugAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MugAttribute::Led => "led_colour",
            MugAttribute::CurrentTemperature => "current_temp",
            MugAttribute::TargetTemperature => "target_temp",
            MugAttribute::Battery => "battery",
            MugAttribute::LiquidLevel => "liquid_level",
            MugAttribute::LiquidState => "liquid_state",
            MugAttribute::Name => "mug_name",
            MugAttribute::DateTimeZone => "date_time_zone",
            MugAttribute::Firmware => "firmware",
            MugAttribute::Udsk => "udsk",
            MugAttribute::Dsk => "dsk",
            MugAttribute::MugId => "mug_id",
        };
        write!(f, "{name}")
    }
}

/// Decoded value of a single attribute.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeValue {
    Led(LedColour),
    CurrentTemperature(Temperature),
    TargetTemperature(Temperature),
    Battery(Battery),
    LiquidLevel(LiquidLevel),
    LiquidState(LiquidState),
    Name(String),
    DateTimeZone(MugDateTime),
    Firmware(FirmwareInfo),
    Udsk(String),
    Dsk(String),
    MugId(MugIdentity),
}

impl AttributeValue {
    /// The attribute this value belongs to.
    pub fn attribute(&self) -> MugAttribute {
        match self {
            AttributeValue::Led(_) => MugAttribute::Led,
            AttributeValue::CurrentTemperature(_) => MugAttribute::CurrentTemperature,
            AttributeValue::TargetTemperature(_) => MugAttribute::TargetTemperature,
            AttributeValue::Battery(_) => MugAttribute::Battery,
            AttributeValue::LiquidLevel(_) => MugAttribute::LiquidLevel,
            AttributeValue::LiquidState(_) => MugAttribute::LiquidState,
            AttributeValue::Name(_) => MugAttribute::Name,
            AttributeValue::DateTimeZone(_) => MugAttribute::DateTimeZone,
            AttributeValue::Firmware(_) => MugAttribute::Firmware,
            AttributeValue::Udsk(_) => MugAttribute::Udsk,
            AttributeValue::Dsk(_) => MugAttribute::Dsk,
            AttributeValue::MugId(_) => MugAttribute::MugId,
        }
    }
}
