//! Point-in-time view of everything known about a mug.

use chrono::{DateTime, Utc};

use crate::data::{
    AttributeValue, Battery, FirmwareInfo, LedColour, LiquidLevel, LiquidState, MugDateTime,
    Temperature,
};

/// Marketing name of the device family.
pub const MODEL: &str = "Ember Mug";

/// Snapshot of a mug's state as of the last successful read.
///
/// Fields are `None` until the attribute has been read at least once in the
/// current process. Snapshots are cheap to clone and are published through a
/// watch channel by the polling supervisor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MugSnapshot {
    /// Bluetooth address the mug was registered under.
    pub mac_address: String,
    /// User-assigned name.
    pub name: Option<String>,
    /// Device ID, base64 encoded.
    pub mug_id: Option<String>,
    /// Serial number.
    pub serial_number: Option<String>,
    /// Firmware versions.
    pub firmware: Option<FirmwareInfo>,
    /// Drink temperature.
    pub current_temperature: Option<Temperature>,
    /// Heater set point.
    pub target_temperature: Option<Temperature>,
    /// Battery level and charging flag.
    pub battery: Option<Battery>,
    /// Fill level.
    pub liquid_level: Option<LiquidLevel>,
    /// Heater state.
    pub liquid_state: LiquidState,
    /// LED colour.
    pub led_colour: Option<LedColour>,
    /// On-device clock.
    pub date_time_zone: Option<MugDateTime>,
    /// Device-unique pairing key, base64 encoded.
    pub udsk: Option<String>,
    /// Device secret key, base64 encoded.
    pub dsk: Option<String>,
    /// ID of the most recent push event, used to drop duplicates.
    pub latest_event_id: Option<u8>,
    /// When the last successful attribute read finished.
    pub last_read: Option<DateTime<Utc>>,
    /// Whether the mug is currently reachable over Bluetooth.
    pub available: bool,
}

impl MugSnapshot {
    /// An empty, unavailable snapshot for a mug nothing has been read from.
    pub fn new(mac_address: impl Into<String>) -> Self {
        Self {
            mac_address: mac_address.into(),
            name: None,
            mug_id: None,
            serial_number: None,
            firmware: None,
            current_temperature: None,
            target_temperature: None,
            battery: None,
            liquid_level: None,
            liquid_state: LiquidState::Unknown,
            led_colour: None,
            date_time_zone: None,
            udsk: None,
            dsk: None,
            latest_event_id: None,
            last_read: None,
            available: false,
        }
    }

    /// Store a freshly decoded attribute value.
    ///
    /// Returns whether the stored value actually changed.
    pub fn apply(&mut self, value: AttributeValue) -> bool {
        match value {
            AttributeValue::Led(v) => replace(&mut self.led_colour, v),
            AttributeValue::CurrentTemperature(v) => replace(&mut self.current_temperature, v),
            AttributeValue::TargetTemperature(v) => replace(&mut self.target_temperature, v),
            AttributeValue::Battery(v) => replace(&mut self.battery, v),
            AttributeValue::LiquidLevel(v) => replace(&mut self.liquid_level, v),
            AttributeValue::LiquidState(v) => {
                let changed = self.liquid_state != v;
                self.liquid_state = v;
                changed
            }
            AttributeValue::Name(v) => replace(&mut self.name, v),
            AttributeValue::DateTimeZone(v) => replace(&mut self.date_time_zone, v),
            AttributeValue::Firmware(v) => replace(&mut self.firmware, v),
            AttributeValue::Udsk(v) => replace(&mut self.udsk, v),
            AttributeValue::Dsk(v) => replace(&mut self.dsk, v),
            AttributeValue::MugId(identity) => {
                let id_changed = replace(&mut self.mug_id, identity.mug_id);
                let serial_changed = replace(&mut self.serial_number, identity.serial_number);
                id_changed || serial_changed
            }
        }
    }

    /// Human-readable heater state, e.g. `"Perfect"` or `"Cold (No control)"`.
    pub fn liquid_state_label(&self) -> &'static str {
        self.liquid_state.label()
    }

    /// Whether the mug holds any liquid.
    pub fn has_liquid(&self) -> bool {
        self.liquid_level.map_or(false, |level| !level.is_empty())
    }
}

/// Store `value` in `slot`, reporting whether it differs from the old value.
fn replace<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    let changed = slot.as_ref() != Some(&value);
    *slot = Some(value);
    changed
}
