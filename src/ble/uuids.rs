//! BLE Service and Characteristic UUIDs.
//!
//! Contains all UUID constants used for Ember mug communication. These are
//! not published by Ember; they were recovered from the official app and
//! from community traffic captures.

use uuid::Uuid;

/// Advertised Bluetooth name of the ceramic mug.
pub const EMBER_LOCAL_NAME: &str = "Ember Ceramic Mug";

/// Ember's primary GATT service UUID.
pub const EMBER_SERVICE_UUID: Uuid = Uuid::from_u128(0xfc54_3622_236c_4c94_8fa9_944a3e5353fa);

/// Mug name characteristic (Read, Write). UTF-8, up to 16 characters.
pub const MUG_NAME_UUID: Uuid = Uuid::from_u128(0xfc54_0001_236c_4c94_8fa9_944a3e5353fa);

/// Current drink temperature characteristic (Read). u16 LE, hundredths of a degree Celsius.
pub const CURRENT_TEMPERATURE_UUID: Uuid =
    Uuid::from_u128(0xfc54_0002_236c_4c94_8fa9_944a3e5353fa);

/// Target drink temperature characteristic (Read, Write). Same encoding as current temperature.
pub const TARGET_TEMPERATURE_UUID: Uuid =
    Uuid::from_u128(0xfc54_0003_236c_4c94_8fa9_944a3e5353fa);

/// Temperature unit characteristic (Read, Write). 0 = Celsius, 1 = Fahrenheit.
pub const TEMPERATURE_UNIT_UUID: Uuid = Uuid::from_u128(0xfc54_0004_236c_4c94_8fa9_944a3e5353fa);

/// Liquid level characteristic (Read). Single byte, 0 (empty) to 30 (full).
pub const LIQUID_LEVEL_UUID: Uuid = Uuid::from_u128(0xfc54_0005_236c_4c94_8fa9_944a3e5353fa);

/// Date, time and timezone characteristic (Read, Write).
/// u32 LE epoch seconds followed by a signed offset-hours byte.
pub const DATE_TIME_ZONE_UUID: Uuid = Uuid::from_u128(0xfc54_0006_236c_4c94_8fa9_944a3e5353fa);

/// Battery characteristic (Read). Byte 0 = percent, byte 1 = 1 when on the charging base.
pub const BATTERY_UUID: Uuid = Uuid::from_u128(0xfc54_0007_236c_4c94_8fa9_944a3e5353fa);

/// Liquid state characteristic (Read). Single byte enum, see `LiquidState`.
pub const LIQUID_STATE_UUID: Uuid = Uuid::from_u128(0xfc54_0008_236c_4c94_8fa9_944a3e5353fa);

/// Firmware info characteristic (Read).
/// Three u16 LE values: firmware version, hardware revision, bootloader version.
pub const FIRMWARE_UUID: Uuid = Uuid::from_u128(0xfc54_000c_236c_4c94_8fa9_944a3e5353fa);

/// Mug ID characteristic (Read). Bytes 0..6 = device ID, bytes 7.. = serial number.
pub const MUG_ID_UUID: Uuid = Uuid::from_u128(0xfc54_000d_236c_4c94_8fa9_944a3e5353fa);

/// DSK characteristic (Read). Opaque key used by the app for auth.
pub const DSK_UUID: Uuid = Uuid::from_u128(0xfc54_000e_236c_4c94_8fa9_944a3e5353fa);

/// UDSK characteristic (Read, Write). Opaque key used by the app for auth.
pub const UDSK_UUID: Uuid = Uuid::from_u128(0xfc54_000f_236c_4c94_8fa9_944a3e5353fa);

/// Push event characteristic (Notify, Read). Single byte event ID, see `PushEvent`.
pub const PUSH_EVENT_UUID: Uuid = Uuid::from_u128(0xfc54_0012_236c_4c94_8fa9_944a3e5353fa);

/// LED colour characteristic (Read, Write). Four bytes RGBA.
pub const LED_UUID: Uuid = Uuid::from_u128(0xfc54_0014_236c_4c94_8fa9_944a3e5353fa);

/// Check if a service UUID is the Ember mug service.
pub fn is_ember_service(uuid: &Uuid) -> bool {
    *uuid == EMBER_SERVICE_UUID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_format() {
        // All Ember UUIDs share the fc54 prefix and the same tail
        let service = EMBER_SERVICE_UUID.to_string();
        assert!(service.starts_with("fc543622"));
        assert!(service.ends_with("944a3e5353fa"));

        let led = LED_UUID.to_string();
        assert!(led.starts_with("fc540014"));
        assert!(led.ends_with("944a3e5353fa"));
    }

    #[test]
    fn test_characteristics_are_distinct() {
        let uuids = [
            MUG_NAME_UUID,
            CURRENT_TEMPERATURE_UUID,
            TARGET_TEMPERATURE_UUID,
            TEMPERATURE_UNIT_UUID,
            LIQUID_LEVEL_UUID,
            DATE_TIME_ZONE_UUID,
            BATTERY_UUID,
            LIQUID_STATE_UUID,
            FIRMWARE_UUID,
            MUG_ID_UUID,
            DSK_UUID,
            UDSK_UUID,
            PUSH_EVENT_UUID,
            LED_UUID,
        ];
        for (i, a) in uuids.iter().enumerate() {
            for b in &uuids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_is_ember_service() {
        assert!(is_ember_service(&EMBER_SERVICE_UUID));
        assert!(!is_ember_service(&BATTERY_UUID));
    }
}
