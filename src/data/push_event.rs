//! Push event notifications sent by the mug.

use crate::data::MugAttribute;

/// Event delivered through the push event characteristic.
///
/// The mug sends a single event ID whenever one of its attributes changes,
/// rather than the new value itself. The changed attribute is re-read on the
/// next refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PushEvent {
    /// Battery level changed.
    BatteryChanged,
    /// Mug was placed on the charging base.
    ChargerConnected,
    /// Mug was removed from the charging base.
    ChargerDisconnected,
    /// Target temperature changed.
    TargetTemperatureChanged,
    /// Drink temperature changed.
    DrinkTemperatureChanged,
    /// Mug reports its pairing key is missing.
    AuthInfoMissing,
    /// Liquid level changed.
    LiquidLevelChanged,
    /// Liquid state changed.
    LiquidStateChanged,
    /// Battery voltage changed.
    BatteryVoltageChanged,
    /// Event ID this library does not know about.
    Unknown(u8),
}

impl PushEvent {
    /// Map a raw event ID to an event.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            1 => PushEvent::BatteryChanged,
            2 => PushEvent::ChargerConnected,
            3 => PushEvent::ChargerDisconnected,
            4 => PushEvent::TargetTemperatureChanged,
            5 => PushEvent::DrinkTemperatureChanged,
            6 => PushEvent::AuthInfoMissing,
            7 => PushEvent::LiquidLevelChanged,
            8 => PushEvent::LiquidStateChanged,
            9 => PushEvent::BatteryVoltageChanged,
            other => PushEvent::Unknown(other),
        }
    }

    /// The raw event ID.
    pub fn id(&self) -> u8 {
        match self {
            PushEvent::BatteryChanged => 1,
            PushEvent::ChargerConnected => 2,
            PushEvent::ChargerDisconnected => 3,
            PushEvent::TargetTemperatureChanged => 4,
            PushEvent::DrinkTemperatureChanged => 5,
            PushEvent::AuthInfoMissing => 6,
            PushEvent::LiquidLevelChanged => 7,
            PushEvent::LiquidStateChanged => 8,
            PushEvent::BatteryVoltageChanged => 9,
            PushEvent::Unknown(id) => *id,
        }
    }

    /// The attribute that should be re-read because of this event.
    ///
    /// Charger events affect the battery reading, which carries the charging
    /// flag. Events that carry no readable attribute return `None`.
    pub fn affected_attribute(&self) -> Option<MugAttribute> {
        match self {
            PushEvent::BatteryChanged
            | PushEvent::ChargerConnected
            | PushEvent::ChargerDisconnected => Some(MugAttribute::Battery),
            PushEvent::TargetTemperatureChanged => Some(MugAttribute::TargetTemperature),
            PushEvent::DrinkTemperatureChanged => Some(MugAttribute::CurrentTemperature),
            PushEvent::LiquidLevelChanged => Some(MugAttribute::LiquidLevel),
            PushEvent::LiquidStateChanged => Some(MugAttribute::LiquidState),
            PushEvent::AuthInfoMissing
            | PushEvent::BatteryVoltageChanged
            | PushEvent::Unknown(_) => None,
        }
    }

    /// Whether this event pins the charging flag, and to what.
    pub fn charger_status(&self) -> Option<bool> {
        match self {
            PushEvent::ChargerConnected => Some(true),
            PushEvent::ChargerDisconnected => Some(false),
            _ => None,
        }
    }
}

impl std::fmt::Display for PushEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushEvent::BatteryChanged => write!(f, "battery changed"),
            PushEvent::ChargerConnected => write!(f, "charger connected"),
            PushEvent::ChargerDisconnected => write!(f, "charger disconnected"),
            PushEvent::TargetTemperatureChanged => write!(f, "target temperature changed"),
            PushEvent::DrinkTemperatureChanged => write!(f, "drink temperature changed"),
            PushEvent::AuthInfoMissing => write!(f, "auth info missing"),
            PushEvent::LiquidLevelChanged => write!(f, "liquid level changed"),
            PushEvent::LiquidStateChanged => write!(f, "liquid state changed"),
            PushEvent::BatteryVoltageChanged => write!(f, "battery voltage changed"),
            PushEvent::Unknown(id) => write!(f, "unknown event {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_byte_round_trip() {
        for id in 1..=9 {
            let event = PushEvent::from_byte(id);
            assert_eq!(event.id(), id);
            assert!(!matches!(event, PushEvent::Unknown(_)));
        }
        assert_eq!(PushEvent::from_byte(42), PushEvent::Unknown(42));
        assert_eq!(PushEvent::from_byte(42).id(), 42);
    }

    #[test]
    fn test_affected_attributes() {
        assert_eq!(
            PushEvent::BatteryChanged.affected_attribute(),
            Some(MugAttribute::Battery)
        );
        assert_eq!(
            PushEvent::ChargerConnected.affected_attribute(),
            Some(MugAttribute::Battery)
        );
        assert_eq!(
            PushEvent::DrinkTemperatureChanged.affected_attribute(),
            Some(MugAttribute::CurrentTemperature)
        );
        assert_eq!(PushEvent::AuthInfoMissing.affected_attribute(), None);
        assert_eq!(PushEvent::BatteryVoltageChanged.affected_attribute(), None);
        assert_eq!(PushEvent::Unknown(200).affected_attribute(), None);
    }

    #[test]
    fn test_charger_status() {
        assert_eq!(PushEvent::ChargerConnected.charger_status(), Some(true));
        assert_eq!(PushEvent::ChargerDisconnected.charger_status(), Some(false));
        assert_eq!(PushEvent::BatteryChanged.charger_status(), None);
    }
}
