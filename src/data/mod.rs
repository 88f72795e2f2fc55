//! Data structures for mug state.
//!
//! This module contains all the core data types used to represent
//! decoded mug attributes, commands, and published snapshots.

pub mod attribute;
pub mod battery;
pub mod colour;
pub mod datetime;
pub mod firmware;
pub mod identity;
pub mod liquid;
pub mod push_event;
pub mod snapshot;
pub mod temperature;

pub use attribute::{AttributeValue, MugAttribute};
pub use battery::Battery;
pub use colour::LedColour;
pub use datetime::MugDateTime;
pub use firmware::FirmwareInfo;
pub use identity::{encode_byte_string, is_valid_mug_name, MugIdentity, MAX_NAME_LENGTH};
pub use liquid::{LiquidLevel, LiquidState};
pub use push_event::PushEvent;
pub use snapshot::{MugSnapshot, MODEL};
pub use temperature::{Temperature, TemperatureUnit};
