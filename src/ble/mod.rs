//! BLE communication module.
//!
//! This module provides low-level Bluetooth Low Energy functionality
//! for discovering and communicating with Ember mugs.

pub mod peripheral;
pub mod scanner;
pub mod transport;
pub mod uuids;

pub use peripheral::PeripheralTransport;
pub use scanner::{MugDiscoveryEvent, MugScanner};
pub use transport::{GattNotification, GattTransport};
pub use uuids::*;
