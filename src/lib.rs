// Allow holding locks across await points - we use parking_lot which is designed for this
#![allow(clippy::await_holding_lock)]
// Allow derivable impls for clarity
#![allow(clippy::derivable_impls)]
// Allow unusual byte groupings for UUIDs which have standard format
#![allow(clippy::unusual_byte_groupings)]

//! # ember-mug-ble
//!
//! A cross-platform Rust library for communicating with Ember smart mugs
//! via Bluetooth Low Energy.
//!
//! The library keeps one long-lived connection per mug alive through a
//! supervised polling loop: a full poll of every attribute roughly every
//! five minutes, with cheap partial polls in between that re-read only
//! attributes the mug flagged through push notifications.
//!
//! ## Features
//!
//! - **Mug Discovery**: Find nearby Ember mugs by advertised name or service
//! - **Supervised Polling**: Self-healing connection loop with backoff restart
//! - **Decoded State**: Temperatures, battery, liquid level and state, LED
//!   colour, firmware, identity
//! - **Commands**: Set the target temperature, LED colour, and mug name
//! - **Snapshot Feed**: A watch channel publishing immutable state snapshots
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ember_mug_ble::{MugConfig, MugRegistry, MugScanner, PeripheralTransport, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Scan for nearby mugs
//!     let scanner = MugScanner::new().await?;
//!     scanner.start_scanning().await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     scanner.stop_scanning().await?;
//!
//!     // Register each discovered mug; its poll loop starts immediately
//!     let registry = MugRegistry::new();
//!     for (_, mug) in scanner.discovered_mugs() {
//!         let transport = Arc::new(PeripheralTransport::new(mug.peripheral));
//!         let mut snapshots =
//!             registry.register(MugConfig::new(mug.mac_address), transport)?;
//!
//!         // Wait for the first full poll to publish
//!         snapshots.changed().await.ok();
//!         let snapshot = snapshots.borrow().clone();
//!         println!(
//!             "{}: {:?} ({})",
//!             snapshot.mac_address,
//!             snapshot.current_temperature,
//!             snapshot.liquid_state_label(),
//!         );
//!     }
//!
//!     registry.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Platform Notes
//!
//! ### macOS
//! Requires Bluetooth permission. Add `NSBluetoothAlwaysUsageDescription`
//! to your Info.plist for bundled apps.
//!
//! ### Linux
//! Requires BlueZ. User may need to be in the `bluetooth` group.
//!
//! ### Windows
//! Requires Windows 10 or later with Bluetooth LE support.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for data types

// Public modules
pub mod ble;
pub mod config;
pub mod data;
pub mod error;
pub mod registry;
pub mod session;
pub mod supervisor;

// Re-exports for convenience
pub use config::{MugConfig, PollConfig};
pub use error::{Error, Result};
pub use registry::MugRegistry;
pub use session::{ConnectionState, MugSession};
pub use supervisor::PollingSupervisor;

// Re-export commonly used types from submodules
pub use ble::scanner::{MugDiscoveryEvent, MugScanner};
pub use ble::transport::{GattNotification, GattTransport};
pub use ble::PeripheralTransport;
pub use data::{
    AttributeValue, Battery, FirmwareInfo, LedColour, LiquidLevel, LiquidState, MugAttribute,
    MugDateTime, MugIdentity, MugSnapshot, PushEvent, Temperature, TemperatureUnit, MODEL,
};
