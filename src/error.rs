//! Error types for the ember-mug-ble crate.

use thiserror::Error;

use crate::data::MugAttribute;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Bluetooth-related error from the underlying BLE library.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// Bluetooth is not available or is disabled on this system.
    #[error("Bluetooth not available or disabled")]
    BluetoothUnavailable,

    /// The specified mug was not found.
    #[error("Mug not found: {identifier}")]
    MugNotFound {
        /// The identifier that was searched for.
        identifier: String,
    },

    /// A mug with this address is already registered.
    #[error("Mug already registered: {identifier}")]
    AlreadyRegistered {
        /// The address that was registered twice.
        identifier: String,
    },

    /// Operation requires a connection but the mug is not connected.
    #[error("Mug not connected")]
    NotConnected,

    /// Failed to establish a connection to the mug.
    #[error("Connection failed: {reason}")]
    ConnectionFailed {
        /// Description of why the connection failed.
        reason: String,
    },

    /// Failed to read or decode a mug attribute.
    #[error("Failed to read {attribute}: {reason}")]
    ReadFailed {
        /// The attribute that could not be read.
        attribute: MugAttribute,
        /// Description of the failure.
        reason: String,
    },

    /// Failed to write a mug attribute.
    #[error("Failed to write {attribute}: {reason}")]
    WriteFailed {
        /// The attribute that could not be written.
        attribute: MugAttribute,
        /// Description of the failure.
        reason: String,
    },

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter {
        /// The name of the parameter.
        name: String,
        /// The invalid value that was provided.
        value: String,
    },

    /// Invalid data was received from the mug.
    #[error("Invalid data received: {context}")]
    InvalidData {
        /// Description of what was invalid about the data.
        context: String,
    },

    /// Characteristic not found on the device.
    #[error("Characteristic not found: {uuid}")]
    CharacteristicNotFound {
        /// The UUID of the characteristic that was not found.
        uuid: String,
    },

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
