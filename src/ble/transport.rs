//! GATT transport seam.
//!
//! Everything the session needs from a BLE link, behind a trait so tests can
//! substitute an in-memory transport for a real peripheral.

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::Result;

/// Notification pushed by the device on a subscribed characteristic.
#[derive(Debug, Clone)]
pub struct GattNotification {
    /// UUID of the characteristic that sent the notification.
    pub uuid: Uuid,
    /// The notification payload.
    pub data: Vec<u8>,
}

/// One BLE link to one device.
///
/// Implementations must tolerate repeated `connect`/`disconnect` calls and
/// report a silently dropped link through [`GattTransport::is_connected`].
/// The production implementation is
/// [`PeripheralTransport`](crate::ble::PeripheralTransport).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GattTransport: Send + Sync {
    /// Open the link and discover services.
    async fn connect(&self) -> Result<()>;

    /// Tear the link down.
    async fn disconnect(&self) -> Result<()>;

    /// Whether the link is currently up at the BLE level.
    async fn is_connected(&self) -> bool;

    /// Read the current value of a characteristic.
    async fn read(&self, uuid: Uuid) -> Result<Vec<u8>>;

    /// Write a value to a characteristic.
    async fn write(&self, uuid: Uuid, data: &[u8]) -> Result<()>;

    /// Enable notifications for a characteristic.
    async fn subscribe(&self, uuid: Uuid) -> Result<()>;

    /// Receiver for notifications from all subscribed characteristics.
    fn notifications(&self) -> broadcast::Receiver<GattNotification>;
}
