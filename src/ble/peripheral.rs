//! btleplug-backed GATT transport.
//!
//! Wraps a [`Peripheral`] behind the [`GattTransport`] trait: connection with
//! retries, a characteristic cache filled at service discovery, and a
//! forwarding task that republishes btleplug's notification stream.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use futures::stream::StreamExt;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::ble::transport::{GattNotification, GattTransport};
use crate::error::{Error, Result};

/// GATT transport over a btleplug peripheral.
pub struct PeripheralTransport {
    /// The peripheral to communicate with.
    peripheral: Peripheral,
    /// Cached characteristics by UUID, filled at connect time.
    characteristics: Arc<RwLock<HashMap<Uuid, Characteristic>>>,
    /// Channel for notification events.
    notification_tx: broadcast::Sender<GattNotification>,
    /// Handle to the notification forwarding task.
    forwarder_handle: RwLock<Option<tokio::task::JoinHandle<()>>>,
    /// Maximum connection attempts per connect call.
    max_connect_attempts: u32,
    /// Delay between connection attempts.
    connect_retry_delay: Duration,
}

impl PeripheralTransport {
    /// Create a transport for a peripheral.
    pub fn new(peripheral: Peripheral) -> Self {
        let (notification_tx, _) = broadcast::channel(256);

        Self {
            peripheral,
            characteristics: Arc::new(RwLock::new(HashMap::new())),
            notification_tx,
            forwarder_handle: RwLock::new(None),
            max_connect_attempts: 3,
            connect_retry_delay: Duration::from_secs(1),
        }
    }

    /// Set the retry parameters used by [`GattTransport::connect`].
    pub fn set_connect_params(&mut self, max_attempts: u32, retry_delay: Duration) {
        self.max_connect_attempts = max_attempts;
        self.connect_retry_delay = retry_delay;
    }

    /// Get the underlying peripheral.
    pub fn peripheral(&self) -> &Peripheral {
        &self.peripheral
    }

    /// Discover and cache all characteristics.
    async fn cache_characteristics(&self) {
        let services = self.peripheral.services();

        let mut chars = self.characteristics.write();
        chars.clear();

        for service in services {
            for characteristic in service.characteristics {
                trace!(
                    "Found characteristic: {} in service {}",
                    characteristic.uuid,
                    service.uuid
                );
                chars.insert(characteristic.uuid, characteristic);
            }
        }

        debug!("Discovered {} characteristics", chars.len());
    }

    /// Look up a cached characteristic.
    fn characteristic(&self, uuid: Uuid) -> Result<Characteristic> {
        self.characteristics
            .read()
            .get(&uuid)
            .cloned()
            .ok_or_else(|| Error::CharacteristicNotFound {
                uuid: uuid.to_string(),
            })
    }

    /// Start forwarding btleplug notifications onto the broadcast channel.
    async fn start_forwarder(&self) -> Result<()> {
        if let Some(handle) = self.forwarder_handle.write().take() {
            handle.abort();
        }

        let mut notifications = self
            .peripheral
            .notifications()
            .await
            .map_err(Error::Bluetooth)?;
        let notification_tx = self.notification_tx.clone();

        let handle = tokio::spawn(async move {
            debug!("Notification forwarder started");

            while let Some(notification) = notifications.next().await {
                trace!(
                    "Notification from {}: {} bytes",
                    notification.uuid,
                    notification.value.len()
                );

                let _ = notification_tx.send(GattNotification {
                    uuid: notification.uuid,
                    data: notification.value,
                });
            }

            debug!("Notification forwarder stopped");
        });

        *self.forwarder_handle.write() = Some(handle);

        Ok(())
    }
}

#[async_trait]
impl GattTransport for PeripheralTransport {
    async fn connect(&self) -> Result<()> {
        if !self.peripheral.is_connected().await.unwrap_or(false) {
            let mut attempts = 0;

            loop {
                attempts += 1;
                debug!(
                    "Connection attempt {} of {}",
                    attempts, self.max_connect_attempts
                );

                match self.peripheral.connect().await {
                    Ok(()) => break,
                    Err(e) if attempts < self.max_connect_attempts => {
                        warn!("Connection attempt {} failed: {}", attempts, e);
                        tokio::time::sleep(self.connect_retry_delay).await;
                    }
                    Err(e) => {
                        return Err(Error::ConnectionFailed {
                            reason: format!("failed after {attempts} attempts: {e}"),
                        });
                    }
                }
            }
        } else {
            debug!("Peripheral already connected at BLE level");
        }

        self.peripheral
            .discover_services()
            .await
            .map_err(Error::Bluetooth)?;
        self.cache_characteristics().await;
        self.start_forwarder().await?;

        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if let Some(handle) = self.forwarder_handle.write().take() {
            handle.abort();
        }

        self.peripheral
            .disconnect()
            .await
            .map_err(Error::Bluetooth)?;

        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    async fn read(&self, uuid: Uuid) -> Result<Vec<u8>> {
        let characteristic = self.characteristic(uuid)?;

        let data = self
            .peripheral
            .read(&characteristic)
            .await
            .map_err(Error::Bluetooth)?;

        trace!("Read {} bytes from characteristic {}", data.len(), uuid);

        Ok(data)
    }

    async fn write(&self, uuid: Uuid, data: &[u8]) -> Result<()> {
        let characteristic = self.characteristic(uuid)?;

        self.peripheral
            .write(&characteristic, data, WriteType::WithoutResponse)
            .await
            .map_err(Error::Bluetooth)?;

        trace!("Wrote {} bytes to characteristic {}", data.len(), uuid);

        Ok(())
    }

    async fn subscribe(&self, uuid: Uuid) -> Result<()> {
        let characteristic = self.characteristic(uuid)?;

        self.peripheral
            .subscribe(&characteristic)
            .await
            .map_err(Error::Bluetooth)?;

        debug!("Subscribed to notifications from {}", uuid);

        Ok(())
    }

    fn notifications(&self) -> broadcast::Receiver<GattNotification> {
        self.notification_tx.subscribe()
    }
}

impl Drop for PeripheralTransport {
    fn drop(&mut self) {
        if let Some(handle) = self.forwarder_handle.write().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for PeripheralTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeripheralTransport")
            .field("peripheral", &self.peripheral.id())
            .finish()
    }
}
