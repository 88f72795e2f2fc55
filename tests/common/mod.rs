//! Scripted in-memory GATT transport for integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use ember_mug_ble::ble::uuids;
use ember_mug_ble::{Error, GattNotification, GattTransport, Result};

#[derive(Default)]
struct Inner {
    connected: bool,
    values: HashMap<Uuid, Vec<u8>>,
    /// Remaining scripted failures per characteristic.
    failing_reads: HashMap<Uuid, u32>,
    /// Remaining scripted connect failures.
    failing_connects: u32,
    connect_calls: u32,
    read_log: Vec<Uuid>,
    writes: Vec<(Uuid, Vec<u8>)>,
    subscriptions: Vec<Uuid>,
}

/// In-memory transport backed by a scriptable characteristic table.
pub struct FakeTransport {
    inner: Arc<Mutex<Inner>>,
    notification_tx: broadcast::Sender<GattNotification>,
}

#[allow(dead_code)]
impl FakeTransport {
    /// An empty transport with no characteristics.
    pub fn new() -> Arc<Self> {
        let (notification_tx, _) = broadcast::channel(64);
        Arc::new(Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            notification_tx,
        })
    }

    /// A transport preloaded with a plausible mug.
    pub fn with_default_mug() -> Arc<Self> {
        let transport = Self::new();
        {
            let mut inner = transport.inner.lock();
            inner
                .values
                .insert(uuids::LED_UUID, vec![255, 0, 0, 255]);
            // 55.00°C
            inner
                .values
                .insert(uuids::CURRENT_TEMPERATURE_UUID, vec![0x7c, 0x15]);
            // 55.50°C
            inner
                .values
                .insert(uuids::TARGET_TEMPERATURE_UUID, vec![0xae, 0x15]);
            inner.values.insert(uuids::BATTERY_UUID, vec![64, 1]);
            inner.values.insert(uuids::LIQUID_LEVEL_UUID, vec![13]);
            inner.values.insert(uuids::LIQUID_STATE_UUID, vec![6]);
            inner
                .values
                .insert(uuids::MUG_NAME_UUID, b"EMBER".to_vec());
            inner.values.insert(
                uuids::DATE_TIME_ZONE_UUID,
                vec![0x00, 0x66, 0xee, 0x5f, 0xfe],
            );
            inner.values.insert(
                uuids::FIRMWARE_UUID,
                vec![0x63, 0x01, 0x0c, 0x00, 0x01, 0x00],
            );
            inner.values.insert(uuids::UDSK_UUID, vec![1, 2, 3, 4]);
            inner.values.insert(uuids::DSK_UUID, vec![5, 6, 7, 8]);

            let mut mug_id = vec![1, 2, 3, 4, 5, 6, b'-'];
            mug_id.extend_from_slice(b"CM19XA12");
            inner.values.insert(uuids::MUG_ID_UUID, mug_id);
        }
        transport
    }

    /// Set the stored value of a characteristic.
    pub fn set_value(&self, uuid: Uuid, data: &[u8]) {
        self.inner.lock().values.insert(uuid, data.to_vec());
    }

    /// Make the next `count` reads of a characteristic fail.
    pub fn fail_reads(&self, uuid: Uuid, count: u32) {
        self.inner.lock().failing_reads.insert(uuid, count);
    }

    /// Make the next `count` connect calls fail.
    pub fn fail_connects(&self, count: u32) {
        self.inner.lock().failing_connects = count;
    }

    /// Drop the link without telling anyone, like real BLE does.
    pub fn drop_link(&self) {
        self.inner.lock().connected = false;
    }

    /// Deliver a notification as if the device pushed one.
    pub fn notify(&self, uuid: Uuid, data: &[u8]) {
        let _ = self.notification_tx.send(GattNotification {
            uuid,
            data: data.to_vec(),
        });
    }

    /// Push a mug event through the push event characteristic.
    pub fn push_event(&self, event_id: u8) {
        self.notify(uuids::PUSH_EVENT_UUID, &[event_id]);
    }

    /// Total connect calls so far, including failed ones.
    pub fn connect_calls(&self) -> u32 {
        self.inner.lock().connect_calls
    }

    /// Characteristics read so far, in order; cleared on return.
    pub fn take_read_log(&self) -> Vec<Uuid> {
        std::mem::take(&mut self.inner.lock().read_log)
    }

    /// Writes performed so far.
    pub fn writes(&self) -> Vec<(Uuid, Vec<u8>)> {
        self.inner.lock().writes.clone()
    }

    /// Characteristics subscribed so far.
    pub fn subscriptions(&self) -> Vec<Uuid> {
        self.inner.lock().subscriptions.clone()
    }
}

#[async_trait]
impl GattTransport for FakeTransport {
    async fn connect(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.connect_calls += 1;

        if inner.failing_connects > 0 {
            inner.failing_connects -= 1;
            return Err(Error::ConnectionFailed {
                reason: "scripted connect failure".to_string(),
            });
        }

        inner.connected = true;
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.inner.lock().connected = false;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.inner.lock().connected
    }

    async fn read(&self, uuid: Uuid) -> Result<Vec<u8>> {
        let mut inner = self.inner.lock();

        if !inner.connected {
            return Err(Error::NotConnected);
        }

        inner.read_log.push(uuid);

        if let Some(remaining) = inner.failing_reads.get_mut(&uuid) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::Internal("scripted read failure".to_string()));
            }
        }

        inner
            .values
            .get(&uuid)
            .cloned()
            .ok_or_else(|| Error::CharacteristicNotFound {
                uuid: uuid.to_string(),
            })
    }

    async fn write(&self, uuid: Uuid, data: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();

        if !inner.connected {
            return Err(Error::NotConnected);
        }

        inner.writes.push((uuid, data.to_vec()));
        inner.values.insert(uuid, data.to_vec());
        Ok(())
    }

    async fn subscribe(&self, uuid: Uuid) -> Result<()> {
        let mut inner = self.inner.lock();

        if !inner.connected {
            return Err(Error::NotConnected);
        }

        inner.subscriptions.push(uuid);
        Ok(())
    }

    fn notifications(&self) -> broadcast::Receiver<GattNotification> {
        self.notification_tx.subscribe()
    }
}
