//! Mug session: one BLE link and the attribute table over it.
//!
//! A [`MugSession`] owns the connection lifecycle for a single mug, performs
//! full and dirty polls, and exposes the write commands. It runs no loop of
//! its own; the [`PollingSupervisor`](crate::supervisor::PollingSupervisor)
//! drives it.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::ble::transport::GattTransport;
use crate::ble::uuids;
use crate::config::MugConfig;
use crate::data::{
    is_valid_mug_name, AttributeValue, Battery, FirmwareInfo, LedColour, LiquidLevel, LiquidState,
    MugAttribute, MugSnapshot, PushEvent, Temperature, TemperatureUnit, MODEL,
};
use crate::error::{Error, Result};

/// Connection state of a session.
///
/// Only the session transitions this. `Connecting` exists only for the
/// duration of [`MugSession::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// Not connected to the mug.
    #[default]
    Disconnected,
    /// Currently attempting to connect.
    Connecting,
    /// Connected to the mug.
    Connected,
}

impl ConnectionState {
    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

/// Manages one BLE link and the set of mug attributes over it.
pub struct MugSession {
    /// Platform-provided settings for this mug.
    config: MugConfig,
    /// The BLE transport.
    transport: Arc<dyn GattTransport>,
    /// Last decoded values, updated by polls and commands.
    state: Arc<RwLock<MugSnapshot>>,
    /// Current connection state.
    connection_state: Arc<RwLock<ConnectionState>>,
    /// Attributes queued for a dirty poll.
    dirty: Arc<Mutex<BTreeSet<MugAttribute>>>,
    /// Sender half of the push event channel, installed by `push_events`.
    event_tx: Arc<Mutex<Option<mpsc::UnboundedSender<PushEvent>>>>,
    /// Handle to the notification listener task.
    listener_handle: RwLock<Option<tokio::task::JoinHandle<()>>>,
}

impl MugSession {
    /// Create a session for one mug over the given transport.
    pub fn new(config: MugConfig, transport: Arc<dyn GattTransport>) -> Self {
        let snapshot = MugSnapshot::new(config.mac_address.clone());

        Self {
            config,
            transport,
            state: Arc::new(RwLock::new(snapshot)),
            connection_state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            dirty: Arc::new(Mutex::new(BTreeSet::new())),
            event_tx: Arc::new(Mutex::new(None)),
            listener_handle: RwLock::new(None),
        }
    }

    // === Identification ===

    /// Get the Bluetooth address this session was configured with.
    pub fn mac_address(&self) -> &str {
        &self.config.mac_address
    }

    /// Get the platform-provided settings.
    pub fn config(&self) -> &MugConfig {
        &self.config
    }

    /// Display name: the configured name, then the device name, then the
    /// model name.
    pub fn display_name(&self) -> String {
        self.config
            .name
            .clone()
            .or_else(|| self.state.read().name.clone())
            .unwrap_or_else(|| MODEL.to_string())
    }

    // === Connection ===

    /// Get the current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        *self.connection_state.read()
    }

    /// Check if the session considers itself connected.
    pub fn is_connected(&self) -> bool {
        self.connection_state().is_connected()
    }

    /// Attempt to connect to the mug.
    ///
    /// No-op if already connected. On the first successful connection the
    /// immutable mug identity is read, and push event notifications are
    /// subscribed; both are tolerated failing with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionFailed`] if the transport cannot open the
    /// link.
    pub async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            debug!("Already connected to {}", self.mac_address());
            return Ok(());
        }

        info!("Connecting to mug {}", self.mac_address());
        self.set_connection_state(ConnectionState::Connecting);

        if let Err(e) = self.transport.connect().await {
            self.set_connection_state(ConnectionState::Disconnected);
            return Err(Error::ConnectionFailed {
                reason: e.to_string(),
            });
        }

        self.set_connection_state(ConnectionState::Connected);
        info!("Connected to mug {}", self.mac_address());

        // Identity is immutable, read it once per process
        let identity_known = self.state.read().serial_number.is_some();
        if !identity_known {
            match self.read_attribute(MugAttribute::MugId).await {
                Ok(value) => {
                    self.state.write().apply(value);
                }
                Err(e) => warn!("Failed to read mug identity: {}", e),
            }
        }

        if let Err(e) = self.transport.subscribe(uuids::PUSH_EVENT_UUID).await {
            warn!("Failed to subscribe to push events: {}", e);
        }

        self.start_push_listener();

        Ok(())
    }

    /// Connect if not already connected.
    ///
    /// Also reconnects when the transport reports the link silently dropped,
    /// which BLE links do without notice.
    pub async fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            if self.transport.is_connected().await {
                return Ok(());
            }
            warn!("Link to {} dropped silently, reconnecting", self.mac_address());
            self.set_connection_state(ConnectionState::Disconnected);
        }

        self.connect().await
    }

    /// Tear the link down.
    ///
    /// Best-effort cleanup: transport errors are logged and swallowed, and
    /// calling this while already disconnected is safe.
    pub async fn disconnect(&self) {
        if let Some(handle) = self.listener_handle.write().take() {
            handle.abort();
        }

        if let Err(e) = self.transport.disconnect().await {
            debug!("Ignoring disconnect error for {}: {}", self.mac_address(), e);
        }

        self.set_connection_state(ConnectionState::Disconnected);
    }

    fn set_connection_state(&self, new_state: ConnectionState) {
        let old_state = {
            let mut state = self.connection_state.write();
            std::mem::replace(&mut *state, new_state)
        };

        if old_state != new_state {
            debug!(
                "Connection state of {} changed: {} -> {}",
                self.mac_address(),
                old_state,
                new_state
            );
        }
    }

    // === Polling ===

    /// Full poll: read and decode every polled attribute.
    ///
    /// Mandatory attributes are retried once and fail the poll if still
    /// unreadable; optional ones keep their prior value with a log line. On
    /// success all dirty flags are cleared and the read time is stamped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] when called without a connection, or
    /// [`Error::ReadFailed`] for a mandatory attribute that stayed unreadable.
    pub async fn update_all(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        debug!("Full poll of {}", self.mac_address());

        for &attribute in MugAttribute::POLLED {
            let value = match self.read_attribute(attribute).await {
                Ok(value) => value,
                Err(e) if attribute.is_mandatory() => {
                    warn!("Retrying {} after read failure: {}", attribute, e);
                    self.read_attribute(attribute).await?
                }
                Err(e) => {
                    debug!("Skipping optional attribute {}: {}", attribute, e);
                    continue;
                }
            };
            self.state.write().apply(value);
        }

        self.dirty.lock().clear();
        self.state.write().last_read = Some(Utc::now());

        Ok(())
    }

    /// Dirty poll: read and decode only the attributes flagged by push
    /// events, clearing each flag once its read succeeds. A failed read
    /// leaves the flag set for the next call.
    ///
    /// Returns the attributes whose stored value changed.
    pub async fn update_queued_attributes(&self) -> Result<Vec<MugAttribute>> {
        let queued: Vec<MugAttribute> = self.dirty.lock().iter().copied().collect();
        if queued.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Queued updates for {}: {:?}", self.mac_address(), queued);

        let mut changed = Vec::new();
        for attribute in queued {
            match self.read_attribute(attribute).await {
                Ok(value) => {
                    if self.state.write().apply(value) {
                        changed.push(attribute);
                    }
                    self.dirty.lock().remove(&attribute);
                }
                Err(e) => {
                    warn!("Leaving {} queued for retry: {}", attribute, e);
                }
            }
        }

        if !changed.is_empty() {
            self.state.write().last_read = Some(Utc::now());
        }

        Ok(changed)
    }

    /// Attributes currently flagged for a dirty poll.
    pub fn queued_attributes(&self) -> Vec<MugAttribute> {
        self.dirty.lock().iter().copied().collect()
    }

    async fn read_attribute(&self, attribute: MugAttribute) -> Result<AttributeValue> {
        let data = self
            .transport
            .read(attribute.uuid())
            .await
            .map_err(|e| Error::ReadFailed {
                attribute,
                reason: e.to_string(),
            })?;

        attribute.decode(&data).map_err(|e| Error::ReadFailed {
            attribute,
            reason: e.to_string(),
        })
    }

    // === Commands ===

    /// Set the heater's target temperature.
    ///
    /// The value is converted from `unit` to Celsius and validated against
    /// the device-supported range before anything is written; exactly 0°C is
    /// accepted and turns the heater off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for an out-of-range value without
    /// touching the device, [`Error::NotConnected`] without a connection, or
    /// [`Error::WriteFailed`] when the write itself fails.
    pub async fn set_target_temperature(&self, value: f64, unit: TemperatureUnit) -> Result<()> {
        let temperature = Temperature::from_celsius(unit.to_celsius(value));
        if !temperature.is_valid_target() {
            return Err(Error::InvalidParameter {
                name: "target_temperature".to_string(),
                value: format!("{value}{unit}"),
            });
        }

        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        debug!("Set target temperature of {} to {}", self.mac_address(), temperature);

        self.write_attribute(MugAttribute::TargetTemperature, &temperature.to_bytes())
            .await
    }

    /// Set the LED colour from an RGB triple.
    ///
    /// Components are validated to fit a byte before any write; the alpha
    /// channel is always written as 255.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a component above 255 without
    /// touching the device.
    pub async fn set_led_colour(&self, rgb: (u16, u16, u16)) -> Result<()> {
        let colour = LedColour::from_rgb(rgb)?;

        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        debug!("Set LED colour of {} to {}", self.mac_address(), colour);

        self.write_attribute(MugAttribute::Led, &colour.to_bytes())
            .await
    }

    /// Set the mug's name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when the name is empty, longer
    /// than [`MAX_NAME_LENGTH`](crate::data::MAX_NAME_LENGTH) characters, or
    /// contains characters the mug rejects.
    pub async fn set_mug_name(&self, name: &str) -> Result<()> {
        if !is_valid_mug_name(name) {
            return Err(Error::InvalidParameter {
                name: "mug_name".to_string(),
                value: name.to_string(),
            });
        }

        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        debug!("Set name of {} to {:?}", self.mac_address(), name);

        self.write_attribute(MugAttribute::Name, name.as_bytes())
            .await
    }

    /// Write a characteristic and queue the attribute so the next dirty poll
    /// confirms the device-side value.
    async fn write_attribute(&self, attribute: MugAttribute, data: &[u8]) -> Result<()> {
        self.transport
            .write(attribute.uuid(), data)
            .await
            .map_err(|e| Error::WriteFailed {
                attribute,
                reason: e.to_string(),
            })?;

        self.dirty.lock().insert(attribute);

        Ok(())
    }

    // === Push events ===

    /// Receiver for push events, consumed by the polling supervisor.
    ///
    /// Each call replaces the previous receiver; events are delivered to the
    /// most recent one only.
    pub fn push_events(&self) -> mpsc::UnboundedReceiver<PushEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.event_tx.lock() = Some(tx);
        rx
    }

    /// Start the task that turns transport notifications into dirty flags
    /// and push events. Performs no BLE I/O itself.
    fn start_push_listener(&self) {
        let mut notifications = self.transport.notifications();
        let state = self.state.clone();
        let dirty = self.dirty.clone();
        let event_tx = self.event_tx.clone();
        let mac_address = self.config.mac_address.clone();

        let handle = tokio::spawn(async move {
            debug!("Push event listener for {} started", mac_address);

            loop {
                let notification = match notifications.recv().await {
                    Ok(notification) => notification,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("Push listener for {} lagged, {} dropped", mac_address, missed);
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };

                if notification.uuid != uuids::PUSH_EVENT_UUID {
                    continue;
                }

                let Some(&event_id) = notification.data.first() else {
                    continue;
                };

                // The mug repeats the last event on reconnect, drop duplicates
                {
                    let mut state = state.write();
                    if state.latest_event_id == Some(event_id) {
                        continue;
                    }
                    state.latest_event_id = Some(event_id);
                }

                let event = PushEvent::from_byte(event_id);
                info!("Push event from {}: {}", mac_address, event);

                // Charger events carry the new flag directly
                if let Some(on_base) = event.charger_status() {
                    if let Some(battery) = state.write().battery.as_mut() {
                        battery.on_charging_base = on_base;
                    }
                }

                match event.affected_attribute() {
                    Some(attribute) => {
                        dirty.lock().insert(attribute);
                    }
                    None => debug!("Push event {} queues no attribute", event),
                }

                if let Some(tx) = event_tx.lock().as_ref() {
                    let _ = tx.send(event);
                }
            }

            debug!("Push event listener for {} stopped", mac_address);
        });

        // Replace any listener from a previous connection
        if let Some(old) = self.listener_handle.write().replace(handle) {
            old.abort();
        }
    }

    // === State accessors ===

    /// Point-in-time copy of everything known about the mug.
    ///
    /// `available` reflects the current connection state; the supervisor
    /// overrides it when publishing during a restart.
    pub fn snapshot(&self) -> MugSnapshot {
        let mut snapshot = self.state.read().clone();
        snapshot.available = self.is_connected();
        snapshot
    }

    /// Last read drink temperature.
    pub fn current_temperature(&self) -> Option<Temperature> {
        self.state.read().current_temperature
    }

    /// Last read heater set point.
    pub fn target_temperature(&self) -> Option<Temperature> {
        self.state.read().target_temperature
    }

    /// Last read battery state.
    pub fn battery(&self) -> Option<Battery> {
        self.state.read().battery
    }

    /// Last read fill level.
    pub fn liquid_level(&self) -> Option<LiquidLevel> {
        self.state.read().liquid_level
    }

    /// Last read heater state.
    pub fn liquid_state(&self) -> LiquidState {
        self.state.read().liquid_state
    }

    /// Last read LED colour.
    pub fn led_colour(&self) -> Option<LedColour> {
        self.state.read().led_colour
    }

    /// Last read firmware info.
    pub fn firmware(&self) -> Option<FirmwareInfo> {
        self.state.read().firmware
    }

    /// Serial number, read once at connect time.
    pub fn serial_number(&self) -> Option<String> {
        self.state.read().serial_number.clone()
    }
}

impl Drop for MugSession {
    fn drop(&mut self) {
        if let Some(handle) = self.listener_handle.write().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for MugSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MugSession")
            .field("mac_address", &self.config.mac_address)
            .field("connection_state", &self.connection_state())
            .finish()
    }
}
