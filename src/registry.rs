//! Registry owning every configured mug's session and supervisor.
//!
//! The integration's lifecycle manager holds one registry and passes it by
//! reference to whatever needs session or snapshot access; nothing reaches
//! for ambient global state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::ble::transport::GattTransport;
use crate::config::{MugConfig, PollConfig};
use crate::data::MugSnapshot;
use crate::error::{Error, Result};
use crate::session::MugSession;
use crate::supervisor::PollingSupervisor;

/// One registered mug: its session, its snapshot feed, and the running
/// supervisor task.
struct ManagedMug {
    session: Arc<MugSession>,
    snapshot_rx: watch::Receiver<MugSnapshot>,
    supervisor_handle: tokio::task::JoinHandle<()>,
}

/// Owns the sessions and poll loops of all configured mugs.
pub struct MugRegistry {
    /// Managed mugs by Bluetooth address.
    mugs: RwLock<HashMap<String, ManagedMug>>,
    /// Poll timing applied to every registered mug.
    poll_config: PollConfig,
}

impl MugRegistry {
    /// Create an empty registry with default poll timing.
    pub fn new() -> Self {
        Self::with_poll_config(PollConfig::default())
    }

    /// Create an empty registry with custom poll timing.
    pub fn with_poll_config(poll_config: PollConfig) -> Self {
        Self {
            mugs: RwLock::new(HashMap::new()),
            poll_config,
        }
    }

    /// Register a mug and start its poll loop.
    ///
    /// Returns the snapshot feed for the new mug.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRegistered`] if a session for this address
    /// already exists; a mug gets exactly one session.
    pub fn register(
        &self,
        config: MugConfig,
        transport: Arc<dyn GattTransport>,
    ) -> Result<watch::Receiver<MugSnapshot>> {
        let mac_address = config.mac_address.clone();

        let mut mugs = self.mugs.write();
        if mugs.contains_key(&mac_address) {
            return Err(Error::AlreadyRegistered {
                identifier: mac_address,
            });
        }

        info!("Registering mug {}", mac_address);

        let session = Arc::new(MugSession::new(config, transport));
        let supervisor = PollingSupervisor::new(session.clone(), self.poll_config.clone());
        let snapshot_rx = supervisor.subscribe();
        let supervisor_handle = tokio::spawn(supervisor.run());

        mugs.insert(
            mac_address,
            ManagedMug {
                session,
                snapshot_rx: snapshot_rx.clone(),
                supervisor_handle,
            },
        );

        Ok(snapshot_rx)
    }

    /// Get the session of a registered mug, for command dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MugNotFound`] for an unknown address.
    pub fn session(&self, mac_address: &str) -> Result<Arc<MugSession>> {
        self.mugs
            .read()
            .get(mac_address)
            .map(|mug| mug.session.clone())
            .ok_or_else(|| Error::MugNotFound {
                identifier: mac_address.to_string(),
            })
    }

    /// Get the last published snapshot of a registered mug.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MugNotFound`] for an unknown address.
    pub fn snapshot(&self, mac_address: &str) -> Result<MugSnapshot> {
        self.mugs
            .read()
            .get(mac_address)
            .map(|mug| mug.snapshot_rx.borrow().clone())
            .ok_or_else(|| Error::MugNotFound {
                identifier: mac_address.to_string(),
            })
    }

    /// Subscribe to the snapshot feed of a registered mug.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MugNotFound`] for an unknown address.
    pub fn subscribe(&self, mac_address: &str) -> Result<watch::Receiver<MugSnapshot>> {
        self.mugs
            .read()
            .get(mac_address)
            .map(|mug| mug.snapshot_rx.clone())
            .ok_or_else(|| Error::MugNotFound {
                identifier: mac_address.to_string(),
            })
    }

    /// Stop a mug's poll loop and disconnect its session.
    ///
    /// The supervisor task is cancelled first, then the cleanup disconnect
    /// runs; disconnect never fails, so this always releases the link.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MugNotFound`] for an unknown address.
    pub async fn deregister(&self, mac_address: &str) -> Result<()> {
        let mug = self
            .mugs
            .write()
            .remove(mac_address)
            .ok_or_else(|| Error::MugNotFound {
                identifier: mac_address.to_string(),
            })?;

        info!("Deregistering mug {}", mac_address);

        mug.supervisor_handle.abort();
        if let Err(e) = mug.supervisor_handle.await {
            if !e.is_cancelled() {
                warn!("Supervisor task for {} ended oddly: {}", mac_address, e);
            }
        }

        mug.session.disconnect().await;

        Ok(())
    }

    /// Tear every registered mug down.
    pub async fn shutdown(&self) {
        info!("Shutting down mug registry");

        let addresses: Vec<String> = self.mugs.read().keys().cloned().collect();
        for mac_address in addresses {
            if let Err(e) = self.deregister(&mac_address).await {
                warn!("Error deregistering {}: {}", mac_address, e);
            }
        }
    }

    /// Addresses of all registered mugs.
    pub fn registered_mugs(&self) -> Vec<String> {
        self.mugs.read().keys().cloned().collect()
    }

    /// Number of registered mugs.
    pub fn mug_count(&self) -> usize {
        self.mugs.read().len()
    }
}

impl Default for MugRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MugRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MugRegistry")
            .field("mugs", &self.registered_mugs())
            .finish()
    }
}
