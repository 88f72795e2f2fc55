//! Perpetual polling loop for one mug.
//!
//! Drives a [`MugSession`] through connect, a full poll, then a window of
//! cheap dirty polls that keeps the link warm, publishing a [`MugSnapshot`]
//! to subscribers after every full poll and after every dirty poll that
//! changed something. Any failure tears the session down and restarts the
//! loop with an exponential backoff, so one bad cycle never wedges the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::config::PollConfig;
use crate::data::{MugSnapshot, PushEvent};
use crate::error::Result;
use crate::session::MugSession;

/// Restart delay that doubles on every consecutive failure.
///
/// Resets after a successful full poll, which proves the link works;
/// retrying an unreachable device immediately would busy-loop the adapter.
#[derive(Debug)]
struct RestartBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl RestartBackoff {
    fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// The delay to wait now; doubles the next one up to the cap.
    fn next(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Keeps exactly one [`MugSession`] alive and polled, forever.
///
/// The loop only stops when its task is cancelled by the owner, which then
/// runs the final [`MugSession::disconnect`].
pub struct PollingSupervisor {
    /// The session to drive.
    session: Arc<MugSession>,
    /// Poll timing.
    config: PollConfig,
    /// Published snapshots.
    snapshot_tx: watch::Sender<MugSnapshot>,
}

impl PollingSupervisor {
    /// Create a supervisor for a session.
    pub fn new(session: Arc<MugSession>, config: PollConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(session.snapshot());

        Self {
            session,
            config,
            snapshot_tx,
        }
    }

    /// Subscribe to published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<MugSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Get the session being driven.
    pub fn session(&self) -> &Arc<MugSession> {
        &self.session
    }

    /// Run the loop. Never returns; cancel the enclosing task to stop it.
    pub async fn run(self) {
        let mut events = self.session.push_events();
        let mut backoff =
            RestartBackoff::new(self.config.initial_backoff, self.config.max_backoff);

        info!("Starting poll loop for {}", self.session.mac_address());

        loop {
            match self.poll_cycle(&mut events, &mut backoff).await {
                Ok(()) => {}
                Err(e) => {
                    error!(
                        "Poll cycle for {} failed: {}. Restarting.",
                        self.session.mac_address(),
                        e
                    );

                    self.session.disconnect().await;
                    self.publish(false);

                    let delay = backoff.next();
                    debug!(
                        "Waiting {:?} before reconnecting to {}",
                        delay,
                        self.session.mac_address()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// One cycle: reconnect, full poll, then the dirty-poll window.
    async fn poll_cycle(
        &self,
        events: &mut mpsc::UnboundedReceiver<PushEvent>,
        backoff: &mut RestartBackoff,
    ) -> Result<()> {
        // Clear any state a previous crashed cycle left behind
        self.session.disconnect().await;

        self.session.ensure_connected().await?;

        self.session.update_all().await?;
        self.publish(true);
        backoff.reset();

        // The full poll resolved anything that was queued
        while events.try_recv().is_ok() {}

        for _ in 0..self.config.dirty_polls_per_cycle {
            self.session.ensure_connected().await?;

            let changed = self.session.update_queued_attributes().await?;
            if !changed.is_empty() {
                debug!(
                    "Dirty poll of {} changed {:?}",
                    self.session.mac_address(),
                    changed
                );
                self.publish(true);
            }

            // Sleep until the next dirty poll, waking early on a push event
            // so the flagged attribute is re-read right away
            tokio::select! {
                _ = tokio::time::sleep(self.config.dirty_poll_interval) => {}
                Some(event) = events.recv() => {
                    debug!(
                        "Waking {} early for push event: {}",
                        self.session.mac_address(),
                        event
                    );
                }
            }
        }

        Ok(())
    }

    /// Publish the current snapshot with the given liveness.
    fn publish(&self, available: bool) {
        let mut snapshot = self.session.snapshot();
        snapshot.available = available;
        self.snapshot_tx.send_replace(snapshot);
    }
}

impl std::fmt::Debug for PollingSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingSupervisor")
            .field("session", &self.session)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_to_cap() {
        let mut backoff =
            RestartBackoff::new(Duration::from_secs(1), Duration::from_secs(60));

        assert_eq!(backoff.next(), Duration::from_secs(1));
        assert_eq!(backoff.next(), Duration::from_secs(2));
        assert_eq!(backoff.next(), Duration::from_secs(4));
        for _ in 0..10 {
            backoff.next();
        }
        assert_eq!(backoff.next(), Duration::from_secs(60));
    }

    #[test]
    fn test_backoff_resets_after_success() {
        let mut backoff =
            RestartBackoff::new(Duration::from_secs(1), Duration::from_secs(60));

        backoff.next();
        backoff.next();
        backoff.reset();
        assert_eq!(backoff.next(), Duration::from_secs(1));
    }
}
