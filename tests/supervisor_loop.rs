//! Supervisor loop behaviour: publish cadence, failure containment, teardown.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::FakeTransport;
use ember_mug_ble::ble::uuids;
use ember_mug_ble::{
    GattTransport, MugConfig, MugRegistry, MugSession, PollConfig, PollingSupervisor, Temperature,
};

const MAC: &str = "aa:bb:cc:dd:ee:ff";

fn test_poll_config() -> PollConfig {
    PollConfig {
        dirty_polls_per_cycle: 3,
        dirty_poll_interval: Duration::from_millis(100),
        initial_backoff: Duration::from_secs(1),
        max_backoff: Duration::from_secs(8),
    }
}

fn supervisor(transport: Arc<FakeTransport>) -> PollingSupervisor {
    let session = Arc::new(MugSession::new(MugConfig::new(MAC), transport));
    PollingSupervisor::new(session, test_poll_config())
}

#[tokio::test(start_paused = true)]
async fn first_full_poll_publishes_available_snapshot() {
    let transport = FakeTransport::with_default_mug();
    let supervisor = supervisor(transport.clone());
    let mut snapshots = supervisor.subscribe();

    let handle = tokio::spawn(supervisor.run());

    snapshots.changed().await.unwrap();
    let snapshot = snapshots.borrow_and_update().clone();
    assert!(snapshot.available);
    assert_eq!(snapshot.current_temperature, Some(Temperature(55.0)));
    assert_eq!(snapshot.serial_number.as_deref(), Some("CM19XA12"));

    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn failed_cycle_publishes_unavailable_then_recovers() {
    let transport = FakeTransport::with_default_mug();
    // Both the read and its retry fail, killing the first cycle
    transport.fail_reads(uuids::CURRENT_TEMPERATURE_UUID, 2);

    let supervisor = supervisor(transport.clone());
    let mut snapshots = supervisor.subscribe();
    let handle = tokio::spawn(supervisor.run());

    // The failure is contained: nothing propagates, the loop marks the mug
    // unavailable and restarts on its own
    snapshots.changed().await.unwrap();
    assert!(!snapshots.borrow_and_update().available);

    // After the backoff the next cycle completes a full poll again
    snapshots.changed().await.unwrap();
    let snapshot = snapshots.borrow_and_update().clone();
    assert!(snapshot.available);
    assert_eq!(snapshot.current_temperature, Some(Temperature(55.0)));

    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn push_event_triggers_out_of_band_publish() {
    let transport = FakeTransport::with_default_mug();
    let supervisor = supervisor(transport.clone());
    let mut snapshots = supervisor.subscribe();
    let handle = tokio::spawn(supervisor.run());

    // Wait for the first full poll
    snapshots.changed().await.unwrap();
    assert_eq!(snapshots.borrow_and_update().battery.unwrap().percent, 64.0);

    // The device reports a battery change; the dirty poll picks it up and
    // republishes without waiting for the next full poll
    transport.set_value(uuids::BATTERY_UUID, &[30, 1]);
    transport.push_event(1);

    let updated = tokio::time::timeout(Duration::from_secs(3600), async {
        loop {
            snapshots.changed().await.unwrap();
            let snapshot = snapshots.borrow_and_update().clone();
            if snapshot.battery.map(|b| b.percent) == Some(30.0) {
                break snapshot;
            }
        }
    })
    .await
    .expect("battery change never published");

    assert!(updated.available);

    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn repeated_failures_keep_restarting() {
    let transport = FakeTransport::with_default_mug();
    // Three whole cycles die before the link behaves
    transport.fail_connects(3);

    let supervisor = supervisor(transport.clone());
    let mut snapshots = supervisor.subscribe();
    let handle = tokio::spawn(supervisor.run());

    let snapshot = tokio::time::timeout(Duration::from_secs(3600), async {
        loop {
            snapshots.changed().await.unwrap();
            let snapshot = snapshots.borrow_and_update().clone();
            if snapshot.available {
                break snapshot;
            }
        }
    })
    .await
    .expect("loop never recovered");

    assert_eq!(snapshot.current_temperature, Some(Temperature(55.0)));
    assert!(transport.connect_calls() >= 4);

    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn registry_registers_polls_and_tears_down() {
    let transport = FakeTransport::with_default_mug();
    let registry = MugRegistry::with_poll_config(test_poll_config());

    let mut snapshots = registry
        .register(MugConfig::new(MAC), transport.clone())
        .unwrap();
    assert_eq!(registry.mug_count(), 1);

    // Double registration is refused, one session per mug
    assert!(registry
        .register(MugConfig::new(MAC), transport.clone())
        .is_err());

    snapshots.changed().await.unwrap();
    assert!(snapshots.borrow_and_update().available);
    assert!(registry.snapshot(MAC).unwrap().available);

    // Commands reach the mug through the registry's session handle
    let session = registry.session(MAC).unwrap();
    session.set_led_colour((0, 255, 0)).await.unwrap();
    assert!(transport
        .writes()
        .contains(&(uuids::LED_UUID, vec![0, 255, 0, 255])));

    // Teardown cancels the loop and runs the final disconnect
    registry.deregister(MAC).await.unwrap();
    assert_eq!(registry.mug_count(), 0);
    assert!(!transport.is_connected().await);
    assert!(registry.session(MAC).is_err());
}

#[tokio::test(start_paused = true)]
async fn shutdown_disconnects_every_mug() {
    let registry = MugRegistry::with_poll_config(test_poll_config());
    let first = FakeTransport::with_default_mug();
    let second = FakeTransport::with_default_mug();

    registry
        .register(MugConfig::new(MAC), first.clone())
        .unwrap();
    registry
        .register(MugConfig::new("11:22:33:44:55:66"), second.clone())
        .unwrap();
    assert_eq!(registry.mug_count(), 2);

    registry.shutdown().await;
    assert_eq!(registry.mug_count(), 0);
    assert!(!first.is_connected().await);
    assert!(!second.is_connected().await);
}
