//! Real-time mug monitoring example
//!
//! Run with: cargo run --example mug_monitor

use std::sync::Arc;
use std::time::Duration;

use ember_mug_ble::{
    Error, MugConfig, MugRegistry, MugScanner, MugSnapshot, PeripheralTransport, Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (minimal)
    tracing_subscriber::fmt().with_env_filter("warn").init();

    println!("Mug Monitor");
    println!("===========\n");
    println!("Looking for mugs...\n");

    let scanner = MugScanner::new().await?;
    scanner.start_scanning().await?;

    // Wait for a mug to be discovered
    tokio::time::sleep(Duration::from_secs(5)).await;
    scanner.stop_scanning().await?;

    let mug = scanner
        .discovered_mugs()
        .into_values()
        .next()
        .ok_or_else(|| Error::MugNotFound {
            identifier: "any".to_string(),
        })?;

    println!("Found mug: {}", mug.mac_address);
    println!("Connecting...\n");

    let registry = MugRegistry::new();
    let transport = Arc::new(PeripheralTransport::new(mug.peripheral.clone()));
    let mut snapshots = registry.register(MugConfig::new(&mug.mac_address), transport)?;

    println!("Polling started! Monitoring the mug...");
    println!("Press Ctrl+C to exit.\n");

    // Monitor loop
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\n\nExiting...");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                display_snapshot(&snapshot);
            }
        }
    }

    registry.shutdown().await;

    Ok(())
}

fn display_snapshot(snapshot: &MugSnapshot) {
    // Clear screen and move cursor to top
    print!("\x1B[2J\x1B[1;1H");

    println!("=== Mug Monitor ===");
    println!(
        "Mug: {} ({})",
        snapshot.name.as_deref().unwrap_or("<unnamed>"),
        snapshot.mac_address
    );
    println!(
        "Serial: {}",
        snapshot.serial_number.as_deref().unwrap_or("<unknown>")
    );
    println!(
        "Reachable: {}\n",
        if snapshot.available { "yes" } else { "no" }
    );

    if let Some(temperature) = snapshot.current_temperature {
        println!("Drink:   {}", temperature);
    }
    if let Some(target) = snapshot.target_temperature {
        println!("Target:  {}", target);
    }
    if let Some(battery) = snapshot.battery {
        println!("Battery: {}", battery);
    }
    if let Some(level) = snapshot.liquid_level {
        println!("Level:   {}", level);
    }
    println!("State:   {}", snapshot.liquid_state);
    if let Some(colour) = snapshot.led_colour {
        println!("LED:     {}", colour);
    }
}
