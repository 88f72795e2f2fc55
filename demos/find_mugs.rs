//! Basic example: Discover all nearby Ember mugs
//!
//! Run with: cargo run --example find_mugs

use ember_mug_ble::{MugScanner, Result};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ember_mug_ble=debug".parse().unwrap()),
        )
        .init();

    println!("Starting Ember mug discovery...");
    println!("Make sure your mug is awake (lift it off the coaster)!\n");

    let scanner = MugScanner::new().await?;
    let mut discoveries = scanner.subscribe();

    scanner.start_scanning().await?;

    println!("Scanning for 10 seconds...\n");

    let deadline = tokio::time::sleep(Duration::from_secs(10));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            Ok(mug) = discoveries.recv() => {
                println!("Discovered mug:");
                println!("  Address: {}", mug.mac_address);
                println!("  Name: {}", mug.local_name.as_deref().unwrap_or("<unknown>"));
                if let Some(rssi) = mug.rssi {
                    println!("  RSSI: {} dBm", rssi);
                }
                println!();
            }
        }
    }

    scanner.stop_scanning().await?;

    let mugs = scanner.discovered_mugs();
    println!("Scan finished: {} mug(s) found.", mugs.len());
    for (mac_address, mug) in mugs {
        println!(
            "  {} ({})",
            mac_address,
            mug.local_name.as_deref().unwrap_or("<unknown>")
        );
    }

    Ok(())
}
