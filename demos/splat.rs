//! Dump every session key and telemetry variable from the live region.
//!
//! ```text
//! cargo run --example splat
//! cargo run --example splat -- Speed Gear WeekendInfo_TrackName
//! RUST_LOG=pitlane=debug cargo run --example splat
//! ```

use anyhow::Context;
use pitlane::{SnapshotEntry, TelemetryClient};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let client = TelemetryClient::connect().context("Is the simulator running?")?;
    let keys: Vec<String> = std::env::args().skip(1).collect();
    let snapshot = client.snapshot()?;

    if keys.is_empty() {
        print!("{}", serde_yaml_ng::to_string(&snapshot)?);
        return Ok(());
    }

    for key in &keys {
        match snapshot.get(key) {
            Some(SnapshotEntry::Telemetry(value)) => println!("{key}: {value}"),
            Some(SnapshotEntry::Missing) => println!("{key}: ~"),
            Some(SnapshotEntry::Session(value)) => {
                print!("{key}: {}", serde_yaml_ng::to_string(value)?)
            }
            None => eprintln!("{key}: no such key"),
        }
    }

    Ok(())
}
