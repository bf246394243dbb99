//! Read-only client for a racing simulator's shared-memory telemetry.
//!
//! The simulator publishes one named shared region holding two kinds of data:
//! a YAML session document (track, weekend, drivers) and a table of live
//! telemetry variables whose values rotate through three buffers. Pitlane
//! discovers the region layout, decodes both and exposes them by key.
//!
//! # Features
//!
//! - **Live Telemetry**: Map the simulator's region on Windows
//! - **Any Byte Source**: Decode a captured or synthetic region on any platform
//! - **Session Lookup**: Nested session keys flattened to `WeekendInfo_TrackName` style
//! - **Bulk Dump**: One sorted [`Snapshot`] of every session key and variable
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pitlane::TelemetryClient;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TelemetryClient::connect()?;
//!
//!     for key in client.telemetry_keys() {
//!         match client.telemetry(&key)? {
//!             Some(value) => println!("{key}: {value}"),
//!             None => println!("{key}: <none>"),
//!         }
//!     }
//!     println!("{:?}", client.session("WeekendInfo_TrackName")?);
//!     Ok(())
//! }
//! ```
//!
//! A client can be built over any `AsRef<[u8]>`, which is how recorded regions
//! are replayed:
//!
//! ```rust,no_run
//! use pitlane::TelemetryClient;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("region.bin")?;
//! let client = TelemetryClient::new(bytes)?;
//! let snapshot = client.snapshot()?;
//! println!("{}", serde_yaml_ng::to_string(&snapshot)?);
//! # Ok(())
//! # }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod reader;
pub mod types;
mod yaml_utils;

// Region access and decoding
pub mod client;
pub mod region;
pub mod schema;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Platform-specific modules
#[cfg(windows)]
pub mod windows;

// Core exports
pub use client::TelemetryClient;
pub use config::{BufferSelection, ClientOptions};
pub use error::*;
pub use reader::ByteReader;
pub use region::{DEFAULT_REGION_NAME, DEFAULT_REGION_SIZE, SharedRegion};
pub use types::*;

// Schema exports
pub use schema::{BufferSet, RegionLayout, SessionDocument, VariableCatalog, VariableDescriptor};
