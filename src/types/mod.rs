//! Core types for telemetry data representation.
//!
//! - [`VariableType`] maps the producer's numeric type codes to storage widths
//! - [`Value`] holds one decoded telemetry reading
//! - [`SnapshotEntry`] / [`Snapshot`] describe a bulk dump of session and telemetry data
//!
//! ```rust
//! use pitlane::types::{Value, VariableType};
//!
//! let ty = VariableType::from_code(4).unwrap();
//! assert_eq!(ty, VariableType::Float32);
//! assert_eq!(ty.decode(&4500.0f32.to_le_bytes()), Some(Value::Float32(4500.0)));
//! ```

mod snapshot;
mod variable_type;

pub use snapshot::{Snapshot, SnapshotEntry};
pub use variable_type::{Value, VariableType};
