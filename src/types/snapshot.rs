//! Bulk dump types

use serde::Serialize;
use std::collections::BTreeMap;

use super::Value;

/// A sorted dump of every session key and every telemetry variable.
pub type Snapshot = BTreeMap<String, SnapshotEntry>;

/// One entry of a [`Snapshot`].
///
/// Serializes untagged: session values as-is, telemetry values in their
/// typed form, and `Missing` as null.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SnapshotEntry {
    /// Value from the session document
    Session(serde_yaml_ng::Value),
    /// Current value of a telemetry variable
    Telemetry(Value),
    /// Telemetry variable with no written value in any buffer
    Missing,
}

impl SnapshotEntry {
    pub fn is_missing(&self) -> bool {
        matches!(self, SnapshotEntry::Missing)
    }

    /// The telemetry value, if this entry holds one.
    pub fn telemetry(&self) -> Option<&Value> {
        match self {
            SnapshotEntry::Telemetry(value) => Some(value),
            _ => None,
        }
    }

    /// The session value, if this entry holds one.
    pub fn session(&self) -> Option<&serde_yaml_ng::Value> {
        match self {
            SnapshotEntry::Session(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Option<Value>> for SnapshotEntry {
    fn from(value: Option<Value>) -> Self {
        value.map_or(SnapshotEntry::Missing, SnapshotEntry::Telemetry)
    }
}
