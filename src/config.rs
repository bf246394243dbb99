//! Client configuration

use serde::{Deserialize, Serialize};

use crate::region::{DEFAULT_REGION_NAME, DEFAULT_REGION_SIZE};
use crate::{Result, TelemetryError};

/// How [`BufferSet`](crate::schema::BufferSet) orders the value buffers it tries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferSelection {
    /// Buffer 0, then 1, then 2; the first with any non-zero byte for the variable wins.
    #[default]
    FirstNonZero,
    /// Buffers ordered by their tick counter, newest first, then the same non-zero rule.
    LatestTick,
}

/// Options for opening and decoding the shared region.
///
/// ```rust
/// use pitlane::{BufferSelection, ClientOptions};
///
/// let options = ClientOptions::from_yaml_str("flatten_session: false\nbuffer_selection: LatestTick\n")?;
/// assert!(!options.flatten_session);
/// assert_eq!(options.buffer_selection, BufferSelection::LatestTick);
/// assert_eq!(options.region_size, 798_720);
/// # Ok::<(), pitlane::TelemetryError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Name the region is published under
    pub region_name: String,
    /// Number of bytes to map
    pub region_size: usize,
    /// Join nested session keys with `_` into a single-level mapping
    pub flatten_session: bool,
    /// Buffer ordering for value reads
    pub buffer_selection: BufferSelection,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            region_name: DEFAULT_REGION_NAME.to_string(),
            region_size: DEFAULT_REGION_SIZE,
            flatten_session: true,
            buffer_selection: BufferSelection::FirstNonZero,
        }
    }
}

impl ClientOptions {
    /// Load options from YAML; missing fields keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| TelemetryError::Parse {
            context: "Client options".to_string(),
            details: e.to_string(),
        })
    }

    pub fn with_region_name(mut self, name: impl Into<String>) -> Self {
        self.region_name = name.into();
        self
    }

    pub fn with_region_size(mut self, size: usize) -> Self {
        self.region_size = size;
        self
    }

    pub fn with_flatten_session(mut self, flatten: bool) -> Self {
        self.flatten_session = flatten;
        self
    }

    pub fn with_buffer_selection(mut self, selection: BufferSelection) -> Self {
        self.buffer_selection = selection;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_producer() {
        let options = ClientOptions::default();
        assert_eq!(options.region_name, "Local\\IRSDKMemMapFileName");
        assert_eq!(options.region_size, 798_720);
        assert!(options.flatten_session);
        assert_eq!(options.buffer_selection, BufferSelection::FirstNonZero);
    }

    #[test]
    fn empty_yaml_mapping_yields_defaults() {
        let options = ClientOptions::from_yaml_str("{}").unwrap();
        assert_eq!(options, ClientOptions::default());
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let err = ClientOptions::from_yaml_str("region_size: lots").unwrap_err();
        assert!(matches!(err, TelemetryError::Parse { .. }));
    }

    #[test]
    fn builder_overrides() {
        let options = ClientOptions::default()
            .with_region_name("Local\\Other")
            .with_region_size(4096)
            .with_flatten_session(false)
            .with_buffer_selection(BufferSelection::LatestTick);

        assert_eq!(options.region_name, "Local\\Other");
        assert_eq!(options.region_size, 4096);
        assert!(!options.flatten_session);
        assert_eq!(options.buffer_selection, BufferSelection::LatestTick);
    }
}
