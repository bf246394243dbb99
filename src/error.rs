//! Error types for shared-memory decoding.
//!
//! Every fallible operation in the crate returns [`TelemetryError`]. The
//! variants follow how a failure should be treated by the caller:
//!
//! - **Unavailable**: the named shared region does not exist (simulator not running)
//! - **Format**: the region does not look like the layout this crate understands
//! - **OutOfRange**: a read would run past the end of the region
//! - **UnknownVariable / UnknownSessionKey**: the caller asked for a key that is not there
//! - **Parse**: the embedded session document could not be decoded
//!
//! A telemetry value that has not been written yet is *not* an error; it is
//! reported as `None` by [`TelemetryClient::telemetry`](crate::TelemetryClient::telemetry).
//!
//! ```rust
//! use pitlane::TelemetryError;
//!
//! let error = TelemetryError::unavailable("Local\\IRSDKMemMapFileName");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use thiserror::Error;

#[cfg(windows)]
use windows_core as core;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Shared region '{name}' is not available")]
    Unavailable {
        name: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unexpected region layout in {context}: {details}")]
    Format { context: String, details: String },

    #[error("Read of {len} bytes at offset {offset:#x} exceeds region of {region_len} bytes")]
    OutOfRange { offset: usize, len: usize, region_len: usize },

    #[error("Telemetry variable '{name}' not found")]
    UnknownVariable { name: String },

    #[error("Session key '{key}' not found")]
    UnknownSessionKey { key: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("{feature} is only available on {required_platform}")]
    UnsupportedPlatform { feature: String, required_platform: String },

    #[error("Windows API error: {operation}")]
    #[cfg(windows)]
    WindowsApi {
        operation: String,
        #[source]
        source: core::Error,
    },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// Only a missing region qualifies: the producer may simply not have
    /// started yet. Layout failures are fixed for the lifetime of a handle.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Unavailable { .. } => true,
            TelemetryError::Format { .. } => false,
            TelemetryError::OutOfRange { .. } => false,
            TelemetryError::UnknownVariable { .. } => false,
            TelemetryError::UnknownSessionKey { .. } => false,
            TelemetryError::Parse { .. } => false,
            TelemetryError::UnsupportedPlatform { .. } => false,
            #[cfg(windows)]
            TelemetryError::WindowsApi { .. } => false,
        }
    }

    /// Returns true for lookups of a variable or session key that does not exist.
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            TelemetryError::UnknownVariable { .. } | TelemetryError::UnknownSessionKey { .. }
        )
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::Unavailable { .. } => vec![
                "Ensure the simulator is running",
                "Check the shared region name in ClientOptions",
                "Retry once the simulator has loaded a session",
            ],
            TelemetryError::Format { .. } => vec![
                "Check the simulator version is supported",
                "Verify the region size in ClientOptions",
                "Reopen the region after the simulator finishes loading",
            ],
            TelemetryError::OutOfRange { .. } => vec![
                "Verify the mapped region size matches the producer",
                "Reopen the shared region",
            ],
            TelemetryError::UnknownVariable { .. } => vec![
                "Check variable name spelling and case",
                "List available names with telemetry_keys()",
            ],
            TelemetryError::UnknownSessionKey { .. } => vec![
                "Check the key path uses '_' between nested keys",
                "List available keys with session_keys()",
            ],
            TelemetryError::Parse { .. } => vec![
                "Call refresh_session() once the session has loaded",
                "Verify source data integrity",
            ],
            TelemetryError::UnsupportedPlatform { .. } => vec![
                "Use platform-appropriate features",
                "Build a client over an in-memory region for offline testing",
            ],
            #[cfg(windows)]
            TelemetryError::WindowsApi { .. } => vec![
                "Check Windows permissions for shared memory access",
                "Verify system resources availability",
            ],
        }
    }

    /// Helper constructor for a missing shared region.
    pub fn unavailable(name: impl Into<String>) -> Self {
        TelemetryError::Unavailable { name: name.into(), source: None }
    }

    /// Helper constructor for a missing shared region with source.
    pub fn unavailable_with_source(
        name: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::Unavailable { name: name.into(), source: Some(source) }
    }

    /// Helper constructor for layout errors.
    pub fn format_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::Format { context: context.into(), details: details.into() }
    }

    /// Helper constructor for out-of-bounds reads.
    pub fn out_of_range(offset: usize, len: usize, region_len: usize) -> Self {
        TelemetryError::OutOfRange { offset, len, region_len }
    }

    /// Helper constructor for Windows API errors.
    #[cfg(windows)]
    pub fn windows_api_error(operation: impl Into<String>, source: core::Error) -> Self {
        TelemetryError::WindowsApi { operation: operation.into(), source }
    }

    /// Helper constructor for unsupported platform errors.
    pub fn unsupported_platform(
        feature: impl Into<String>,
        required_platform: impl Into<String>,
    ) -> Self {
        TelemetryError::UnsupportedPlatform {
            feature: feature.into(),
            required_platform: required_platform.into(),
        }
    }
}

impl From<serde_yaml_ng::Error> for TelemetryError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        TelemetryError::Parse { context: "Session document".to_string(), details: err.to_string() }
    }
}

#[cfg(windows)]
impl From<core::Error> for TelemetryError {
    fn from(err: core::Error) -> Self {
        TelemetryError::WindowsApi {
            operation: "Unknown Windows operation".to_string(),
            source: err,
        }
    }
}
