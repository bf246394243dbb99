//! The named shared region published by the simulator
//!
//! [`SharedRegion`] is the live, read-only mapping. Anything that can lend a
//! byte slice (`Vec<u8>`, `Box<[u8]>`, `&[u8]`) can stand in for it when
//! building a [`TelemetryClient`](crate::TelemetryClient), which is how the
//! decoder is exercised without a running simulator.

use crate::Result;

/// Name under which the simulator publishes its shared region.
pub const DEFAULT_REGION_NAME: &str = "Local\\IRSDKMemMapFileName";

/// Size of the region mapped by default.
pub const DEFAULT_REGION_SIZE: usize = 798_720;

/// Read-only mapping of the simulator's named shared region.
#[cfg(windows)]
pub struct SharedRegion {
    inner: crate::windows::MappedRegion,
}

#[cfg(windows)]
impl SharedRegion {
    /// Map `size` bytes of the region published under `name`.
    ///
    /// Fails with [`TelemetryError::Unavailable`](crate::TelemetryError::Unavailable)
    /// when no producer has created the region.
    pub fn open(name: &str, size: usize) -> Result<Self> {
        let inner = crate::windows::MappedRegion::open(name, size)?;
        Ok(Self { inner })
    }

    /// Name the region was opened under.
    pub fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(windows)]
impl AsRef<[u8]> for SharedRegion {
    fn as_ref(&self) -> &[u8] {
        self.inner.as_bytes()
    }
}

// Non-Windows stub implementation
#[cfg(not(windows))]
pub struct SharedRegion {
    _private: (),
}

#[cfg(not(windows))]
impl SharedRegion {
    /// Named shared regions are only published on Windows.
    ///
    /// This always returns an error. Build a client over an in-memory buffer instead.
    pub fn open(_name: &str, _size: usize) -> Result<Self> {
        Err(crate::TelemetryError::unsupported_platform("Shared region access", "Windows"))
    }

    pub fn name(&self) -> &str {
        DEFAULT_REGION_NAME
    }
}

#[cfg(not(windows))]
impl AsRef<[u8]> for SharedRegion {
    fn as_ref(&self) -> &[u8] {
        &[]
    }
}

impl std::fmt::Debug for SharedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRegion")
            .field("name", &self.name())
            .field("len", &self.as_ref().len())
            .finish()
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;
    use crate::TelemetryError;

    #[test]
    fn open_is_unsupported_off_windows() {
        let err = SharedRegion::open(DEFAULT_REGION_NAME, DEFAULT_REGION_SIZE).unwrap_err();
        assert!(matches!(err, TelemetryError::UnsupportedPlatform { .. }));
    }
}
