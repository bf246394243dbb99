//! Read-only view of a named file mapping
//!
//! The producer process keeps writing into the mapped view while it is
//! borrowed as `&[u8]`. Rust assumes borrowed bytes do not change, so every
//! read through [`MappedRegion::as_bytes`] may observe a torn or stale value.
//! Decoding copies each value out before interpreting it and never relies on
//! two reads of the same bytes agreeing; the first-non-zero buffer rule is a
//! heuristic on top of that, not a consistency guarantee.

use crate::{Result, TelemetryError};
use std::ptr::NonNull;
use tracing::{debug, trace};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Memory::{
    FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile, OpenFileMappingW, UnmapViewOfFile,
};
use windows::core::PCWSTR;

/// A mapped, read-only view of `len` bytes of a named region.
pub struct MappedRegion {
    name: String,
    mapping: HANDLE,
    base: NonNull<u8>,
    len: usize,
}

impl MappedRegion {
    /// Open the named mapping and map `len` bytes of it.
    pub fn open(name: &str, len: usize) -> Result<Self> {
        trace!(name, len, "Opening shared region");

        let mapping = unsafe {
            let wide_name = wide_string(name);
            OpenFileMappingW(FILE_MAP_READ.0, false, PCWSTR::from_raw(wide_name.as_ptr()))
                .map_err(|e| TelemetryError::unavailable_with_source(name, Box::new(e)))?
        };

        let base = unsafe {
            let view = MapViewOfFile(mapping, FILE_MAP_READ, 0, 0, len);
            match NonNull::new(view.Value as *mut u8) {
                Some(base) => base,
                None => {
                    let win_err = windows::core::Error::from_thread();
                    let _ = CloseHandle(mapping);
                    return Err(TelemetryError::windows_api_error("MapViewOfFile", win_err));
                }
            }
        };

        debug!(name, len, "Mapped shared region");
        Ok(Self { name: name.to_string(), mapping, base, len })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The mapped bytes. The producer keeps writing into them.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: the view is mapped for `len` bytes and stays mapped until drop
        unsafe { std::slice::from_raw_parts(self.base.as_ptr(), self.len) }
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        debug!(name = %self.name, "Unmapping shared region");
        unsafe {
            let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: self.base.as_ptr() as *mut _ };
            let _ = UnmapViewOfFile(addr);
            let _ = CloseHandle(self.mapping);
        }
    }
}

// SAFETY: the handle and view are owned by this value and only unmapped in Drop.
// Concurrent writes come from another process and are not synchronized with
// readers in any thread; see the module docs.
unsafe impl Send for MappedRegion {}
unsafe impl Sync for MappedRegion {}

/// Convert string to null-terminated wide string for Windows APIs
fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

#[cfg(all(test, windows))]
mod tests {
    use super::*;

    #[test]
    fn wide_string_is_nul_terminated() {
        let wide = wide_string("Local\\X");
        assert_eq!(wide.last(), Some(&0));
        assert_eq!(wide.len(), "Local\\X".len() + 1);
    }

    #[test]
    fn missing_region_is_unavailable() {
        let err = MappedRegion::open("Local\\PitlaneNoSuchRegion", 4096).unwrap_err();
        assert!(matches!(err, TelemetryError::Unavailable { .. }));
        assert!(err.is_retryable());
    }
}
