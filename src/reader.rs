//! Bounds-checked cursor over a read-only region
//!
//! [`ByteReader`] is a view over the mapped bytes: it never copies the region,
//! and all reads either return a borrowed slice or fail with
//! [`TelemetryError::OutOfRange`].

use crate::types::{Value, VariableType};
use crate::{Result, TelemetryError};

/// Cursor over a fixed-size byte buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Move the cursor. Seeking to exactly the end is allowed.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(TelemetryError::out_of_range(offset, 0, self.data.len()));
        }
        self.position = offset;
        Ok(())
    }

    /// Read `n` bytes at the cursor and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self.slice_at(self.position, n)?;
        self.position += n;
        Ok(bytes)
    }

    /// Read one byte, `None` at the end of the buffer.
    pub fn read_byte(&mut self) -> Option<u8> {
        let byte = self.data.get(self.position).copied()?;
        self.position += 1;
        Some(byte)
    }

    /// Read up to and including the next `\n`, or to the end of the buffer.
    ///
    /// Returns an empty slice once the cursor is at the end.
    pub fn read_line(&mut self) -> &'a [u8] {
        let rest = &self.data[self.position.min(self.data.len())..];
        let len = rest.iter().position(|&b| b == b'\n').map_or(rest.len(), |nl| nl + 1);
        self.position += len;
        &rest[..len]
    }

    /// Borrow `n` bytes at an absolute offset without moving the cursor.
    pub fn slice_at(&self, offset: usize, n: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(n)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| TelemetryError::out_of_range(offset, n, self.data.len()))
    }

    /// Little-endian `i32` at an absolute offset.
    pub fn i32_at(&self, offset: usize) -> Result<i32> {
        let bytes = self.slice_at(offset, 4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Little-endian `i32` at an absolute offset, interpreted as an offset into the region.
    ///
    /// Negative values cannot address anything and are reported as a format error.
    pub fn offset_at(&self, offset: usize, context: &str) -> Result<usize> {
        let raw = self.i32_at(offset)?;
        usize::try_from(raw).map_err(|_| {
            TelemetryError::format_error(
                context,
                format!("negative offset {} stored at {:#x}", raw, offset),
            )
        })
    }

    /// Decode a value of `ty` at an absolute offset.
    pub fn decode(&self, offset: usize, ty: VariableType) -> Result<Value> {
        let bytes = self.slice_at(offset, ty.size())?;
        ty.decode(bytes).ok_or_else(|| TelemetryError::out_of_range(offset, ty.size(), self.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_line_includes_delimiter() {
        let mut reader = ByteReader::new(b"first\nsecond\nrest");
        assert_eq!(reader.read_line(), b"first\n");
        assert_eq!(reader.read_line(), b"second\n");
        assert_eq!(reader.read_line(), b"rest");
        assert!(reader.is_at_end());
        assert_eq!(reader.read_line(), b"");
    }

    #[test]
    fn read_bytes_is_bounds_checked() {
        let mut reader = ByteReader::new(&[1, 2, 3, 4, 5]);
        assert_eq!(reader.read_bytes(2).unwrap(), &[1, 2]);
        assert_eq!(reader.position(), 2);

        let err = reader.read_bytes(4).unwrap_err();
        assert!(matches!(err, TelemetryError::OutOfRange { offset: 2, len: 4, region_len: 5 }));
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn seek_allows_end_but_not_past() {
        let mut reader = ByteReader::new(&[0; 8]);
        reader.seek(8).unwrap();
        assert!(reader.is_at_end());
        assert_eq!(reader.read_byte(), None);
        assert!(reader.seek(9).is_err());
    }

    #[test]
    fn slice_at_guards_overflow() {
        let reader = ByteReader::new(&[0; 8]);
        assert!(reader.slice_at(usize::MAX, 2).is_err());
    }

    #[test]
    fn decode_reads_little_endian() {
        let mut data = vec![0u8; 16];
        data[0..4].copy_from_slice(&4500.0f32.to_le_bytes());
        data[4..12].copy_from_slice(&(-1.25f64).to_le_bytes());
        data[12..16].copy_from_slice(&(-7i32).to_le_bytes());
        let reader = ByteReader::new(&data);

        assert_eq!(reader.decode(0, VariableType::Float32).unwrap(), Value::Float32(4500.0));
        assert_eq!(reader.decode(4, VariableType::Float64).unwrap(), Value::Float64(-1.25));
        assert_eq!(reader.decode(12, VariableType::Int32).unwrap(), Value::Int32(-7));
        assert!(reader.decode(12, VariableType::Float64).is_err());
    }

    #[test]
    fn negative_offsets_are_format_errors() {
        let data = (-16i32).to_le_bytes();
        let reader = ByteReader::new(&data);
        let err = reader.offset_at(0, "Buffer table").unwrap_err();
        assert!(matches!(err, TelemetryError::Format { .. }));
    }
}
