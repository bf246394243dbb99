//! Value buffer rotation
//!
//! The producer keeps three complete copies of every variable's value and
//! rewrites them round-robin. The fixed header at the start of the region
//! describes each copy with a 16-byte record:
//!
//! ```text
//! offset  field
//!     48  tick count of buffer 0
//!     52  base offset of buffer 0
//!     64  tick count of buffer 1
//!     68  base offset of buffer 1
//!     80  tick count of buffer 2
//!     84  base offset of buffer 2
//! ```
//!
//! Reads pick the first buffer whose bytes for the variable are not all zero.
//! That is a heuristic: a value that is legitimately zero in every buffer is
//! reported as missing, and buffer order says nothing certain about recency.

use crate::config::BufferSelection;
use crate::reader::ByteReader;
use crate::schema::VariableDescriptor;
use crate::types::Value;
use crate::{Result, TelemetryError};
use tracing::{debug, trace};

/// Number of rotating value buffers.
pub const BUFFER_COUNT: usize = 3;

/// Region offset of the first buffer's base offset.
pub const BUFFER_TABLE_OFFSET: usize = 52;

/// Distance between consecutive buffer records.
pub const BUFFER_STRIDE: usize = 16;

/// Region offset of the first buffer's tick count.
pub const TICK_TABLE_OFFSET: usize = 48;

/// Base offsets of the rotating value buffers, resolved once per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSet {
    bases: [usize; BUFFER_COUNT],
}

impl BufferSet {
    /// Read the buffer base offsets from the fixed header.
    pub fn resolve(region: &[u8]) -> Result<Self> {
        let reader = ByteReader::new(region);
        let mut bases = [0usize; BUFFER_COUNT];
        for (i, base) in bases.iter_mut().enumerate() {
            *base = reader.offset_at(BUFFER_TABLE_OFFSET + i * BUFFER_STRIDE, "Buffer table")?;
        }

        debug!(?bases, "Resolved value buffers");
        Ok(Self { bases })
    }

    pub fn bases(&self) -> &[usize; BUFFER_COUNT] {
        &self.bases
    }

    /// Current tick counters of each buffer, in buffer order.
    pub fn ticks(&self, region: &[u8]) -> Result<[i32; BUFFER_COUNT]> {
        let reader = ByteReader::new(region);
        let mut ticks = [0i32; BUFFER_COUNT];
        for (i, tick) in ticks.iter_mut().enumerate() {
            *tick = reader.i32_at(TICK_TABLE_OFFSET + i * BUFFER_STRIDE)?;
        }
        Ok(ticks)
    }

    /// Buffer indices in the order they are tried.
    pub fn read_order(
        &self,
        region: &[u8],
        selection: BufferSelection,
    ) -> Result<[usize; BUFFER_COUNT]> {
        let mut order = [0, 1, 2];
        if selection == BufferSelection::LatestTick {
            let ticks = self.ticks(region)?;
            // stable sort keeps buffer order between equal ticks
            order.sort_by(|&a, &b| ticks[b].cmp(&ticks[a]));
        }
        Ok(order)
    }

    /// Read the current value of `descriptor`, `None` if every buffer is all zero.
    pub fn read_value(
        &self,
        region: &[u8],
        descriptor: &VariableDescriptor,
    ) -> Result<Option<Value>> {
        self.read_value_with(region, descriptor, BufferSelection::FirstNonZero)
    }

    /// [`read_value`](Self::read_value) with an explicit buffer ordering.
    pub fn read_value_with(
        &self,
        region: &[u8],
        descriptor: &VariableDescriptor,
        selection: BufferSelection,
    ) -> Result<Option<Value>> {
        let reader = ByteReader::new(region);
        let size = descriptor.size();

        for index in self.read_order(region, selection)? {
            let offset = self.bases[index]
                .checked_add(descriptor.value_offset)
                .ok_or_else(|| TelemetryError::out_of_range(usize::MAX, size, region.len()))?;
            let bytes = reader.slice_at(offset, size)?;

            if bytes.iter().any(|&b| b != 0) {
                trace!(name = %descriptor.name, buffer = index, "Selected value buffer");
                return Ok(descriptor.var_type.decode(bytes));
            }
        }

        trace!(name = %descriptor.name, "No buffer holds a value");
        Ok(None)
    }
}
