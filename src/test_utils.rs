//! Synthetic shared regions for tests
//!
//! [`RegionBuilder`] lays out a byte-exact region the way the producer does:
//! a fixed binary header terminated by a newline, the session YAML, the `...`
//! sentinel, zero padding, the variable header table and three value buffers.
//!
//! The fixed header is the first "line" of the region, so no byte of it may
//! be `\n`. The builder moves offsets it chooses to avoid that byte and
//! panics when a caller-supplied tick would produce one.

#![cfg(any(test, feature = "test-utils"))]

use std::collections::HashMap;

use crate::schema::buffers::{BUFFER_COUNT, BUFFER_STRIDE, BUFFER_TABLE_OFFSET, TICK_TABLE_OFFSET};
use crate::schema::variables::{VALUE_OFFSET_TABLE_POINTER, VAR_HEADER_SIZE};
use crate::types::{Value, VariableType};

/// Size of the fixed binary header preceding the first newline.
pub const FIXED_HEADER_SIZE: usize = 112;

/// Session document used when none is supplied.
pub const DEFAULT_SESSION_YAML: &str = "\
---
WeekendInfo:
 TrackName: spa 2024 up
 TrackID: 163
 WeekendOptions:
  NumStarters: 24
DriverInfo:
 DriverCarIdx: 0
";

struct SyntheticVariable {
    name: String,
    type_code: i32,
    size: usize,
    value_offset: usize,
}

/// Builder for a synthetic region.
pub struct RegionBuilder {
    session_yaml: String,
    padding: usize,
    variables: Vec<SyntheticVariable>,
    writes: Vec<(usize, String, Vec<u8>)>,
    ticks: [i32; BUFFER_COUNT],
    next_value_offset: usize,
}

/// A built region plus the offsets the builder chose.
#[derive(Debug, Clone)]
pub struct SyntheticRegion {
    pub bytes: Vec<u8>,
    pub document_end: usize,
    pub header_start: usize,
    pub buffer_bases: [usize; BUFFER_COUNT],
    pub value_offsets: HashMap<String, usize>,
}

impl SyntheticRegion {
    /// Overwrite a variable's bytes in one buffer after the region was built.
    pub fn write(&mut self, buffer: usize, name: &str, bytes: &[u8]) {
        let at = self.buffer_bases[buffer] + self.value_offsets[name];
        self.bytes[at..at + bytes.len()].copy_from_slice(bytes);
    }
}

impl Default for RegionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionBuilder {
    pub fn new() -> Self {
        Self {
            session_yaml: DEFAULT_SESSION_YAML.to_string(),
            padding: 12,
            variables: Vec::new(),
            writes: Vec::new(),
            ticks: [1, 2, 3],
            next_value_offset: 0,
        }
    }

    pub fn session_yaml(mut self, yaml: impl Into<String>) -> Self {
        self.session_yaml = yaml.into();
        self
    }

    /// Minimum number of zero bytes between the sentinel and the header table.
    pub fn padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// Declare a variable; value offsets are assigned in declaration order.
    pub fn variable(self, name: &str, var_type: VariableType) -> Self {
        self.raw_variable(name, var_type.code(), var_type.size())
    }

    /// Declare a variable with an arbitrary type code and value width.
    pub fn raw_variable(mut self, name: &str, type_code: i32, size: usize) -> Self {
        assert!(name.len() <= 32, "variable names are at most 32 bytes");
        let value_offset = self.next_value_offset.next_multiple_of(size.max(1));
        self.next_value_offset = value_offset + size;
        self.variables.push(SyntheticVariable {
            name: name.to_string(),
            type_code,
            size,
            value_offset,
        });
        self
    }

    /// Write a value for `name` into one buffer.
    pub fn value(mut self, buffer: usize, name: &str, value: Value) -> Self {
        self.writes.push((buffer, name.to_string(), value.to_le_bytes()));
        self
    }

    /// Set a buffer's tick counter.
    pub fn tick(mut self, buffer: usize, tick: i32) -> Self {
        assert!(
            !tick.to_le_bytes().contains(&b'\n'),
            "tick {} contains a newline byte and would split the header line",
            tick
        );
        self.ticks[buffer] = tick;
        self
    }

    pub fn build(self) -> SyntheticRegion {
        assert!(!self.variables.is_empty(), "a region needs at least one variable");
        assert!(
            self.variables[0].type_code & 0xff != 0,
            "the first type code must have a non-zero low byte to end the padding scan"
        );

        let mut bytes = vec![0u8; FIXED_HEADER_SIZE];
        put_i32(&mut bytes, 0, 2);
        put_i32(&mut bytes, 4, 1);
        put_i32(&mut bytes, 8, 60);
        bytes.push(b'\n');

        let mut yaml = self.session_yaml;
        if !yaml.is_empty() && !yaml.ends_with('\n') {
            yaml.push('\n');
        }
        bytes.extend_from_slice(yaml.as_bytes());
        // the 4-byte sentinel line is exactly the trailer gap
        bytes.extend_from_slice(b"...\n");
        let document_end = bytes.len();

        let header_start = avoid_newline(document_end + self.padding, 1);
        let table_end = header_start + (self.variables.len() + 1) * VAR_HEADER_SIZE;

        let buffer_len = self.next_value_offset.next_multiple_of(16).max(16);
        let mut buffer_bases = [0usize; BUFFER_COUNT];
        let mut next_base = table_end.next_multiple_of(16);
        for base in buffer_bases.iter_mut() {
            *base = avoid_newline(next_base, 16);
            next_base = *base + buffer_len;
        }

        bytes.resize(next_base + 64, 0);
        put_i32(&mut bytes, VALUE_OFFSET_TABLE_POINTER, header_start as i32);
        for (i, base) in buffer_bases.iter().enumerate() {
            put_i32(&mut bytes, TICK_TABLE_OFFSET + i * BUFFER_STRIDE, self.ticks[i]);
            put_i32(&mut bytes, BUFFER_TABLE_OFFSET + i * BUFFER_STRIDE, *base as i32);
        }
        debug_assert!(!bytes[..FIXED_HEADER_SIZE].contains(&b'\n'));

        let mut value_offsets = HashMap::new();
        for (i, variable) in self.variables.iter().enumerate() {
            let record = header_start + i * VAR_HEADER_SIZE;
            put_i32(&mut bytes, record, variable.type_code);
            put_i32(&mut bytes, record + 4, variable.value_offset as i32);
            put_i32(&mut bytes, record + 8, 1);
            let name = variable.name.as_bytes();
            bytes[record + 16..record + 16 + name.len()].copy_from_slice(name);
            value_offsets.insert(variable.name.clone(), variable.value_offset);
        }

        let mut region =
            SyntheticRegion { bytes, document_end, header_start, buffer_bases, value_offsets };
        for (buffer, name, value) in &self.writes {
            let Some(variable) = self.variables.iter().find(|v| &v.name == name) else {
                panic!("value written for undeclared variable '{}'", name);
            };
            assert_eq!(
                value.len(),
                variable.size,
                "value for '{}' does not match its declared width",
                name
            );
            region.write(*buffer, name, value);
        }
        region
    }
}

fn put_i32(bytes: &mut [u8], at: usize, value: i32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Smallest `offset + k * step` whose little-endian bytes contain no `\n`.
fn avoid_newline(mut offset: usize, step: usize) -> usize {
    while (offset as i32).to_le_bytes().contains(&b'\n') {
        offset += step;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BufferSet, RegionLayout, VariableCatalog};

    #[test]
    fn built_region_matches_discovered_layout() {
        let region = RegionBuilder::new()
            .variable("SessionTime", VariableType::Float64)
            .variable("Speed", VariableType::Float32)
            .variable("Gear", VariableType::Int32)
            .build();

        let layout = RegionLayout::discover(&region.bytes).unwrap();
        assert_eq!(layout.document_end, region.document_end);
        assert_eq!(layout.header_start, region.header_start);

        let buffers = BufferSet::resolve(&region.bytes).unwrap();
        assert_eq!(buffers.bases(), &region.buffer_bases);

        let catalog = VariableCatalog::parse(&region.bytes, layout.header_start).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("Speed").unwrap().value_offset, region.value_offsets["Speed"]);
    }

    #[test]
    #[should_panic(expected = "does not match its declared width")]
    fn value_width_must_match_declared_variable() {
        RegionBuilder::new()
            .variable("Speed", VariableType::Float32)
            .value(0, "Speed", Value::Float64(1.0))
            .build();
    }

    #[test]
    fn avoid_newline_skips_offending_offsets() {
        assert_eq!(avoid_newline(0x0A, 1), 0x0B);
        assert_eq!(avoid_newline(0x0A00, 16), 0x0B00);
        assert_eq!(avoid_newline(0x40, 16), 0x40);
    }
}
