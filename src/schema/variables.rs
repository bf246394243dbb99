//! Variable header table parsing
//!
//! The table is a contiguous array of fixed-size records:
//!
//! ```text
//! sub-offset  size  field
//!          0     4  type code (little-endian i32, 0..=5)
//!          4     4  offset of the value within one value buffer
//!          8     4  element count
//!         16    32  name, NUL padded
//!         48    64  description, NUL padded
//!        112    32  unit, NUL padded
//! ```
//!
//! The array ends at the first record whose name field is all zero bytes.
//! Value offsets are read through the table pointer stored at region
//! offset 28, which addresses the same array from the fixed header.

use std::collections::HashMap;

use crate::reader::ByteReader;
use crate::types::VariableType;
use crate::{Result, TelemetryError};
use tracing::{debug, trace, warn};

/// Stride of one variable header record.
pub const VAR_HEADER_SIZE: usize = 144;

/// Region offset of the i32 pointing at the value-offset table.
pub const VALUE_OFFSET_TABLE_POINTER: usize = 28;

const TYPE_CODE_OFFSET: usize = 0;
const VALUE_OFFSET_FIELD: usize = 4;
const COUNT_OFFSET: usize = 8;
const NAME_OFFSET: usize = 16;
const NAME_LEN: usize = 32;
const DESC_OFFSET: usize = 48;
const DESC_LEN: usize = 64;
const UNIT_OFFSET: usize = 112;
const UNIT_LEN: usize = 32;

/// Metadata for one telemetry variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDescriptor {
    /// Variable name, unique within the catalog
    pub name: String,
    /// Position of the record in the header table
    pub index: usize,
    pub var_type: VariableType,
    /// Byte offset of the value within each value buffer
    pub value_offset: usize,
    /// Element count declared by the producer; only the first element is read
    pub count: usize,
    pub description: String,
    pub unit: String,
}

impl VariableDescriptor {
    /// Number of bytes read for this variable.
    pub fn size(&self) -> usize {
        self.var_type.size()
    }
}

/// NUL-padded field to a string, trailing NULs trimmed.
fn padded_string(bytes: &[u8]) -> String {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |last| last + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Ordered set of variable descriptors with by-name lookup.
#[derive(Debug, Clone, Default)]
pub struct VariableCatalog {
    descriptors: Vec<VariableDescriptor>,
    by_name: HashMap<String, usize>,
}

impl VariableCatalog {
    /// Parse the header table starting at `header_start`.
    pub fn parse(region: &[u8], header_start: usize) -> Result<Self> {
        let mut reader = ByteReader::new(region);
        reader.seek(header_start)?;

        let value_table = reader.offset_at(VALUE_OFFSET_TABLE_POINTER, "Value offset table")?;
        trace!(header_start, value_table, "Parsing variable header table");

        let mut catalog = VariableCatalog::default();

        loop {
            let index = catalog.descriptors.len();
            let record = reader.read_bytes(VAR_HEADER_SIZE).map_err(|_| {
                TelemetryError::format_error(
                    "Variable catalog",
                    format!(
                        "header table at {:#x} has no terminator before the end of the region",
                        header_start
                    ),
                )
            })?;

            let name = padded_string(&record[NAME_OFFSET..NAME_OFFSET + NAME_LEN]);
            if name.is_empty() {
                break;
            }

            let record_reader = ByteReader::new(record);
            let code = record_reader.i32_at(TYPE_CODE_OFFSET)?;
            let var_type = VariableType::from_code(code).ok_or_else(|| {
                TelemetryError::format_error(
                    "Variable catalog",
                    format!("variable '{}' has unknown type code {}", name, code),
                )
            })?;

            let value_offset = reader.offset_at(
                value_table + index * VAR_HEADER_SIZE + VALUE_OFFSET_FIELD,
                "Value offset table",
            )?;
            let count = usize::try_from(record_reader.i32_at(COUNT_OFFSET)?).unwrap_or(0);

            let descriptor = VariableDescriptor {
                name,
                index,
                var_type,
                value_offset,
                count,
                description: padded_string(&record[DESC_OFFSET..DESC_OFFSET + DESC_LEN]),
                unit: padded_string(&record[UNIT_OFFSET..UNIT_OFFSET + UNIT_LEN]),
            };
            catalog.push(descriptor);
        }

        debug!(variables = catalog.len(), header_start, "Parsed variable catalog");
        Ok(catalog)
    }

    fn push(&mut self, descriptor: VariableDescriptor) {
        if self.by_name.contains_key(&descriptor.name) {
            warn!(name = %descriptor.name, "Duplicate variable name found");
        }
        self.by_name.insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
    }

    /// Descriptor by name.
    pub fn get(&self, name: &str) -> Option<&VariableDescriptor> {
        self.by_name.get(name).map(|&index| &self.descriptors[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors in table order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.descriptors.iter()
    }

    /// Variable names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Region with the value-offset pointer at 28 aimed at a table at `start`.
    fn region_with_table(start: usize, records: &[(i32, i32, &str)]) -> Vec<u8> {
        let mut region = vec![0u8; start + (records.len() + 2) * VAR_HEADER_SIZE];
        region[VALUE_OFFSET_TABLE_POINTER..VALUE_OFFSET_TABLE_POINTER + 4]
            .copy_from_slice(&(start as i32).to_le_bytes());

        for (i, (code, offset, name)) in records.iter().enumerate() {
            let base = start + i * VAR_HEADER_SIZE;
            region[base..base + 4].copy_from_slice(&code.to_le_bytes());
            region[base + 4..base + 8].copy_from_slice(&offset.to_le_bytes());
            region[base + 8..base + 12].copy_from_slice(&1i32.to_le_bytes());
            region[base + NAME_OFFSET..base + NAME_OFFSET + name.len()]
                .copy_from_slice(name.as_bytes());
        }
        region
    }

    #[test]
    fn parses_records_until_empty_name() {
        let region = region_with_table(
            64,
            &[(5, 0, "SessionTime"), (4, 8, "Speed"), (2, 12, "Gear"), (1, 16, "OnPitRoad")],
        );
        let catalog = VariableCatalog::parse(&region, 64).unwrap();

        assert_eq!(catalog.len(), 4);
        let names: Vec<&str> = catalog.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["SessionTime", "Speed", "Gear", "OnPitRoad"]);

        let speed = catalog.get("Speed").unwrap();
        assert_eq!(speed.var_type, VariableType::Float32);
        assert_eq!(speed.value_offset, 8);
        assert_eq!(speed.size(), 4);
        assert_eq!(speed.index, 1);
        assert_eq!(speed.count, 1);

        assert_eq!(catalog.get("SessionTime").unwrap().size(), 8);
        assert!(!catalog.contains(""));
    }

    #[test]
    fn names_are_sorted() {
        let region = region_with_table(64, &[(4, 0, "Speed"), (4, 4, "RPM"), (2, 8, "Gear")]);
        let catalog = VariableCatalog::parse(&region, 64).unwrap();
        assert_eq!(catalog.names(), ["Gear", "RPM", "Speed"]);
    }

    #[test]
    fn unknown_type_code_is_format_error() {
        let region = region_with_table(64, &[(4, 0, "Speed"), (6, 4, "Mystery")]);
        let err = VariableCatalog::parse(&region, 64).unwrap_err();
        assert!(matches!(err, TelemetryError::Format { .. }));
        assert!(err.to_string().contains("Mystery"));
    }

    #[test]
    fn missing_terminator_is_format_error() {
        let mut region = region_with_table(64, &[(4, 0, "Speed")]);
        region.truncate(64 + VAR_HEADER_SIZE + 10);
        let err = VariableCatalog::parse(&region, 64).unwrap_err();
        assert!(matches!(err, TelemetryError::Format { .. }));
    }

    #[test]
    fn immediate_terminator_yields_empty_catalog() {
        let region = region_with_table(64, &[]);
        let catalog = VariableCatalog::parse(&region, 64).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn padded_string_trims_trailing_nuls_only() {
        assert_eq!(padded_string(b"RPM\0\0\0\0"), "RPM");
        assert_eq!(padded_string(b"Speed"), "Speed");
        assert_eq!(padded_string(b"\0\0\0\0"), "");
    }

    #[test]
    fn duplicate_names_resolve_to_later_record() {
        let region = region_with_table(64, &[(4, 0, "Speed"), (2, 4, "Speed")]);
        let catalog = VariableCatalog::parse(&region, 64).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("Speed").unwrap().var_type, VariableType::Int32);
    }

    proptest! {
        #[test]
        fn catalog_holds_exactly_the_records_before_terminator(
            names in prop::collection::btree_set("[A-Z][a-zA-Z0-9]{0,30}", 0..24),
            codes in prop::collection::vec(0i32..6, 24),
        ) {
            let records: Vec<(i32, i32, &str)> = names
                .iter()
                .enumerate()
                .map(|(i, name)| (codes[i], (i * 8) as i32, name.as_str()))
                .collect();
            let region = region_with_table(96, &records);
            let catalog = VariableCatalog::parse(&region, 96).unwrap();

            prop_assert_eq!(catalog.len(), records.len());
            for (descriptor, (code, offset, name)) in catalog.iter().zip(&records) {
                prop_assert_eq!(descriptor.name.as_str(), *name);
                prop_assert_eq!(descriptor.var_type.code(), *code);
                prop_assert_eq!(descriptor.value_offset, *offset as usize);
            }
        }
    }
}
