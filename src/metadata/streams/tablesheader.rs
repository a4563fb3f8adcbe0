//! The `#~` tables stream: header, bitmaps, row counts and table layout.
//!
//! The stream opens with a fixed 24-byte header (reserved bytes, schema
//! version, heap-size flags, the `Valid` and `Sorted` bitmaps), followed by
//! one 32-bit row count per set `Valid` bit in ascending table-id order,
//! followed by the packed record arrays in the same order. Because record
//! sizes depend on the heap-size flags and on the row counts themselves,
//! the layout can only be walked after the full row-count array is known.

use std::sync::Arc;
use strum::IntoEnumIterator;

use crate::{
    file::io::read_le,
    metadata::tables::{TableId, TableInfo, TableInfoRef, KNOWN_TABLES_MASK},
    Error::OutOfBounds,
    Result,
};

/// Location of one present table's packed record array.
#[derive(Clone, Copy, Debug)]
pub struct TableLocation {
    /// Absolute file offset of the first record
    pub offset: usize,
    /// Number of rows
    pub rows: u32,
    /// Total size of the record array in bytes
    pub byte_size: usize,
}

/// The parsed `#~` tables stream of a managed image.
///
/// Holds the schema header, the presence/sortedness bitmaps, the
/// [`TableInfo`] with all row counts and index widths, and the location of
/// every present table. Tables without a typed row definition in this crate
/// are still located and skipped row-accurately; their row counts remain
/// queryable.
pub struct TablesStream {
    /// Major version of the table schema, 2
    pub major_version: u8,
    /// Minor version of the table schema, 0
    pub minor_version: u8,
    /// Raw heap-size flags byte
    pub heap_sizes: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// Row counts and index widths of all tables
    pub info: TableInfoRef,
    locations: Vec<Option<TableLocation>>,
}

impl TablesStream {
    /// Parses a `#~` stream.
    ///
    /// # Arguments
    /// * `data` - The complete stream as named by its stream header
    /// * `base_offset` - Absolute file offset of the stream start, used to
    ///   record table locations in image coordinates
    ///
    /// # Errors
    /// Returns an error for a truncated stream, a `Valid` bit that names no
    /// table of the format, or record arrays crossing the stream end.
    pub fn read(data: &[u8], base_offset: usize) -> Result<TablesStream> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let valid = read_le::<u64>(&data[8..])?;
        if valid == 0 {
            return Err(malformed_error!("No valid rows in any of the tables"));
        }
        if valid & !KNOWN_TABLES_MASK != 0 {
            return Err(malformed_error!(
                "Valid bitmap names undefined tables - {:#x}",
                valid & !KNOWN_TABLES_MASK
            ));
        }

        let info: TableInfoRef = Arc::new(TableInfo::new(data, valid)?);

        let mut stream = TablesStream {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            heap_sizes: read_le::<u8>(&data[6..])?,
            valid,
            sorted: read_le::<u64>(&data[16..])?,
            info,
            locations: Vec::new(),
        };
        stream
            .locations
            .resize_with(TableId::iter().count(), || None);

        // The packed record arrays follow the row-count array; walk them in
        // ascending table-id order, skipping tables without a typed view by
        // their computed row size.
        let mut current = 24 + valid.count_ones() as usize * 4;
        for table_id in TableId::iter() {
            if (valid & (1 << table_id as u64)) == 0 {
                continue;
            }

            let rows = stream.info.rows(table_id);
            let row_size = stream.info.row_size(table_id);
            let Some(byte_size) = (rows as usize).checked_mul(row_size as usize) else {
                return Err(OutOfBounds);
            };

            let Some(next) = current.checked_add(byte_size) else {
                return Err(OutOfBounds);
            };
            if next > data.len() {
                return Err(OutOfBounds);
            }

            stream.locations[table_id as usize] = Some(TableLocation {
                offset: base_offset + current,
                rows,
                byte_size,
            });
            current = next;
        }

        Ok(stream)
    }

    /// Number of present tables.
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// True when the table is present in the image.
    #[must_use]
    pub fn has_table(&self, id: TableId) -> bool {
        self.valid & (1 << id as u64) != 0
    }

    /// True when the image declares the table's records sorted.
    #[must_use]
    pub fn is_sorted(&self, id: TableId) -> bool {
        self.sorted & (1 << id as u64) != 0
    }

    /// Row count of a table, 0 when absent.
    #[must_use]
    pub fn row_count(&self, id: TableId) -> u32 {
        self.info.rows(id)
    }

    /// Location of a present table's record array, in image coordinates.
    #[must_use]
    pub fn location(&self, id: TableId) -> Option<&TableLocation> {
        self.locations.get(id as usize).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a `#~` stream with the given `(table, rows, record bytes)`
    /// triples appended in order.
    fn crafted_stream(tables: &[(TableId, u32)], records: &[u8]) -> Vec<u8> {
        let mut stream = vec![0_u8; 24];
        stream[4] = 2; // major_version

        let mut valid: u64 = 0;
        for (id, _) in tables {
            valid |= 1 << *id as u64;
        }
        stream[8..16].copy_from_slice(&valid.to_le_bytes());

        for (_, rows) in tables {
            stream.extend_from_slice(&rows.to_le_bytes());
        }
        stream.extend_from_slice(records);
        stream
    }

    #[test]
    fn crafted_three_tables() {
        // Module (10 B), TypeRef (6 B x2), AssemblyRef (20 B), small heaps.
        let mut records = vec![0_u8; 10];
        records.extend_from_slice(&[0_u8; 12]);
        records.extend_from_slice(&[0_u8; 20]);

        let stream = crafted_stream(
            &[
                (TableId::Module, 1),
                (TableId::TypeRef, 2),
                (TableId::AssemblyRef, 1),
            ],
            &records,
        );

        let tables = TablesStream::read(&stream, 0x100).unwrap();

        assert_eq!(tables.major_version, 2);
        assert_eq!(tables.table_count(), 3);
        assert!(tables.has_table(TableId::Module));
        assert!(tables.has_table(TableId::TypeRef));
        assert!(tables.has_table(TableId::AssemblyRef));
        assert!(!tables.has_table(TableId::TypeDef));

        assert_eq!(tables.row_count(TableId::Module), 1);
        assert_eq!(tables.row_count(TableId::TypeRef), 2);
        assert_eq!(tables.row_count(TableId::AssemblyRef), 1);
        assert_eq!(tables.row_count(TableId::MethodDef), 0);

        // Header is 24 + 3 row counts; records follow back to back.
        let module = tables.location(TableId::Module).unwrap();
        assert_eq!(module.offset, 0x100 + 36);
        assert_eq!(module.byte_size, 10);

        let type_ref = tables.location(TableId::TypeRef).unwrap();
        assert_eq!(type_ref.offset, 0x100 + 46);
        assert_eq!(type_ref.byte_size, 12);

        let assembly_ref = tables.location(TableId::AssemblyRef).unwrap();
        assert_eq!(assembly_ref.offset, 0x100 + 58);
        assert_eq!(assembly_ref.byte_size, 20);

        assert!(tables.location(TableId::TypeDef).is_none());
    }

    #[test]
    fn unexposed_table_is_skipped_row_accurately() {
        // Field (6 B per row with small heaps) sits between Module and
        // AssemblyRef; its rows must shift the later table's location.
        let mut records = vec![0_u8; 10]; // Module
        records.extend_from_slice(&[0_u8; 12]); // Field x2
        records.extend_from_slice(&[0_u8; 20]); // AssemblyRef

        let stream = crafted_stream(
            &[
                (TableId::Module, 1),
                (TableId::Field, 2),
                (TableId::AssemblyRef, 1),
            ],
            &records,
        );

        let tables = TablesStream::read(&stream, 0).unwrap();

        let field = tables.location(TableId::Field).unwrap();
        assert_eq!(field.rows, 2);
        assert_eq!(field.byte_size, 12);

        let assembly_ref = tables.location(TableId::AssemblyRef).unwrap();
        assert_eq!(assembly_ref.offset, 36 + 10 + 12);
    }

    #[test]
    fn undefined_valid_bit_is_rejected() {
        let mut stream = vec![0_u8; 24];
        let valid: u64 = 1 << 0x3F;
        stream[8..16].copy_from_slice(&valid.to_le_bytes());
        stream.extend_from_slice(&1_u32.to_le_bytes());

        let result = TablesStream::read(&stream, 0);
        assert!(matches!(result, Err(crate::Error::Malformed { .. })));
    }

    #[test]
    fn empty_valid_bitmap_is_rejected() {
        let stream = vec![0_u8; 24];
        assert!(TablesStream::read(&stream, 0).is_err());
    }

    #[test]
    fn truncated_records_are_rejected() {
        // Declares one Module row but provides no record bytes.
        let stream = crafted_stream(&[(TableId::Module, 1)], &[]);
        assert!(matches!(TablesStream::read(&stream, 0), Err(OutOfBounds)));
    }

    #[test]
    fn sorted_bitmap() {
        let mut records = vec![0_u8; 10];
        records.extend_from_slice(&[0_u8; 6]);

        let mut stream = crafted_stream(&[(TableId::Module, 1), (TableId::TypeRef, 1)], &records);
        let sorted: u64 = 1 << TableId::TypeRef as u64;
        stream[16..24].copy_from_slice(&sorted.to_le_bytes());

        let tables = TablesStream::read(&stream, 0).unwrap();
        assert!(tables.is_sorted(TableId::TypeRef));
        assert!(!tables.is_sorted(TableId::Module));
    }
}
