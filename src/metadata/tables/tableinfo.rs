//! Row counts and index widths of the metadata tables.
//!
//! The size of a metadata record is not fixed: heap indices widen from 2 to
//! 4 bytes when the corresponding heap-size flag is set, simple table
//! indices widen when the referenced table exceeds 65535 rows, and coded
//! indices widen when the largest participating table no longer fits the
//! bits left next to the tag. [`TableInfo`] captures all of that once per
//! image, and provides the row-size catalog for every table so that
//! present-but-unexposed tables can be skipped row-accurately.

use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::{read_le, read_le_at},
    metadata::tables::{CodedIndexType, TableId},
    Error::OutOfBounds,
    Result,
};

/// Heap-size flag: `#Strings` indices are 4 bytes.
const HEAP_LARGE_STRINGS: u8 = 0x01;
/// Heap-size flag: `#GUID` indices are 4 bytes.
const HEAP_LARGE_GUID: u8 = 0x02;
/// Heap-size flag: `#Blob` indices are 4 bytes.
const HEAP_LARGE_BLOB: u8 = 0x04;

/// Row count of one table plus the derived index-width information.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct TableRowInfo {
    /// The count of rows in this table
    pub rows: u32,
    /// Number of bits required to represent any valid row index
    pub bits: u8,
    /// True when indices into this table take 4 bytes instead of 2
    pub is_large: bool,
}

impl TableRowInfo {
    /// Derives the index-width information for a table of `rows` rows.
    #[must_use]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// Row counts and reference index widths of all tables in one image.
#[derive(Clone, Default)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_index_bits: Vec<u8>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
}

/// Cheap-copy reference to a `TableInfo` structure
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Builds a `TableInfo` from the `#~` stream header.
    ///
    /// ## Arguments
    /// * 'data' - The complete `#~` stream, starting at its header
    /// * '`valid_bitvec`' - The `Valid` bitmap naming the present tables
    ///
    /// # Errors
    /// Returns an error if the row-count array is truncated.
    pub fn new(data: &[u8], valid_bitvec: u64) -> Result<Self> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let mut rows = vec![TableRowInfo::default(); TableId::COUNT];

        // The row-count array starts right after the fixed 24-byte header,
        // one u32 per set bit in ascending bit order.
        let mut next_row_offset = 24_usize;
        for table_id in TableId::iter() {
            if (valid_bitvec & (1 << table_id as u64)) == 0 {
                continue;
            }

            if data.len() < next_row_offset {
                return Err(OutOfBounds);
            }

            let row_count = read_le_at::<u32>(data, &mut next_row_offset)?;
            rows[table_id as usize] = TableRowInfo::new(row_count);
        }

        let heap_size_flags = read_le::<u8>(&data[6..])?;
        let mut info = TableInfo {
            rows,
            coded_index_bits: vec![0; CodedIndexType::COUNT],
            is_large_index_str: heap_size_flags & HEAP_LARGE_STRINGS != 0,
            is_large_index_guid: heap_size_flags & HEAP_LARGE_GUID != 0,
            is_large_index_blob: heap_size_flags & HEAP_LARGE_BLOB != 0,
        };

        info.calculate_coded_index_bits();

        Ok(info)
    }

    #[cfg(test)]
    /// Special constructor for unit-tests
    ///
    /// ## Arguments
    /// * 'valid_tables'    - (table_id, row_count) of the present tables
    /// * 'large_str'       - 4-byte `#Strings` indices when true
    /// * 'large_blob'      - 4-byte `#Blob` indices when true
    /// * 'large_guid'      - 4-byte `#GUID` indices when true
    pub fn new_test(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_blob: bool,
        large_guid: bool,
    ) -> Self {
        let mut info = TableInfo {
            rows: vec![TableRowInfo::default(); TableId::COUNT],
            coded_index_bits: vec![0; CodedIndexType::COUNT],
            is_large_index_str: large_str,
            is_large_index_guid: large_guid,
            is_large_index_blob: large_blob,
        };

        for (table_id, rows) in valid_tables {
            info.rows[*table_id as usize] = TableRowInfo::new(*rows);
        }

        info.calculate_coded_index_bits();
        info
    }

    /// Returns the row-count record for a table.
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// Returns the row count of a table, 0 when absent.
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.rows[table as usize].rows
    }

    /// True when indices into the given table take 4 bytes instead of 2.
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// True when `#Strings` heap indices take 4 bytes.
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// True when `#GUID` heap indices take 4 bytes.
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.is_large_index_guid
    }

    /// True when `#Blob` heap indices take 4 bytes.
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// Byte width of a `#Strings` heap index.
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_index_str {
            4
        } else {
            2
        }
    }

    /// Byte width of a `#GUID` heap index.
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_index_guid {
            4
        } else {
            2
        }
    }

    /// Byte width of a `#Blob` heap index.
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Byte width of a simple index into the given table.
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Total bits a coded index of the given kind needs.
    #[must_use]
    pub fn coded_index_bits(&self, coded_index_type: CodedIndexType) -> u8 {
        self.coded_index_bits[coded_index_type as usize]
    }

    /// Byte width of a coded index of the given kind.
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        if self.coded_index_bits[coded_index_type as usize] > 16 {
            4
        } else {
            2
        }
    }

    /// True when a coded index of the given kind takes 4 bytes.
    #[must_use]
    pub fn is_large_coded_index(&self, coded_index_type: CodedIndexType) -> bool {
        self.coded_index_bytes(coded_index_type) == 4
    }

    fn calculate_coded_index_bits(&mut self) {
        for coded_index in CodedIndexType::iter() {
            let max_bits = coded_index
                .tables()
                .iter()
                .map(|table| self.rows[*table as usize].bits)
                .max()
                .unwrap_or(1);

            self.coded_index_bits[coded_index as usize] = max_bits + coded_index.tag_bits();
        }
    }

    /// Byte size of one row of the given table under this image's widths.
    ///
    /// The catalog covers every table of the format, so present tables the
    /// crate exposes no typed view for can still be skipped row-accurately.
    #[must_use]
    #[rustfmt::skip]
    pub fn row_size(&self, id: TableId) -> u32 {
        let strings = u32::from(self.str_bytes());
        let guid = u32::from(self.guid_bytes());
        let blob = u32::from(self.blob_bytes());
        let index = |table| u32::from(self.table_index_bytes(table));
        let coded = |kind| u32::from(self.coded_index_bytes(kind));

        match id {
            TableId::Module =>
                2 + strings + guid * 3,
            TableId::TypeRef =>
                coded(CodedIndexType::ResolutionScope) + strings * 2,
            TableId::TypeDef =>
                4 + strings * 2 + coded(CodedIndexType::TypeDefOrRef)
                    + index(TableId::Field) + index(TableId::MethodDef),
            TableId::FieldPtr => index(TableId::Field),
            TableId::Field => 2 + strings + blob,
            TableId::MethodPtr => index(TableId::MethodDef),
            TableId::MethodDef =>
                4 + 2 + 2 + strings + blob + index(TableId::Param),
            TableId::ParamPtr => index(TableId::Param),
            TableId::Param => 2 + 2 + strings,
            TableId::InterfaceImpl =>
                index(TableId::TypeDef) + coded(CodedIndexType::TypeDefOrRef),
            TableId::MemberRef =>
                coded(CodedIndexType::MemberRefParent) + strings + blob,
            TableId::Constant =>
                1 + 1 + coded(CodedIndexType::HasConstant) + blob,
            TableId::CustomAttribute =>
                coded(CodedIndexType::HasCustomAttribute)
                    + coded(CodedIndexType::CustomAttributeType) + blob,
            TableId::FieldMarshal =>
                coded(CodedIndexType::HasFieldMarshal) + blob,
            TableId::DeclSecurity =>
                2 + coded(CodedIndexType::HasDeclSecurity) + blob,
            TableId::ClassLayout => 2 + 4 + index(TableId::TypeDef),
            TableId::FieldLayout => 4 + index(TableId::Field),
            TableId::StandAloneSig => blob,
            TableId::EventMap =>
                index(TableId::TypeDef) + index(TableId::Event),
            TableId::EventPtr => index(TableId::Event),
            TableId::Event =>
                2 + strings + coded(CodedIndexType::TypeDefOrRef),
            TableId::PropertyMap =>
                index(TableId::TypeDef) + index(TableId::Property),
            TableId::PropertyPtr => index(TableId::Property),
            TableId::Property => 2 + strings + blob,
            TableId::MethodSemantics =>
                2 + index(TableId::MethodDef) + coded(CodedIndexType::HasSemantics),
            TableId::MethodImpl =>
                index(TableId::TypeDef) + coded(CodedIndexType::MethodDefOrRef) * 2,
            TableId::ModuleRef => strings,
            TableId::TypeSpec => blob,
            TableId::ImplMap =>
                2 + coded(CodedIndexType::MemberForwarded) + strings + index(TableId::ModuleRef),
            TableId::FieldRVA => 4 + index(TableId::Field),
            TableId::ENCLog => 4 + 4,
            TableId::ENCMap => 4,
            TableId::Assembly =>
                4 + 2 * 4 + 4 + blob + strings * 2,
            TableId::AssemblyProcessor => 4,
            TableId::AssemblyOS => 4 * 3,
            TableId::AssemblyRef =>
                2 * 4 + 4 + blob + strings * 2 + blob,
            TableId::AssemblyRefProcessor => 4 + index(TableId::AssemblyRef),
            TableId::AssemblyRefOS => 4 * 3 + index(TableId::AssemblyRef),
            TableId::File => 4 + strings + blob,
            TableId::ExportedType =>
                4 + 4 + strings * 2 + coded(CodedIndexType::Implementation),
            TableId::ManifestResource =>
                4 + 4 + strings + coded(CodedIndexType::Implementation),
            TableId::NestedClass => index(TableId::TypeDef) * 2,
            TableId::GenericParam =>
                2 + 2 + coded(CodedIndexType::TypeOrMethodDef) + strings,
            TableId::MethodSpec =>
                coded(CodedIndexType::MethodDefOrRef) + blob,
            TableId::GenericParamConstraint =>
                index(TableId::GenericParam) + coded(CodedIndexType::TypeDefOrRef),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_heap_sizes_match_fixed_layouts() {
        let info = TableInfo::new_test(
            &[
                (TableId::Module, 1),
                (TableId::TypeRef, 2),
                (TableId::TypeDef, 3),
                (TableId::MethodDef, 4),
                (TableId::MemberRef, 5),
                (TableId::StandAloneSig, 6),
                (TableId::AssemblyRef, 7),
            ],
            false,
            false,
            false,
        );

        assert_eq!(info.row_size(TableId::Module), 10);
        assert_eq!(info.row_size(TableId::TypeRef), 6);
        assert_eq!(info.row_size(TableId::TypeDef), 14);
        assert_eq!(info.row_size(TableId::MethodDef), 14);
        assert_eq!(info.row_size(TableId::MemberRef), 6);
        assert_eq!(info.row_size(TableId::StandAloneSig), 2);
        assert_eq!(info.row_size(TableId::AssemblyRef), 20);
    }

    #[test]
    fn heap_flags_widen_indices() {
        let info = TableInfo::new_test(&[(TableId::Module, 1)], true, true, true);

        assert_eq!(info.str_bytes(), 4);
        assert_eq!(info.guid_bytes(), 4);
        assert_eq!(info.blob_bytes(), 4);
        // generation + 4-byte name + three 4-byte guids
        assert_eq!(info.row_size(TableId::Module), 18);
        // 4-byte blob index
        assert_eq!(info.row_size(TableId::StandAloneSig), 4);
    }

    #[test]
    fn large_tables_widen_simple_indices() {
        let info = TableInfo::new_test(
            &[(TableId::TypeDef, 1), (TableId::Field, 0x1_0000), (TableId::MethodDef, 1)],
            false,
            false,
            false,
        );

        assert!(info.is_large(TableId::Field));
        assert_eq!(info.table_index_bytes(TableId::Field), 4);
        // flags + name + namespace + extends + 4-byte field list + method list
        assert_eq!(info.row_size(TableId::TypeDef), 16);
    }

    #[test]
    fn large_tables_widen_coded_indices() {
        // ResolutionScope leaves 14 bits next to its 2 tag bits; a TypeRef
        // table of 0x4000 rows forces the 4-byte encoding.
        let info = TableInfo::new_test(&[(TableId::TypeRef, 0x4000)], false, false, false);

        assert_eq!(info.coded_index_bits(CodedIndexType::ResolutionScope), 17);
        assert_eq!(info.coded_index_bytes(CodedIndexType::ResolutionScope), 4);
        assert_eq!(info.row_size(TableId::TypeRef), 8);

        let small = TableInfo::new_test(&[(TableId::TypeRef, 0x3FFF)], false, false, false);
        assert_eq!(small.coded_index_bytes(CodedIndexType::ResolutionScope), 2);
    }

    #[test]
    fn row_counts_parse_in_bit_order() {
        let mut stream = vec![0_u8; 24];
        // Valid: Module (0x00) and AssemblyRef (0x23)
        let valid: u64 = (1 << 0x00) | (1 << 0x23);
        stream[8..16].copy_from_slice(&valid.to_le_bytes());
        stream.extend_from_slice(&7_u32.to_le_bytes());
        stream.extend_from_slice(&9_u32.to_le_bytes());

        let info = TableInfo::new(&stream, valid).unwrap();
        assert_eq!(info.rows(TableId::Module), 7);
        assert_eq!(info.rows(TableId::AssemblyRef), 9);
        assert_eq!(info.rows(TableId::TypeDef), 0);
    }
}
