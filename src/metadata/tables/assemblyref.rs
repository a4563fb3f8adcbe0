//! The AssemblyRef table (0x23): references to external assemblies.

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::tables::{RowReadable, TableInfoRef},
    Result,
};

/// One row of the AssemblyRef table, with unresolved heap indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyRefRaw {
    /// 1-based row id
    pub rid: u32,
    /// Major version of the referenced assembly
    pub major_version: u32,
    /// Minor version of the referenced assembly
    pub minor_version: u32,
    /// Build number of the referenced assembly
    pub build_number: u32,
    /// Revision number of the referenced assembly
    pub revision_number: u32,
    /// Assembly attribute flags
    pub flags: u32,
    /// `#Blob` index of the public key or its token
    pub public_key_or_token: u32,
    /// `#Strings` index of the assembly name
    pub name: u32,
    /// `#Strings` index of the culture name
    pub culture: u32,
    /// `#Blob` index of the file hash
    pub hash_value: u32,
}

impl RowReadable for AssemblyRefRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* major_version */         2 +
            /* minor_version */         2 +
            /* build_number */          2 +
            /* revision_number */       2 +
            /* flags */                 4 +
            /* public_key_or_token */   sizes.blob_bytes() +
            /* name */                  sizes.str_bytes() +
            /* culture */               sizes.str_bytes() +
            /* hash_value */            sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(AssemblyRefRaw {
            rid,
            major_version: u32::from(read_le_at::<u16>(data, offset)?),
            minor_version: u32::from(read_le_at::<u16>(data, offset)?),
            build_number: u32::from(read_le_at::<u16>(data, offset)?),
            revision_number: u32::from(read_le_at::<u16>(data, offset)?),
            flags: read_le_at::<u32>(data, offset)?,
            public_key_or_token: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            culture: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            hash_value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::metadata::tables::{MetadataTable, TableId, TableInfo};

    use super::*;

    #[test]
    fn crafted_short() {
        let data = vec![
            0x04, 0x00, // major_version = 4
            0x00, 0x00, // minor_version = 0
            0x00, 0x00, // build_number = 0
            0x09, 0x00, // revision_number = 9
            0x00, 0x00, 0x00, 0x00, // flags
            0x11, 0x00, // public_key_or_token
            0x22, 0x00, // name
            0x00, 0x00, // culture
            0x00, 0x00, // hash_value
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::AssemblyRef, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<AssemblyRefRaw>::new(&data, 1, sizes).unwrap();

        assert_eq!(table.row_size(), 20);

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.major_version, 4);
        assert_eq!(row.revision_number, 9);
        assert_eq!(row.public_key_or_token, 0x11);
        assert_eq!(row.name, 0x22);
        assert_eq!(row.culture, 0);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x04, 0x00, // major_version
            0x08, 0x00, // minor_version
            0x01, 0x00, // build_number
            0x02, 0x00, // revision_number
            0x01, 0x00, 0x00, 0x00, // flags
            0x11, 0x11, 0x11, 0x11, // public_key_or_token
            0x22, 0x22, 0x22, 0x22, // name
            0x33, 0x33, 0x33, 0x33, // culture
            0x44, 0x44, 0x44, 0x44, // hash_value
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::AssemblyRef, 1)],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<AssemblyRefRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.minor_version, 8);
        assert_eq!(row.public_key_or_token, 0x1111_1111);
        assert_eq!(row.name, 0x2222_2222);
        assert_eq!(row.culture, 0x3333_3333);
        assert_eq!(row.hash_value, 0x4444_4444);
    }
}
