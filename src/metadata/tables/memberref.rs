//! The MemberRef table (0x0A): references to members of external types.

use crate::{
    file::io::read_le_at_dyn,
    metadata::tables::{CodedIndex, CodedIndexType, RowReadable, TableInfoRef},
    Result,
};

/// One row of the MemberRef table, with unresolved heap indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRefRaw {
    /// 1-based row id
    pub rid: u32,
    /// The class or module the member belongs to
    pub class: CodedIndex,
    /// `#Strings` index of the member name
    pub name: u32,
    /// `#Blob` index of the member signature
    pub signature: u32,
}

impl RowReadable for MemberRefRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* class */     sizes.coded_index_bytes(CodedIndexType::MemberRefParent) +
            /* name */      sizes.str_bytes() +
            /* signature */ sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MemberRefRaw {
            rid,
            class: CodedIndex::read(data, offset, sizes, CodedIndexType::MemberRefParent)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
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
            0x09, 0x00, // class: tag 1 = TypeRef, row 1
            0x02, 0x02, // name
            0x03, 0x03, // signature
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::MemberRef, 1), (TableId::TypeRef, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MemberRefRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.class.tag, TableId::TypeRef);
        assert_eq!(row.class.row, 1);
        assert_eq!(row.name, 0x0202);
        assert_eq!(row.signature, 0x0303);
    }

    #[test]
    fn crafted_invalid_tag() {
        let data = vec![
            0x0F, 0x00, // class: tag 7 is undefined for MemberRefParent
            0x02, 0x02, // name
            0x03, 0x03, // signature
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::MemberRef, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MemberRefRaw>::new(&data, 1, sizes).unwrap();

        assert!(table.get(1).is_none());
    }
}
