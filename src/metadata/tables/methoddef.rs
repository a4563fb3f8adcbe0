//! The MethodDef table (0x06): method definitions and their body locations.

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::tables::{RowReadable, TableId, TableInfoRef},
    Result,
};

/// One row of the MethodDef table, with unresolved heap indices.
///
/// The `rva` field locates the method body inside the image; its first byte
/// discriminates the tiny and fat header formats (see
/// [`crate::metadata::method_size`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDefRaw {
    /// 1-based row id
    pub rid: u32,
    /// RVA of the method body, 0 for abstract and extern methods
    pub rva: u32,
    /// Implementation attribute flags
    pub impl_flags: u32,
    /// Method attribute flags
    pub flags: u32,
    /// `#Strings` index of the method name
    pub name: u32,
    /// `#Blob` index of the method signature
    pub signature: u32,
    /// First row of this method's run in the Param table
    pub param_list: u32,
}

impl RowReadable for MethodDefRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* rva */           4 +
            /* impl_flags */    2 +
            /* flags */         2 +
            /* name */          sizes.str_bytes() +
            /* signature */     sizes.blob_bytes() +
            /* param_list */    sizes.table_index_bytes(TableId::Param)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodDefRaw {
            rid,
            rva: read_le_at::<u32>(data, offset)?,
            impl_flags: u32::from(read_le_at::<u16>(data, offset)?),
            flags: u32::from(read_le_at::<u16>(data, offset)?),
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            param_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Param))?,
        })
    }
}
