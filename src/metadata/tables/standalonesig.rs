//! The StandAloneSig table (0x11): signatures referenced directly by token.

use crate::{
    file::io::read_le_at_dyn,
    metadata::tables::{RowReadable, TableInfoRef},
    Result,
};

/// One row of the StandAloneSig table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StandAloneSigRaw {
    /// 1-based row id
    pub rid: u32,
    /// `#Blob` index of the signature
    pub signature: u32,
}

impl RowReadable for StandAloneSigRaw {
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(sizes.blob_bytes())
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(StandAloneSigRaw {
            rid,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
