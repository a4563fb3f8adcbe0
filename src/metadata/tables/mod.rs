//! Metadata table infrastructure and the supported row types.
//!
//! The `#~` stream carries up to 64 packed record arrays whose row layouts
//! depend on the image's heap-size flags and table row counts. This module
//! provides the generic machinery ([`TableInfo`], [`MetadataTable`],
//! [`CodedIndex`], the [`RowReadable`] trait) and typed row definitions for
//! the tables this crate exposes: Module, TypeRef, TypeDef, MethodDef,
//! MemberRef, StandAloneSig and AssemblyRef.

mod assemblyref;
mod codedindex;
mod memberref;
mod methoddef;
mod module;
mod standalonesig;
mod table;
mod tableid;
mod tableinfo;
mod typedef;
mod typeref;

pub use assemblyref::AssemblyRefRaw;
pub use codedindex::{CodedIndex, CodedIndexType};
pub use memberref::MemberRefRaw;
pub use methoddef::MethodDefRaw;
pub use module::ModuleRaw;
pub use standalonesig::StandAloneSigRaw;
pub use table::{MetadataTable, TableIterator};
pub use tableid::{TableId, KNOWN_TABLES_MASK};
pub use tableinfo::{TableInfo, TableInfoRef, TableRowInfo};
pub use typedef::TypeDefRaw;
pub use typeref::TypeRefRaw;

use crate::Result;

/// Trait for decoding one row of a metadata table.
///
/// Implementations parse the packed little-endian record, widening heap and
/// table indices according to the image's [`TableInfo`]. Row ids follow the
/// CLI's 1-based indexing.
pub trait RowReadable: Sized + Send {
    /// Byte size of one row of this table under the given index widths.
    fn row_size(sizes: &TableInfoRef) -> u32;

    /// Reads one row at `offset`, advancing it past the record.
    ///
    /// ## Arguments
    /// * `data`   - The table's packed record array
    /// * `offset` - Current read position, advanced by one row
    /// * `rid`    - The 1-based row id of the record
    /// * `sizes`  - Index-width information of the image
    ///
    /// # Errors
    /// Returns an error when the record is truncated or a coded index
    /// carries an undefined tag.
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self>;
}
