//! Coded indices: compact cross-table references in metadata records.
//!
//! A coded index packs a table tag into the low bits of a row index. The
//! byte width of the field depends on the row counts of every table the
//! index can refer to: it stays at 2 bytes as long as the largest
//! participating table fits `16 - tag_bits` bits.

use strum::{EnumCount, EnumIter};

use crate::{
    file::io::read_le_at_dyn,
    metadata::tables::{TableId, TableInfoRef},
    Result,
};

/// The kinds of coded index the metadata tables use.
///
/// Each kind fixes the set of tables it can refer to and the number of tag
/// bits needed to select between them.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, EnumCount)]
pub enum CodedIndexType {
    /// TypeDef, TypeRef or TypeSpec
    TypeDefOrRef,
    /// Field, Param or Property owning a constant
    HasConstant,
    /// Any element a custom attribute can decorate
    HasCustomAttribute,
    /// Field or Param carrying marshalling information
    HasFieldMarshal,
    /// TypeDef, MethodDef or Assembly carrying security declarations
    HasDeclSecurity,
    /// Parent of a MemberRef
    MemberRefParent,
    /// Event or Property owning semantics
    HasSemantics,
    /// MethodDef or MemberRef
    MethodDefOrRef,
    /// Field or MethodDef forwarded through P/Invoke
    MemberForwarded,
    /// File, AssemblyRef or ExportedType
    Implementation,
    /// Constructor of a custom attribute
    CustomAttributeType,
    /// Scope a TypeRef resolves in
    ResolutionScope,
    /// TypeDef or MethodDef owning a generic parameter
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// Number of tag bits the coded index reserves.
    #[must_use]
    pub fn tag_bits(self) -> u8 {
        match self {
            CodedIndexType::TypeDefOrRef
            | CodedIndexType::HasConstant
            | CodedIndexType::HasDeclSecurity
            | CodedIndexType::Implementation
            | CodedIndexType::ResolutionScope => 2,
            CodedIndexType::HasCustomAttribute => 5,
            CodedIndexType::HasFieldMarshal
            | CodedIndexType::HasSemantics
            | CodedIndexType::MethodDefOrRef
            | CodedIndexType::MemberForwarded
            | CodedIndexType::TypeOrMethodDef => 1,
            CodedIndexType::MemberRefParent | CodedIndexType::CustomAttributeType => 3,
        }
    }

    /// The tables participating in this coded index; their row counts
    /// decide whether the field is 2 or 4 bytes wide.
    #[must_use]
    pub fn tables(self) -> &'static [TableId] {
        match self {
            CodedIndexType::TypeDefOrRef => {
                &[TableId::TypeDef, TableId::TypeRef, TableId::TypeSpec]
            }
            CodedIndexType::HasConstant => {
                &[TableId::Field, TableId::Param, TableId::Property]
            }
            CodedIndexType::HasCustomAttribute => &[
                TableId::MethodDef,
                TableId::Field,
                TableId::TypeRef,
                TableId::TypeDef,
                TableId::Param,
                TableId::InterfaceImpl,
                TableId::MemberRef,
                TableId::Module,
                TableId::DeclSecurity,
                TableId::Property,
                TableId::Event,
                TableId::StandAloneSig,
                TableId::ModuleRef,
                TableId::TypeSpec,
                TableId::Assembly,
                TableId::AssemblyRef,
                TableId::File,
                TableId::ExportedType,
                TableId::ManifestResource,
                TableId::GenericParam,
                TableId::GenericParamConstraint,
                TableId::MethodSpec,
            ],
            CodedIndexType::HasFieldMarshal => &[TableId::Field, TableId::Param],
            CodedIndexType::HasDeclSecurity => {
                &[TableId::TypeDef, TableId::MethodDef, TableId::Assembly]
            }
            CodedIndexType::MemberRefParent => &[
                TableId::TypeDef,
                TableId::TypeRef,
                TableId::ModuleRef,
                TableId::MethodDef,
                TableId::TypeSpec,
            ],
            CodedIndexType::HasSemantics => &[TableId::Event, TableId::Property],
            CodedIndexType::MethodDefOrRef => &[TableId::MethodDef, TableId::MemberRef],
            CodedIndexType::MemberForwarded => &[TableId::Field, TableId::MethodDef],
            CodedIndexType::Implementation => {
                &[TableId::File, TableId::AssemblyRef, TableId::ExportedType]
            }
            CodedIndexType::CustomAttributeType => &[TableId::MethodDef, TableId::MemberRef],
            CodedIndexType::ResolutionScope => &[
                TableId::Module,
                TableId::ModuleRef,
                TableId::AssemblyRef,
                TableId::TypeRef,
            ],
            CodedIndexType::TypeOrMethodDef => &[TableId::TypeDef, TableId::MethodDef],
        }
    }

    /// Maps a tag value to the table it selects, `None` for tags the kind
    /// does not define.
    #[must_use]
    pub fn table_for_tag(self, tag: u32) -> Option<TableId> {
        match self {
            // CustomAttributeType reserves tags 0, 1 and 4.
            CodedIndexType::CustomAttributeType => match tag {
                2 => Some(TableId::MethodDef),
                3 => Some(TableId::MemberRef),
                _ => None,
            },
            _ => self.tables().get(tag as usize).copied(),
        }
    }
}

/// A decoded coded index: the selected table and the 1-based row inside it.
///
/// Row 0 is the null reference.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CodedIndex {
    /// The table this index refers to
    pub tag: TableId,
    /// The 1-based row the index points at, 0 for the null reference
    pub row: u32,
}

impl CodedIndex {
    /// Reads and decodes a coded index field.
    ///
    /// The field is 2 or 4 bytes depending on the precomputed width for its
    /// kind; the tag is split off the low bits and mapped to its table.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated data and
    /// [`crate::Error::Malformed`] for an undefined tag value.
    pub fn read(
        data: &[u8],
        offset: &mut usize,
        sizes: &TableInfoRef,
        coded_index_type: CodedIndexType,
    ) -> Result<CodedIndex> {
        let value = read_le_at_dyn(data, offset, sizes.is_large_coded_index(coded_index_type))?;

        let tag_bits = coded_index_type.tag_bits();
        let tag = value & ((1 << tag_bits) - 1);
        let row = value >> tag_bits;

        let Some(table) = coded_index_type.table_for_tag(tag) else {
            return Err(malformed_error!(
                "Invalid coded index tag {} for {:?}",
                tag,
                coded_index_type
            ));
        };

        Ok(CodedIndex { tag: table, row })
    }
}
