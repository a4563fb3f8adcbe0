//! Identifiers for the CLI metadata tables.

use strum::{EnumCount, EnumIter};

/// Identifiers for the metadata tables the `#~` stream can carry.
///
/// The numeric values are the bit positions in the `Valid` and `Sorted`
/// bitmaps of the tables-stream header. Declaration order is ascending, so
/// iterating the enum walks the bitmaps in the order the packed record
/// arrays are laid out.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, EnumIter, EnumCount)]
pub enum TableId {
    /// `Module` (0x00) - information about the current module, one row
    Module = 0x00,
    /// `TypeRef` (0x01) - references to types in external scopes
    TypeRef = 0x01,
    /// `TypeDef` (0x02) - type definitions of this module
    TypeDef = 0x02,
    /// `FieldPtr` (0x03) - field indirection for uncompressed streams
    FieldPtr = 0x03,
    /// `Field` (0x04) - field definitions
    Field = 0x04,
    /// `MethodPtr` (0x05) - method indirection for uncompressed streams
    MethodPtr = 0x05,
    /// `MethodDef` (0x06) - method definitions
    MethodDef = 0x06,
    /// `ParamPtr` (0x07) - parameter indirection for uncompressed streams
    ParamPtr = 0x07,
    /// `Param` (0x08) - method parameter definitions
    Param = 0x08,
    /// `InterfaceImpl` (0x09) - interface implementations
    InterfaceImpl = 0x09,
    /// `MemberRef` (0x0A) - references to members of external types
    MemberRef = 0x0A,
    /// `Constant` (0x0B) - compile-time constant values
    Constant = 0x0B,
    /// `CustomAttribute` (0x0C) - custom attribute applications
    CustomAttribute = 0x0C,
    /// `FieldMarshal` (0x0D) - marshalling information
    FieldMarshal = 0x0D,
    /// `DeclSecurity` (0x0E) - declarative security permissions
    DeclSecurity = 0x0E,
    /// `ClassLayout` (0x0F) - explicit type layout
    ClassLayout = 0x0F,
    /// `FieldLayout` (0x10) - explicit field offsets
    FieldLayout = 0x10,
    /// `StandAloneSig` (0x11) - standalone signatures
    StandAloneSig = 0x11,
    /// `EventMap` (0x12) - type-to-event mapping
    EventMap = 0x12,
    /// `EventPtr` (0x13) - event indirection for uncompressed streams
    EventPtr = 0x13,
    /// `Event` (0x14) - event definitions
    Event = 0x14,
    /// `PropertyMap` (0x15) - type-to-property mapping
    PropertyMap = 0x15,
    /// `PropertyPtr` (0x16) - property indirection for uncompressed streams
    PropertyPtr = 0x16,
    /// `Property` (0x17) - property definitions
    Property = 0x17,
    /// `MethodSemantics` (0x18) - accessor mappings
    MethodSemantics = 0x18,
    /// `MethodImpl` (0x19) - method implementation overrides
    MethodImpl = 0x19,
    /// `ModuleRef` (0x1A) - references to external modules
    ModuleRef = 0x1A,
    /// `TypeSpec` (0x1B) - type specifications
    TypeSpec = 0x1B,
    /// `ImplMap` (0x1C) - P/Invoke mappings
    ImplMap = 0x1C,
    /// `FieldRVA` (0x1D) - field data locations
    FieldRVA = 0x1D,
    /// `ENCLog` (0x1E) - edit-and-continue log
    ENCLog = 0x1E,
    /// `ENCMap` (0x1F) - edit-and-continue map
    ENCMap = 0x1F,
    /// `Assembly` (0x20) - the assembly manifest
    Assembly = 0x20,
    /// `AssemblyProcessor` (0x21) - processor-specific assembly info
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` (0x22) - OS-specific assembly info
    AssemblyOS = 0x22,
    /// `AssemblyRef` (0x23) - references to external assemblies
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` (0x24) - processor info of references
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` (0x25) - OS info of references
    AssemblyRefOS = 0x25,
    /// `File` (0x26) - files of the assembly
    File = 0x26,
    /// `ExportedType` (0x27) - types exported from other modules
    ExportedType = 0x27,
    /// `ManifestResource` (0x28) - embedded or linked resources
    ManifestResource = 0x28,
    /// `NestedClass` (0x29) - nesting relationships
    NestedClass = 0x29,
    /// `GenericParam` (0x2A) - generic parameter definitions
    GenericParam = 0x2A,
    /// `MethodSpec` (0x2B) - generic method instantiations
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` (0x2C) - generic parameter constraints
    GenericParamConstraint = 0x2C,
}

/// Bitmap of every table id this crate knows; any `Valid` bit outside it
/// names no ECMA table.
pub const KNOWN_TABLES_MASK: u64 = (1 << (TableId::GenericParamConstraint as u64 + 1)) - 1;
