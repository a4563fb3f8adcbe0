//! Curated re-exports of the most frequently used types.

pub use crate::{
    metadata::{
        tables::{
            AssemblyRefRaw, MemberRefRaw, MetadataTable, MethodDefRaw, ModuleRaw,
            StandAloneSigRaw, TableId, TypeDefRaw, TypeRefRaw,
        },
        method_size, CliHeader, CliMetadata, Root, TablesStream,
    },
    object::{
        ExportEntry, ImportEntry, RelocationRef, SectionRef, SymbolFlags, SymbolKind, SymbolRef,
    },
    Arch, CoffImage, Error, ObjectFile, Result,
};
