//! PE/COFF object layer: image layout, sections, symbols, directories.
//!
//! This module contains the native PE/COFF parsing core. [`CoffImage`] owns
//! the buffer and the located layout; [`ObjectFile`] is the capability
//! surface a host object-file abstraction dispatches through (format and
//! architecture queries plus section and symbol iteration). The remaining
//! types are value-like views into the image.
//!
//! # Key Components
//!
//! - [`CoffImage`] - the loaded image, entry point of the crate
//! - [`ObjectFile`] - format/arch queries and iteration capabilities
//! - [`SectionRef`] / [`SymbolRef`] - per-element views with the
//!   classification rules of the host abstraction
//! - [`ImportEntry`] / [`ExportEntry`] - directory entry views
//! - [`headers`] - the raw wire structures
//! - [`types`] - constant catalogs (machine types, characteristics, ...)

pub mod headers;
pub mod types;

mod coff;
mod exports;
mod imports;
mod section;
mod symbol;

pub use coff::CoffImage;
pub use exports::{ExportEntry, ExportIterator};
pub use imports::{ImportEntry, ImportIterator, ImportLookupIterator};
pub use section::{RelocationIterator, RelocationRef, SectionIterator, SectionRef};
pub use symbol::{SymbolFlags, SymbolIterator, SymbolKind, SymbolRef};
pub use types::Arch;

/// Capabilities every object-file reader exposes to the host abstraction.
///
/// The host side dispatches over readers for multiple formats; this crate
/// implements the trait for COFF only, so the iterator types are concrete.
pub trait ObjectFile {
    /// Printable format name: `"COFF-i386"`, `"COFF-x86-64"` or
    /// `"COFF-<unknown arch>"`.
    fn file_format_name(&self) -> &'static str;

    /// Generic architecture classification of the image.
    fn arch(&self) -> Arch;

    /// Width of an address on the target: 8 for x86-64, 4 otherwise.
    fn bytes_in_address(&self) -> u8;

    /// Iterates the sections of the image.
    fn sections(&self) -> SectionIterator<'_>;

    /// Iterates the symbols of the image, skipping auxiliary records.
    fn symbols(&self) -> SymbolIterator<'_>;
}
