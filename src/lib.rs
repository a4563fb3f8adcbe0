// Copyright 2026 coffscope contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # coffscope
//!
//! A read-only parser for the PE/COFF object file format, including the
//! embedded CLI metadata stream of managed (".NET-style") images. Built in
//! pure Rust, `coffscope` takes a contiguous byte image of an object file
//! and exposes a navigable, typed, zero-copy view over its headers, section
//! table, symbol table, string table, import and export directories,
//! relocations and, for managed images, the CLI runtime header, metadata
//! root, stream directory and a subset of the metadata tables.
//!
//! # Architecture
//!
//! The library is organised in three layers:
//!
//! - **File layer** (crate-internal): data-source backends over an owned
//!   buffer or a memory-mapped file, plus the bounds-checked little-endian
//!   reader every parse goes through.
//! - **Object layer** ([`object`]): the [`CoffImage`] entry point with the
//!   image layout locator, RVA/VA resolution, and iterator facades over
//!   sections, symbols, relocations, imports and exports.
//! - **Metadata layer** ([`metadata`]): the CLI runtime header, metadata
//!   root, stream directory and the `#~` tables stream with typed row
//!   access for the Module, TypeRef, TypeDef, MethodDef, MemberRef,
//!   StandAloneSig and AssemblyRef tables.
//!
//! Every structure is decoded through bounds-checked little-endian reads;
//! no field access trusts alignment or buffer extent. Construction is
//! transactional: a malformed image yields an [`Error`], never a partially
//! initialised value.
//!
//! # Usage Examples
//!
//! ## Walking sections and symbols
//!
//! ```rust,no_run
//! use coffscope::{CoffImage, ObjectFile};
//!
//! let image = CoffImage::from_mem(std::fs::read("module.obj")?)?;
//! println!("format: {}", image.file_format_name());
//!
//! for section in image.sections() {
//!     println!("{} @ {:#x} ({} bytes)", section.name()?, section.address(), section.size());
//! }
//! for symbol in image.symbols() {
//!     println!("{} -> {:?}", symbol.name()?, symbol.kind()?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Inspecting a managed image
//!
//! ```rust,no_run
//! use coffscope::CoffImage;
//!
//! let image = CoffImage::from_file(std::path::Path::new("managed.dll"))?;
//! if let Some(tables) = image.tables() {
//!     println!("{} metadata tables", tables.table_count());
//!     if let Some(methods) = image.method_def_table() {
//!         for method in methods.iter() {
//!             println!("method rva {:#x}", method.rva);
//!         }
//!     }
//! }
//! # Ok::<(), coffscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! A [`CoffImage`] is immutable after construction and `Send + Sync`;
//! iterators and element views are independent borrows, so concurrent
//! readers need no synchronisation.
//!
//! # References
//!
//! - Microsoft PE/COFF Specification
//! - ECMA-335 6th Edition, Partition II - Metadata and PE File Format

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Convenient re-exports of the most commonly used types.
///
/// ```rust,no_run
/// use coffscope::prelude::*;
///
/// let image = CoffImage::from_file(std::path::Path::new("module.obj"))?;
/// println!("{}", image.file_format_name());
/// # Ok::<(), coffscope::Error>(())
/// ```
pub mod prelude;

/// CLI metadata parsing: runtime header, metadata root, streams, tables.
pub mod metadata;

/// PE/COFF object layer: image layout, sections, symbols, directories.
pub mod object;

/// `coffscope` Result type.
///
/// A type alias for `std::result::Result<T, Error>` used by every fallible
/// operation in the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// `coffscope` Error type.
pub use error::Error;

/// Main entry point: the loaded PE/COFF image.
pub use object::CoffImage;

/// Capability trait the image implements for the host object-file
/// abstraction.
pub use object::ObjectFile;

/// Generic architecture classification.
pub use object::Arch;

pub use object::{
    ExportEntry, ImportEntry, RelocationRef, SectionRef, SymbolFlags, SymbolKind, SymbolRef,
};
