//! Import directory views.
//!
//! The import data directory points at an array of fixed-size directory
//! entries, one per imported DLL. Each entry in turn points (by RVA) at the
//! DLL name and at an import lookup table: a zero-terminated run of 32-bit
//! words that are either ordinals or hint/name RVAs.
//!
//! # Examples
//!
//! ```rust,no_run
//! use coffscope::CoffImage;
//!
//! let image = CoffImage::from_file(std::path::Path::new("app.exe"))?;
//! for import in image.imports() {
//!     println!("{}", import.name()?);
//!     for entry in import.lookup_entries()? {
//!         let entry = entry?;
//!         if entry.is_ordinal() {
//!             println!("  ordinal #{}", entry.ordinal());
//!         } else {
//!             let (hint, name) = image.hint_name_at(entry.hint_name_rva())?;
//!             println!("  {} (hint {})", name, hint);
//!         }
//!     }
//! }
//! # Ok::<(), coffscope::Error>(())
//! ```

use crate::{
    file::io::read_le_at,
    object::{
        coff::CoffImage,
        headers::{ImportDirectoryEntry, ImportLookupEntry, IMPORT_DIRECTORY_ENTRY_SIZE},
    },
    Result,
};

/// A reference to one entry of the import directory table.
#[derive(Clone, Copy)]
pub struct ImportEntry<'a> {
    image: &'a CoffImage,
    index: u32,
    record: ImportDirectoryEntry,
}

impl<'a> ImportEntry<'a> {
    /// Zero-based index of the entry in the import directory table.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The raw directory entry.
    #[must_use]
    pub fn record(&self) -> &ImportDirectoryEntry {
        &self.record
    }

    /// The name of the imported DLL.
    ///
    /// # Errors
    /// Propagates RVA resolution failures and unterminated names.
    pub fn name(&self) -> Result<&'a str> {
        let offset = self.image.rva_to_offset(self.record.name_rva)?;
        self.image.cstr_at(offset)
    }

    /// Iterates the entry's import lookup table until the terminating zero
    /// word.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when the lookup table RVA is not
    /// covered by any section.
    pub fn lookup_entries(&self) -> Result<ImportLookupIterator<'a>> {
        let offset = self
            .image
            .rva_to_offset(self.record.import_lookup_table_rva)?;

        Ok(ImportLookupIterator {
            image: self.image,
            offset,
            done: false,
        })
    }
}

impl PartialEq for ImportEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.image, other.image) && self.index == other.index
    }
}

impl Eq for ImportEntry<'_> {}

/// Iterator over the entries of the import directory table.
pub struct ImportIterator<'a> {
    image: &'a CoffImage,
    index: u32,
    count: u32,
}

impl<'a> ImportIterator<'a> {
    pub(crate) fn new(image: &'a CoffImage) -> Self {
        let count = image
            .import_directory_location()
            .map_or(0, |(_, count)| count);

        ImportIterator {
            image,
            index: 0,
            count,
        }
    }
}

impl<'a> Iterator for ImportIterator<'a> {
    type Item = ImportEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }

        let (table_offset, _) = self.image.import_directory_location()?;

        // The whole directory was bounds checked at construction.
        let mut offset = table_offset + self.index as usize * IMPORT_DIRECTORY_ENTRY_SIZE;
        let record = ImportDirectoryEntry::read(self.image.data(), &mut offset).ok()?;

        let entry = ImportEntry {
            image: self.image,
            index: self.index,
            record,
        };
        self.index += 1;

        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count.saturating_sub(self.index) as usize;
        (remaining, Some(remaining))
    }
}

/// Iterator over the 32-bit words of one import lookup table.
///
/// Stops at the terminating zero word; a table that runs past the end of
/// the buffer surfaces as a final `Err` item.
pub struct ImportLookupIterator<'a> {
    image: &'a CoffImage,
    offset: usize,
    done: bool,
}

impl Iterator for ImportLookupIterator<'_> {
    type Item = Result<ImportLookupEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match read_le_at::<u32>(self.image.data(), &mut self.offset) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(word) => Some(Ok(ImportLookupEntry(word))),
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}
