//! Export directory views.
//!
//! The export data directory holds a single directory record describing
//! three parallel tables: the export address table (indexed by biased
//! ordinal), the name-pointer table and the ordinal table. An export has a
//! name only when some ordinal-table entry carries its index; exports
//! without one are reachable by ordinal alone.

use crate::{
    file::io::read_le_at,
    object::coff::CoffImage,
    Result,
};

/// A reference to one slot of the export address table.
#[derive(Clone, Copy)]
pub struct ExportEntry<'a> {
    image: &'a CoffImage,
    index: u32,
}

impl<'a> ExportEntry<'a> {
    /// Zero-based index into the export address table.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The export ordinal: `OrdinalBase + index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when the image has no export
    /// directory.
    pub fn ordinal(&self) -> Result<u32> {
        let directory = self
            .image
            .export_directory()
            .ok_or_else(|| malformed_error!("Image has no export directory"))?;

        Ok(directory.ordinal_base + self.index)
    }

    /// The exported RVA from the export address table.
    ///
    /// # Errors
    /// Propagates RVA resolution failures and truncated tables.
    pub fn export_rva(&self) -> Result<u32> {
        let directory = self
            .image
            .export_directory()
            .ok_or_else(|| malformed_error!("Image has no export directory"))?;

        let table_offset = self
            .image
            .rva_to_offset(directory.export_address_table_rva)?;

        let mut offset = table_offset + self.index as usize * 4;
        read_le_at::<u32>(self.image.data(), &mut offset)
    }

    /// The exported name, resolved through the ordinal and name-pointer
    /// tables. `None` when the export is reachable by ordinal only.
    ///
    /// # Errors
    /// Propagates RVA resolution failures and truncated tables.
    pub fn symbol_name(&self) -> Result<Option<&'a str>> {
        let directory = self
            .image
            .export_directory()
            .ok_or_else(|| malformed_error!("Image has no export directory"))?;

        let ordinal_table = self.image.rva_to_offset(directory.ordinal_table_rva)?;

        // Search the ordinal table for the first entry naming this index;
        // its position selects the parallel name-pointer entry.
        for position in 0..directory.number_of_name_pointers {
            let mut offset = ordinal_table + position as usize * 2;
            let ordinal_entry = read_le_at::<u16>(self.image.data(), &mut offset)?;
            if u32::from(ordinal_entry) != self.index {
                continue;
            }

            let name_pointers = self.image.rva_to_offset(directory.name_pointer_rva)?;
            let mut offset = name_pointers + position as usize * 4;
            let name_rva = read_le_at::<u32>(self.image.data(), &mut offset)?;

            let name_offset = self.image.rva_to_offset(name_rva)?;
            return self.image.cstr_at(name_offset).map(Some);
        }

        Ok(None)
    }
}

impl PartialEq for ExportEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.image, other.image) && self.index == other.index
    }
}

impl Eq for ExportEntry<'_> {}

/// Iterator over the slots of the export address table.
pub struct ExportIterator<'a> {
    image: &'a CoffImage,
    index: u32,
    count: u32,
}

impl<'a> ExportIterator<'a> {
    pub(crate) fn new(image: &'a CoffImage) -> Self {
        let count = image
            .export_directory()
            .map_or(0, |directory| directory.address_table_entries);

        ExportIterator {
            image,
            index: 0,
            count,
        }
    }
}

impl<'a> Iterator for ExportIterator<'a> {
    type Item = ExportEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }

        let entry = ExportEntry {
            image: self.image,
            index: self.index,
        };
        self.index += 1;

        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count.saturating_sub(self.index) as usize;
        (remaining, Some(remaining))
    }
}
