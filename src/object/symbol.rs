//! Symbol views and iteration.
//!
//! A COFF symbol table is a packed array of 18-byte slots in which a symbol
//! record may be followed by `NumberOfAuxSymbols` auxiliary records
//! occupying the same slot size. [`SymbolIterator`] walks the table
//! skipping aux slots; [`SymbolRef`] exposes the classification rules the
//! host object-file abstraction expects (kind, flags, address, file offset)
//! on top of the raw record.

use bitflags::bitflags;

use crate::{
    object::{
        coff::CoffImage,
        headers::CoffSymbol,
        types::{
            SectionCharacteristics, IMAGE_SYM_ABSOLUTE, IMAGE_SYM_CLASS_EXTERNAL,
            IMAGE_SYM_CLASS_WEAK_EXTERNAL, IMAGE_SYM_DTYPE_FUNCTION, IMAGE_SYM_UNDEFINED,
        },
    },
    Result,
};

/// Classification of a symbol, derived from its type, class and section.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolKind {
    /// External and undefined; nothing is known about the referent
    Unknown,
    /// Complex type marks the symbol as a function
    Function,
    /// Lives in a readable, non-writable section
    Data,
    /// Everything else
    Other,
}

bitflags! {
    /// Flag bits derived from a symbol's section number, value and class.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct SymbolFlags: u32 {
        /// Undefined reference with value 0
        const UNDEFINED = 1 << 0;
        /// Undefined reference with a non-zero value (common block)
        const COMMON = 1 << 1;
        /// External storage class
        const GLOBAL = 1 << 2;
        /// Weak-external storage class
        const WEAK = 1 << 3;
        /// Attached to the absolute pseudo-section
        const ABSOLUTE = 1 << 4;
    }
}

/// A reference to one symbol of a [`CoffImage`].
#[derive(Clone)]
pub struct SymbolRef<'a> {
    image: &'a CoffImage,
    index: u32,
    record: CoffSymbol,
}

impl<'a> SymbolRef<'a> {
    /// Builds a reference for the symbol at `index` (aux slots count).
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the image has no symbol table
    /// or the index is out of range.
    pub(crate) fn at(image: &'a CoffImage, index: u32) -> Result<SymbolRef<'a>> {
        let record = image.symbol(index)?;
        Ok(SymbolRef {
            image,
            index,
            record,
        })
    }

    /// Zero-based slot index of the symbol in the symbol table.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The raw symbol record.
    #[must_use]
    pub fn record(&self) -> &CoffSymbol {
        &self.record
    }

    /// The decoded symbol name.
    ///
    /// # Errors
    /// Propagates string-table failures, see [`CoffImage::symbol_name`].
    pub fn name(&self) -> Result<&str> {
        self.image.symbol_name(&self.record)
    }

    /// The raw value field of the symbol.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.record.value
    }

    /// The symbol's section header, `None` for the UNDEFINED/ABSOLUTE/DEBUG
    /// sentinels.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for section numbers outside the
    /// section table.
    pub fn section(&self) -> Result<Option<&'a crate::object::headers::SectionHeader>> {
        self.image.section(self.record.section_number)
    }

    /// Classifies the symbol per the host object-file rules.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for invalid section numbers.
    pub fn kind(&self) -> Result<SymbolKind> {
        if self.record.storage_class == IMAGE_SYM_CLASS_EXTERNAL
            && self.record.section_number == IMAGE_SYM_UNDEFINED
        {
            return Ok(SymbolKind::Unknown);
        }
        if self.record.complex_type() == IMAGE_SYM_DTYPE_FUNCTION {
            return Ok(SymbolKind::Function);
        }

        let mut characteristics = SectionCharacteristics::empty();
        if self.record.section_number > 0 {
            if let Some(section) = self.section()? {
                characteristics = SectionCharacteristics::from_bits_truncate(section.characteristics);
            }
        }

        if characteristics.contains(SectionCharacteristics::MEM_READ)
            && !characteristics.contains(SectionCharacteristics::MEM_WRITE)
        {
            return Ok(SymbolKind::Data);
        }

        Ok(SymbolKind::Other)
    }

    /// The flag bits of the symbol.
    #[must_use]
    pub fn flags(&self) -> SymbolFlags {
        let mut flags = SymbolFlags::empty();

        if self.record.section_number == IMAGE_SYM_UNDEFINED {
            if self.record.value == 0 {
                flags |= SymbolFlags::UNDEFINED;
            } else {
                flags |= SymbolFlags::COMMON;
            }
        }

        if self.record.storage_class == IMAGE_SYM_CLASS_EXTERNAL {
            flags |= SymbolFlags::GLOBAL;
        }
        if self.record.storage_class == IMAGE_SYM_CLASS_WEAK_EXTERNAL {
            flags |= SymbolFlags::WEAK;
        }
        if self.record.section_number == IMAGE_SYM_ABSOLUTE {
            flags |= SymbolFlags::ABSOLUTE;
        }

        flags
    }

    /// The RVA of the symbol (`Section.VirtualAddress + Value`), `None`
    /// when the symbol is undefined. Symbols outside any section yield
    /// their raw value.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for invalid section numbers.
    pub fn address(&self) -> Result<Option<u64>> {
        if self.record.section_number == IMAGE_SYM_UNDEFINED {
            return Ok(None);
        }

        match self.section()? {
            Some(section) => Ok(Some(
                u64::from(section.virtual_address) + u64::from(self.record.value),
            )),
            None => Ok(Some(u64::from(self.record.value))),
        }
    }

    /// The file offset of the symbol (`Section.PointerToRawData + Value`),
    /// `None` when the symbol is undefined.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for invalid section numbers.
    pub fn file_offset(&self) -> Result<Option<u64>> {
        if self.record.section_number == IMAGE_SYM_UNDEFINED {
            return Ok(None);
        }

        match self.section()? {
            Some(section) => Ok(Some(
                u64::from(section.pointer_to_raw_data) + u64::from(self.record.value),
            )),
            None => Ok(Some(u64::from(self.record.value))),
        }
    }

    /// A placeholder size: the distance from the symbol's value to the end
    /// of its section's raw data, 0 when the symbol has no section. The
    /// true per-symbol size would require scanning all symbols of the
    /// section.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for invalid section numbers.
    pub fn size(&self) -> Result<u64> {
        if self.record.section_number == IMAGE_SYM_UNDEFINED {
            return Ok(0);
        }

        match self.section()? {
            Some(section) => Ok(u64::from(section.size_of_raw_data)
                .saturating_sub(u64::from(self.record.value))),
            None => Ok(0),
        }
    }

    /// The raw auxiliary records that follow the symbol, as a slice of
    /// `NumberOfAuxSymbols * 18` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when the aux records would cross
    /// the end of the symbol table.
    pub fn aux_data(&self) -> Result<&'a [u8]> {
        self.image.symbol_aux_data(self.index)
    }
}

/// Iterator over the symbols of a [`CoffImage`], skipping auxiliary slots.
///
/// Each step advances by `1 + NumberOfAuxSymbols` table slots, so the
/// yielded items are exactly the primary symbol records.
pub struct SymbolIterator<'a> {
    image: &'a CoffImage,
    index: u32,
}

impl<'a> SymbolIterator<'a> {
    pub(crate) fn new(image: &'a CoffImage) -> Self {
        SymbolIterator { image, index: 0 }
    }
}

impl<'a> Iterator for SymbolIterator<'a> {
    type Item = SymbolRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.image.coff_header().number_of_symbols {
            return None;
        }

        // The whole table was bounds checked at construction, so the read
        // only fails when no symbol table exists at all.
        let symbol = SymbolRef::at(self.image, self.index).ok()?;
        self.index = self
            .index
            .saturating_add(1 + u32::from(symbol.record.number_of_aux_symbols));

        Some(symbol)
    }
}
