//! The [`CoffImage`] type: layout location and navigation over a PE/COFF image.
//!
//! A `CoffImage` is constructed from a memory buffer (or a memory-mapped
//! file) and locates every structure of the image up front: the COFF file
//! header, the optional PE32/PE32+ header with its data directories, the
//! section table, the symbol and string tables, the import and export
//! directories, and, for managed images, the CLI runtime header with its
//! metadata root and `#~` tables stream. Construction is transactional; a
//! failure in any stage yields an error and no partially initialised image.
//!
//! After construction the image is immutable. All navigation methods are
//! bounds-checked pointer walks into the validated buffer, and all returned
//! views borrow from it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use coffscope::{CoffImage, ObjectFile};
//!
//! let image = CoffImage::from_file(std::path::Path::new("module.obj"))?;
//! println!("{}", image.file_format_name());
//! for section in image.sections() {
//!     println!("{} @ {:#x}", section.name()?, section.address());
//! }
//! # Ok::<(), coffscope::Error>(())
//! ```

use std::path::Path;

use crate::{
    file::{io::read_le_at, Backend, Memory, Physical},
    metadata::{
        tables::{
            AssemblyRefRaw, MemberRefRaw, MetadataTable, MethodDefRaw, ModuleRaw, RowReadable,
            StandAloneSigRaw, TableId, TypeDefRaw, TypeRefRaw,
        },
        CliHeader, CliMetadata, Root, TablesStream, CLI_HEADER_SIZE,
    },
    object::{
        exports::ExportIterator,
        headers::{
            CoffFileHeader, CoffSymbol, DataDirectory, ExportDirectoryEntry, Pe32Header,
            Pe32PlusHeader, SectionHeader, COFF_FILE_HEADER_SIZE, COFF_SYMBOL_SIZE,
            IMPORT_DIRECTORY_ENTRY_SIZE,
        },
        imports::ImportIterator,
        section::SectionIterator,
        symbol::SymbolIterator,
        types::{
            Arch, DataDirectoryType, IMAGE_FILE_MACHINE_AMD64, IMAGE_FILE_MACHINE_I386,
            IMAGE_SYM_ABSOLUTE, IMAGE_SYM_DEBUG, IMAGE_SYM_UNDEFINED,
        },
        ObjectFile,
    },
    Error::{Empty, OutOfBounds},
    Result,
};

/// Decode a string table offset encoded in base 64 (`//AAAAAB`).
///
/// Expects the digits without the two leading slashes, most significant
/// first, using the alphabet `A-Z a-z 0-9 + /`. At most 6 digits are
/// allowed and the decoded value must fit 32 bits.
pub(crate) fn decode_base64_offset(digits: &[u8]) -> Result<u32> {
    if digits.len() > 6 {
        return Err(malformed_error!(
            "Base64 section name is too long - {} digits",
            digits.len()
        ));
    }

    let mut value: u64 = 0;
    for &c in digits {
        let digit = match c {
            b'A'..=b'Z' => c - b'A',
            b'a'..=b'z' => c - b'a' + 26,
            b'0'..=b'9' => c - b'0' + 52,
            b'+' => 62,
            b'/' => 63,
            _ => {
                return Err(malformed_error!(
                    "Invalid base64 digit in section name - {:#x}",
                    c
                ))
            }
        };

        value = (value * 64) + u64::from(digit);
    }

    u32::try_from(value)
        .map_err(|_| malformed_error!("Base64 section name offset exceeds 32 bits - {}", value))
}

/// A loaded, immutable PE/COFF image.
///
/// Owns the backing byte buffer and the cached layout derived from it. Every
/// view handed out ([`crate::SectionRef`], [`crate::SymbolRef`], import and
/// export entries, metadata tables) is a borrow bounded by the lifetime of
/// the image; the image itself is `Send + Sync` and may be shared freely
/// between threads after construction.
pub struct CoffImage {
    /// The underlying data source (memory or mapped file).
    data: Box<dyn Backend>,
    coff_header: CoffFileHeader,
    pe32_header: Option<Pe32Header>,
    pe32plus_header: Option<Pe32PlusHeader>,
    data_directories: Vec<DataDirectory>,
    sections: Vec<SectionHeader>,
    symbol_table_offset: Option<usize>,
    /// File offset and byte size of the string table, length prefix included.
    string_table: Option<(usize, u32)>,
    /// File offset and entry count of the import directory table.
    import_directory: Option<(usize, u32)>,
    export_directory: Option<ExportDirectoryEntry>,
    cli: Option<CliMetadata>,
}

impl CoffImage {
    /// Loads a PE/COFF image from a file on disk.
    ///
    /// The file is memory-mapped for the lifetime of the image.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the object file or PE image on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped, or if the
    /// image fails to parse.
    pub fn from_file(path: &Path) -> Result<CoffImage> {
        let input = Physical::new(path)?;

        Self::load(input)
    }

    /// Loads a PE/COFF image from a memory buffer.
    ///
    /// # Arguments
    ///
    /// * `data` - The bytes of the image. Ownership passes to the image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image fails to parse.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use coffscope::CoffImage;
    ///
    /// let bytes = std::fs::read("module.obj")?;
    /// let image = CoffImage::from_mem(bytes)?;
    /// println!("{} sections", image.section_headers().len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_mem(data: Vec<u8>) -> Result<CoffImage> {
        let input = Memory::new(data);

        Self::load(input)
    }

    /// Internal loader for any backend.
    fn load<B: Backend + 'static>(backend: B) -> Result<CoffImage> {
        if backend.len() == 0 {
            return Err(Empty);
        }

        let data: Box<dyn Backend> = Box::new(backend);
        let buf = data.data();

        if buf.len() < COFF_FILE_HEADER_SIZE {
            return Err(OutOfBounds);
        }

        // The current location in the file where we are looking at. The PE
        // header is present only in executable images; object files start
        // with the COFF header directly.
        let mut cursor = 0_usize;
        let mut has_pe_header = false;

        if buf[0] == 0x4D && buf[1] == 0x5A {
            // PE/COFF: seek through the MS-DOS compatibility stub and the
            // 4-byte PE signature to find the actual COFF header.
            if buf.len() < 0x3C + 8 {
                return Err(OutOfBounds);
            }

            let mut stub_pos = 0x3C_usize;
            let pe_offset = read_le_at::<u16>(buf, &mut stub_pos)? as usize;

            let Some(sig_end) = pe_offset.checked_add(4) else {
                return Err(OutOfBounds);
            };
            if sig_end > buf.len() {
                return Err(OutOfBounds);
            }
            if &buf[pe_offset..sig_end] != b"PE\0\0" {
                return Err(malformed_error!(
                    "PE signature missing at offset {:#x}",
                    pe_offset
                ));
            }

            cursor = sig_end;
            has_pe_header = true;
        }

        let coff_header = CoffFileHeader::read(buf, &mut cursor)?;

        let mut pe32_header = None;
        let mut pe32plus_header = None;
        let mut data_directories = Vec::new();

        if has_pe_header {
            let optional_start = cursor;

            let mut magic_pos = optional_start;
            let magic = read_le_at::<u16>(buf, &mut magic_pos)?;

            let mut directory_pos;
            let directory_count;
            match magic {
                0x10B => {
                    let mut pos = optional_start;
                    let header = Pe32Header::read(buf, &mut pos)?;
                    directory_count = header.number_of_rva_and_size;
                    directory_pos = pos;
                    pe32_header = Some(header);
                }
                0x20B => {
                    let mut pos = optional_start;
                    let header = Pe32PlusHeader::read(buf, &mut pos)?;
                    directory_count = header.number_of_rva_and_size;
                    directory_pos = pos;
                    pe32plus_header = Some(header);
                }
                _ => {
                    // Neither PE32 nor PE32+.
                    return Err(malformed_error!(
                        "Unknown optional header magic - {:#x}",
                        magic
                    ));
                }
            }

            data_directories.reserve(directory_count as usize);
            for _ in 0..directory_count {
                data_directories.push(DataDirectory::read(buf, &mut directory_pos)?);
            }

            // Advance by the declared optional header size, which may differ
            // from the fixed struct size.
            let Some(next) =
                optional_start.checked_add(coff_header.size_of_optional_header as usize)
            else {
                return Err(OutOfBounds);
            };
            cursor = next;
        }

        if coff_header.is_import_library() {
            return Ok(CoffImage {
                data,
                coff_header,
                pe32_header,
                pe32plus_header,
                data_directories,
                sections: Vec::new(),
                symbol_table_offset: None,
                string_table: None,
                import_directory: None,
                export_directory: None,
                cli: None,
            });
        }

        let mut sections = Vec::with_capacity(coff_header.number_of_sections as usize);
        for _ in 0..coff_header.number_of_sections {
            sections.push(SectionHeader::read(buf, &mut cursor)?);
        }

        let mut symbol_table_offset = None;
        let mut string_table = None;
        if coff_header.pointer_to_symbol_table != 0 {
            let table_offset = coff_header.pointer_to_symbol_table as usize;
            let Some(table_bytes) =
                (coff_header.number_of_symbols as usize).checked_mul(COFF_SYMBOL_SIZE)
            else {
                return Err(OutOfBounds);
            };
            let Some(strings_offset) = table_offset.checked_add(table_bytes) else {
                return Err(OutOfBounds);
            };

            // The string table starts where the symbol table ends; its first
            // four bytes are the total table size, the size field included.
            let mut size_pos = strings_offset;
            let mut strings_size = read_le_at::<u32>(buf, &mut size_pos)?;

            let Some(strings_end) = strings_offset.checked_add(strings_size as usize) else {
                return Err(OutOfBounds);
            };
            if strings_end > buf.len() {
                return Err(OutOfBounds);
            }

            // Treat sizes < 4 as empty: contrary to the PE/COFF spec, some
            // tools write 0 for an empty table instead of 4.
            if strings_size < 4 {
                strings_size = 4;
            }

            if strings_size > 4 && buf[strings_offset + strings_size as usize - 1] != 0 {
                return Err(malformed_error!("String table is not null-terminated"));
            }

            symbol_table_offset = Some(table_offset);
            string_table = Some((strings_offset, strings_size));
        }

        let mut import_directory = None;
        if let Some(dir) = data_directories.get(DataDirectoryType::ImportTable as usize) {
            if dir.virtual_address != 0 {
                let count = dir.size / IMPORT_DIRECTORY_ENTRY_SIZE as u32;
                let offset = Self::rva_to_offset_in(&sections, dir.virtual_address)?;
                data.data_slice(offset, count as usize * IMPORT_DIRECTORY_ENTRY_SIZE)?;
                import_directory = Some((offset, count));
            }
        }

        let mut export_directory = None;
        if let Some(dir) = data_directories.get(DataDirectoryType::ExportTable as usize) {
            if dir.virtual_address != 0 {
                let mut offset = Self::rva_to_offset_in(&sections, dir.virtual_address)?;
                export_directory = Some(ExportDirectoryEntry::read(buf, &mut offset)?);
            }
        }

        let mut cli = None;
        if let Some(dir) = data_directories.get(DataDirectoryType::ClrRuntimeHeader as usize) {
            if dir.virtual_address != 0 {
                let offset = Self::rva_to_offset_in(&sections, dir.virtual_address)?;
                let header = CliHeader::read(data.data_slice(offset, CLI_HEADER_SIZE)?)?;

                let mut root = None;
                let mut tables = None;
                if header.metadata_rva != 0 {
                    let root_offset = Self::rva_to_offset_in(&sections, header.metadata_rva)?;
                    let metadata_region =
                        data.data_slice(root_offset, header.metadata_size as usize)?;
                    let parsed_root = Root::read(metadata_region)?;

                    // A missing "#~" stream means the image carries no
                    // metadata tables, which is not an error.
                    if let Some(stream) = parsed_root.stream("#~") {
                        let stream_slice = metadata_region
                            .get(stream.offset as usize..(stream.offset + stream.size) as usize)
                            .ok_or(OutOfBounds)?;
                        tables = Some(TablesStream::read(
                            stream_slice,
                            root_offset + stream.offset as usize,
                        )?);
                    }

                    root = Some(parsed_root);
                }

                cli = Some(CliMetadata {
                    header,
                    root,
                    tables,
                });
            }
        }

        Ok(CoffImage {
            data,
            coff_header,
            pe32_header,
            pe32plus_header,
            data_directories,
            sections,
            symbol_table_offset,
            string_table,
            import_directory,
            export_directory,
            cli,
        })
    }

    /// Returns the total size of the loaded image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the image has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the raw bytes of the loaded image.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns a slice of the image data at the given offset and length.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the requested range does not
    /// lie inside the buffer.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// Returns the COFF file header.
    #[must_use]
    pub fn coff_header(&self) -> &CoffFileHeader {
        &self.coff_header
    }

    /// Returns the PE32 optional header, if the image carries one.
    ///
    /// At most one of [`Self::pe32_header`] and [`Self::pe32plus_header`]
    /// is present.
    #[must_use]
    pub fn pe32_header(&self) -> Option<&Pe32Header> {
        self.pe32_header.as_ref()
    }

    /// Returns the PE32+ optional header, if the image carries one.
    #[must_use]
    pub fn pe32plus_header(&self) -> Option<&Pe32PlusHeader> {
        self.pe32plus_header.as_ref()
    }

    /// Returns the preferred load address from whichever optional header is
    /// present, or `None` for plain object files.
    #[must_use]
    pub fn image_base(&self) -> Option<u64> {
        if let Some(header) = &self.pe32_header {
            return Some(u64::from(header.image_base));
        }
        if let Some(header) = &self.pe32plus_header {
            return Some(header.image_base);
        }
        None
    }

    /// Returns the data-directory entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the image has no data
    /// directories or the index is out of range.
    pub fn data_directory(&self, index: usize) -> Result<&DataDirectory> {
        if self.data_directories.is_empty() {
            return Err(malformed_error!("Image has no data directories"));
        }

        self.data_directories
            .get(index)
            .ok_or_else(|| malformed_error!("Data directory index out of range - {}", index))
    }

    /// Number of data-directory entries the optional header declared.
    #[must_use]
    pub fn data_directory_count(&self) -> usize {
        self.data_directories.len()
    }

    /// Returns the parsed section table.
    #[must_use]
    pub fn section_headers(&self) -> &[SectionHeader] {
        &self.sections
    }

    /// Resolves a symbol's section number to a section header.
    ///
    /// Section numbers are 1-based; the sentinels `UNDEFINED` (0),
    /// `ABSOLUTE` (-1) and `DEBUG` (-2) resolve to `None`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for any other index outside the
    /// section table.
    pub fn section(&self, index: i16) -> Result<Option<&SectionHeader>> {
        match index {
            IMAGE_SYM_UNDEFINED | IMAGE_SYM_ABSOLUTE | IMAGE_SYM_DEBUG => Ok(None),
            index if index > 0 => match self.sections.get(index as usize - 1) {
                Some(section) => Ok(Some(section)),
                None => Err(malformed_error!("Section index out of range - {}", index)),
            },
            _ => Err(malformed_error!("Section index out of range - {}", index)),
        }
    }

    /// Decodes a section's name.
    ///
    /// A name whose 8th byte is non-NUL uses all 8 bytes; otherwise it is
    /// the NUL-terminated prefix. A leading `/` marks a reference into the
    /// string table: `/NNN` with a decimal offset, `//BBBBBB` with a base-64
    /// encoded offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for invalid encoded offsets or a
    /// missing string table, and [`crate::Error::OutOfBounds`] for offsets
    /// past the table end.
    pub fn section_name<'a>(&'a self, section: &'a SectionHeader) -> Result<&'a str> {
        let raw = if section.name[7] == 0 {
            let nul = section.name.iter().position(|&b| b == 0).unwrap_or(8);
            &section.name[..nul]
        } else {
            &section.name[..]
        };

        if raw.first() == Some(&b'/') {
            let offset = if raw.get(1) == Some(&b'/') {
                decode_base64_offset(&raw[2..])?
            } else {
                let digits = std::str::from_utf8(&raw[1..])
                    .map_err(|_| malformed_error!("Section name is not valid UTF-8"))?;
                digits.parse::<u32>().map_err(|_| {
                    malformed_error!("Invalid decimal section name offset - {}", digits)
                })?
            };

            return self.string(offset);
        }

        std::str::from_utf8(raw).map_err(|_| malformed_error!("Section name is not valid UTF-8"))
    }

    /// Returns the raw on-disk contents of a section.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the raw data range does not
    /// lie inside the image buffer.
    pub fn section_contents(&self, section: &SectionHeader) -> Result<&[u8]> {
        self.data
            .data_slice(
                section.pointer_to_raw_data as usize,
                section.size_of_raw_data as usize,
            )
            .map_err(|_| {
                malformed_error!(
                    "Section raw data lies outside the image - {} + {}",
                    section.pointer_to_raw_data,
                    section.size_of_raw_data
                )
            })
    }

    /// Looks up a string in the COFF string table.
    ///
    /// Offsets are relative to the table start and include the 4-byte
    /// length prefix, so valid string offsets are >= 4.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when the table is empty and
    /// [`crate::Error::OutOfBounds`] when the offset is past its end.
    pub fn string(&self, offset: u32) -> Result<&str> {
        let Some((table_offset, table_size)) = self.string_table else {
            return Err(malformed_error!(
                "Tried to get a string from an empty string table"
            ));
        };

        if table_size <= 4 {
            return Err(malformed_error!(
                "Tried to get a string from an empty string table"
            ));
        }
        if offset >= table_size {
            return Err(OutOfBounds);
        }

        self.cstr_at_bounded(table_offset + offset as usize, table_offset + table_size as usize)
    }

    /// Reads the symbol record at `index` (aux slots count as indices).
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the image has no symbol table
    /// or the index is out of range.
    pub fn symbol(&self, index: u32) -> Result<CoffSymbol> {
        let Some(table_offset) = self.symbol_table_offset else {
            return Err(malformed_error!("Image has no symbol table"));
        };
        if index >= self.coff_header.number_of_symbols {
            return Err(malformed_error!("Symbol index out of range - {}", index));
        }

        let mut offset = table_offset + index as usize * COFF_SYMBOL_SIZE;
        CoffSymbol::read(self.data.data(), &mut offset)
    }

    /// Decodes a symbol's name, following the string-table reference when
    /// the first four name bytes are zero.
    ///
    /// # Errors
    /// Propagates string-table failures; returns
    /// [`crate::Error::Malformed`] for names that are not valid UTF-8.
    pub fn symbol_name<'a>(&'a self, symbol: &'a CoffSymbol) -> Result<&'a str> {
        if let Some(offset) = symbol.string_table_offset() {
            return self.string(offset);
        }

        let raw = if symbol.name[7] == 0 {
            let nul = symbol.name.iter().position(|&b| b == 0).unwrap_or(8);
            &symbol.name[..nul]
        } else {
            &symbol.name[..]
        };

        std::str::from_utf8(raw).map_err(|_| malformed_error!("Symbol name is not valid UTF-8"))
    }

    /// Returns the raw auxiliary records following the symbol at `index`,
    /// as a byte slice of `NumberOfAuxSymbols * 18` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when the aux records would cross
    /// the end of the symbol table.
    pub fn symbol_aux_data(&self, index: u32) -> Result<&[u8]> {
        let symbol = self.symbol(index)?;
        let aux_count = u32::from(symbol.number_of_aux_symbols);

        let Some(last) = index.checked_add(1 + aux_count) else {
            return Err(OutOfBounds);
        };
        if last > self.coff_header.number_of_symbols {
            return Err(malformed_error!(
                "Aux records of symbol {} cross the end of the symbol table",
                index
            ));
        }

        // Checked against number_of_symbols above; the full table was bounds
        // checked at construction.
        let table_offset = self.symbol_table_offset.ok_or(OutOfBounds)?;
        self.data.data_slice(
            table_offset + (index as usize + 1) * COFF_SYMBOL_SIZE,
            aux_count as usize * COFF_SYMBOL_SIZE,
        )
    }

    /// Resolves an RVA to a file offset through the section table.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when no section covers the RVA.
    pub fn rva_to_offset(&self, rva: u32) -> Result<usize> {
        Self::rva_to_offset_in(&self.sections, rva)
    }

    fn rva_to_offset_in(sections: &[SectionHeader], rva: u32) -> Result<usize> {
        for section in sections {
            let Some(section_end) = section.virtual_address.checked_add(section.virtual_size)
            else {
                return Err(malformed_error!(
                    "Section malformed, causing integer overflow - {} + {}",
                    section.virtual_address,
                    section.virtual_size
                ));
            };

            if section.virtual_address <= rva && rva < section_end {
                return Ok(
                    (rva - section.virtual_address) as usize + section.pointer_to_raw_data as usize
                );
            }
        }

        Err(malformed_error!(
            "RVA is not covered by any section - {:#x}",
            rva
        ))
    }

    /// Resolves a virtual address to a file offset by subtracting the image
    /// base and delegating to [`Self::rva_to_offset`].
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] when the address lies below the
    /// image base, and [`crate::Error::Malformed`] when the image has no
    /// optional header or no section covers the resulting RVA.
    pub fn va_to_offset(&self, va: u64) -> Result<usize> {
        let Some(image_base) = self.image_base() else {
            return Err(malformed_error!("Image has no optional header"));
        };
        if image_base > va {
            return Err(OutOfBounds);
        }

        let rva = va - image_base;
        let rva = u32::try_from(rva)
            .map_err(|_| malformed_error!("RVA too large to fit in u32 - {}", rva))?;
        self.rva_to_offset(rva)
    }

    /// Reads the hint/name table entry at `rva`: a 16-bit hint followed by a
    /// NUL-terminated import name.
    ///
    /// # Errors
    /// Propagates RVA resolution failures; returns
    /// [`crate::Error::OutOfBounds`] for a truncated entry.
    pub fn hint_name_at(&self, rva: u32) -> Result<(u16, &str)> {
        let offset = self.rva_to_offset(rva)?;

        let mut pos = offset;
        let hint = read_le_at::<u16>(self.data.data(), &mut pos)?;
        let name = self.cstr_at(pos)?;

        Ok((hint, name))
    }

    /// Iterates the entries of the import directory table. Empty when the
    /// image has none.
    #[must_use]
    pub fn imports(&self) -> ImportIterator<'_> {
        ImportIterator::new(self)
    }

    /// Iterates the entries of the export address table. Empty when the
    /// image has no export directory.
    #[must_use]
    pub fn exports(&self) -> ExportIterator<'_> {
        ExportIterator::new(self)
    }

    /// Returns the export directory record, if present.
    #[must_use]
    pub fn export_directory(&self) -> Option<&ExportDirectoryEntry> {
        self.export_directory.as_ref()
    }

    /// Resolves the exporting DLL's own name from the export directory.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when the image has no export
    /// directory; propagates RVA resolution failures.
    pub fn export_dll_name(&self) -> Result<&str> {
        let Some(directory) = &self.export_directory else {
            return Err(malformed_error!("Image has no export directory"));
        };

        let offset = self.rva_to_offset(directory.name_rva)?;
        self.cstr_at(offset)
    }

    /// Returns the CLI runtime header of a managed image, if present.
    #[must_use]
    pub fn cli_header(&self) -> Option<&CliHeader> {
        self.cli.as_ref().map(|cli| &cli.header)
    }

    /// Returns the parsed CLI metadata bundle (runtime header, metadata
    /// root and tables stream), if the image is managed.
    #[must_use]
    pub fn metadata(&self) -> Option<&CliMetadata> {
        self.cli.as_ref()
    }

    /// Returns the CLI metadata root with its stream directory, if present.
    #[must_use]
    pub fn metadata_root(&self) -> Option<&Root> {
        self.cli.as_ref().and_then(|cli| cli.root.as_ref())
    }

    /// Returns the parsed `#~` tables stream, if present.
    #[must_use]
    pub fn tables(&self) -> Option<&TablesStream> {
        self.cli.as_ref().and_then(|cli| cli.tables.as_ref())
    }

    /// Typed access to the record array of a present metadata table.
    ///
    /// `T` must be the row type matching `id`; prefer the named accessors
    /// ([`Self::module_table`], [`Self::type_ref_table`], ...) which fix
    /// the pairing. Returns `None` when the image is unmanaged, the table
    /// is absent, or `T` does not fit the table's extent.
    #[must_use]
    pub fn table<T: RowReadable>(&self, id: TableId) -> Option<MetadataTable<'_, T>> {
        let tables = self.tables()?;
        let location = tables.location(id)?;

        let data = self
            .data
            .data_slice(location.offset, location.byte_size)
            .ok()?;
        MetadataTable::new(data, location.rows, tables.info.clone()).ok()
    }

    /// The Module table of a managed image.
    #[must_use]
    pub fn module_table(&self) -> Option<MetadataTable<'_, ModuleRaw>> {
        self.table(TableId::Module)
    }

    /// The TypeRef table of a managed image.
    #[must_use]
    pub fn type_ref_table(&self) -> Option<MetadataTable<'_, TypeRefRaw>> {
        self.table(TableId::TypeRef)
    }

    /// The TypeDef table of a managed image.
    #[must_use]
    pub fn type_def_table(&self) -> Option<MetadataTable<'_, TypeDefRaw>> {
        self.table(TableId::TypeDef)
    }

    /// The MethodDef table of a managed image.
    #[must_use]
    pub fn method_def_table(&self) -> Option<MetadataTable<'_, MethodDefRaw>> {
        self.table(TableId::MethodDef)
    }

    /// The MemberRef table of a managed image.
    #[must_use]
    pub fn member_ref_table(&self) -> Option<MetadataTable<'_, MemberRefRaw>> {
        self.table(TableId::MemberRef)
    }

    /// The StandAloneSig table of a managed image.
    #[must_use]
    pub fn stand_alone_sig_table(&self) -> Option<MetadataTable<'_, StandAloneSigRaw>> {
        self.table(TableId::StandAloneSig)
    }

    /// The AssemblyRef table of a managed image.
    #[must_use]
    pub fn assembly_ref_table(&self) -> Option<MetadataTable<'_, AssemblyRefRaw>> {
        self.table(TableId::AssemblyRef)
    }

    /// Reads a NUL-terminated string starting at `offset`, bounded by the
    /// end of the buffer.
    pub(crate) fn cstr_at(&self, offset: usize) -> Result<&str> {
        self.cstr_at_bounded(offset, self.data.len())
    }

    /// Reads a NUL-terminated string in `[start, end)`.
    fn cstr_at_bounded(&self, start: usize, end: usize) -> Result<&str> {
        if start > end {
            return Err(OutOfBounds);
        }
        let bytes = self.data.data_slice(start, end - start)?;

        let nul = bytes
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| malformed_error!("String at offset {} is not null-terminated", start))?;

        std::str::from_utf8(&bytes[..nul])
            .map_err(|_| malformed_error!("String at offset {} is not valid UTF-8", start))
    }

    pub(crate) fn import_directory_location(&self) -> Option<(usize, u32)> {
        self.import_directory
    }
}

impl ObjectFile for CoffImage {
    fn file_format_name(&self) -> &'static str {
        match self.coff_header.machine {
            IMAGE_FILE_MACHINE_I386 => "COFF-i386",
            IMAGE_FILE_MACHINE_AMD64 => "COFF-x86-64",
            _ => "COFF-<unknown arch>",
        }
    }

    fn arch(&self) -> Arch {
        match self.coff_header.machine {
            IMAGE_FILE_MACHINE_I386 => Arch::X86,
            IMAGE_FILE_MACHINE_AMD64 => Arch::X86_64,
            _ => Arch::Unknown,
        }
    }

    fn bytes_in_address(&self) -> u8 {
        if self.arch() == Arch::X86_64 {
            8
        } else {
            4
        }
    }

    fn sections(&self) -> SectionIterator<'_> {
        SectionIterator::new(self)
    }

    fn symbols(&self) -> SymbolIterator<'_> {
        SymbolIterator::new(self)
    }
}
