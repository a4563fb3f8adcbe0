//! CLI runtime header parsing for managed PE images.
//!
//! The CLI runtime header is the fixed 72-byte structure the
//! `CLR_RUNTIME_HEADER` data directory of a managed image points at. Its
//! most important fields are the RVA and size of the metadata region.

use crate::{file::io::read_le_at, Error::OutOfBounds, Result};

/// Size in bytes of the CLI runtime header.
pub const CLI_HEADER_SIZE: usize = 72;

/// The CLI runtime header, located at the beginning of the CLR runtime
/// header data directory of managed PE images.
pub struct CliHeader {
    /// Size of the header in bytes, always 72
    pub cb: u32,
    /// The minimum major runtime version required to run this image
    pub major_runtime_version: u16,
    /// The minor portion of the required runtime version
    pub minor_runtime_version: u16,
    /// RVA of the metadata root, 0 when the image carries no metadata
    pub metadata_rva: u32,
    /// Size of the metadata region in bytes
    pub metadata_size: u32,
    /// Flags describing this runtime image
    pub flags: u32,
    /// Token of the entry point method, or file index for multi-module images
    pub entry_point_token: u32,
    /// RVA of implementation specific resources
    pub resources_rva: u32,
    /// Size of implementation specific resources
    pub resources_size: u32,
    /// RVA of the strong name signature hash
    pub strong_name_signature_rva: u32,
    /// Size of the strong name signature hash
    pub strong_name_signature_size: u32,
    /// Always 0
    pub code_manager_table_rva: u32,
    /// Always 0
    pub code_manager_table_size: u32,
    /// RVA of an array of function-pointer fixup locations
    pub vtable_fixups_rva: u32,
    /// Size of the function-pointer fixup array
    pub vtable_fixups_size: u32,
    /// Always 0
    pub export_address_table_jmp_rva: u32,
    /// Always 0
    pub export_address_table_jmp_size: u32,
    /// Always 0
    pub managed_native_header_rva: u32,
    /// Always 0
    pub managed_native_header_size: u32,
}

impl CliHeader {
    /// Create a `CliHeader` object from a sequence of bytes.
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is too short to contain a CLI header or
    /// if a field violates the fixed-layout constraints.
    pub fn read(data: &[u8]) -> Result<CliHeader> {
        if data.len() < CLI_HEADER_SIZE {
            return Err(OutOfBounds);
        }

        let mut offset = 0_usize;

        let cb = read_le_at::<u32>(data, &mut offset)?;
        if cb != CLI_HEADER_SIZE as u32 {
            return Err(malformed_error!(
                "Invalid CLI header size: expected 72, got {}",
                cb
            ));
        }

        let major_runtime_version = read_le_at::<u16>(data, &mut offset)?;
        let minor_runtime_version = read_le_at::<u16>(data, &mut offset)?;

        // A zero metadata RVA is legal: the image declares a runtime header
        // but carries no metadata region.
        let metadata_rva = read_le_at::<u32>(data, &mut offset)?;
        let metadata_size = read_le_at::<u32>(data, &mut offset)?;
        if metadata_rva != 0 && metadata_size == 0 {
            return Err(malformed_error!("Metadata size cannot be zero"));
        }

        let flags = read_le_at::<u32>(data, &mut offset)?;
        let entry_point_token = read_le_at::<u32>(data, &mut offset)?;

        let resources_rva = read_le_at::<u32>(data, &mut offset)?;
        let resources_size = read_le_at::<u32>(data, &mut offset)?;

        let strong_name_signature_rva = read_le_at::<u32>(data, &mut offset)?;
        let strong_name_signature_size = read_le_at::<u32>(data, &mut offset)?;

        let code_manager_table_rva = read_le_at::<u32>(data, &mut offset)?;
        let code_manager_table_size = read_le_at::<u32>(data, &mut offset)?;
        if code_manager_table_rva != 0 || code_manager_table_size != 0 {
            return Err(malformed_error!(
                "Code manager table fields must be zero (reserved)"
            ));
        }

        let vtable_fixups_rva = read_le_at::<u32>(data, &mut offset)?;
        let vtable_fixups_size = read_le_at::<u32>(data, &mut offset)?;

        let export_address_table_jmp_rva = read_le_at::<u32>(data, &mut offset)?;
        let export_address_table_jmp_size = read_le_at::<u32>(data, &mut offset)?;

        let managed_native_header_rva = read_le_at::<u32>(data, &mut offset)?;
        let managed_native_header_size = read_le_at::<u32>(data, &mut offset)?;

        Ok(CliHeader {
            cb,
            major_runtime_version,
            minor_runtime_version,
            metadata_rva,
            metadata_size,
            flags,
            entry_point_token,
            resources_rva,
            resources_size,
            strong_name_signature_rva,
            strong_name_signature_size,
            code_manager_table_rva,
            code_manager_table_size,
            vtable_fixups_rva,
            vtable_fixups_size,
            export_address_table_jmp_rva,
            export_address_table_jmp_size,
            managed_native_header_rva,
            managed_native_header_size,
        })
    }
}
