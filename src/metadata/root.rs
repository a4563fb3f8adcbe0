//! Metadata root header and stream directory of managed images.
//!
//! The metadata root is the entry point of the CLI metadata region. It
//! cannot be read as a plain cast because of the variable-length version
//! string: the declared length is rounded up to a 4-byte boundary before
//! the flags, stream count and stream directory follow.
//!
//! # Example
//!
//! ```rust
//! use coffscope::metadata::Root;
//!
//! let root = Root::read(&[
//!     0x42, 0x53, 0x4A, 0x42, // signature 'BSJB'
//!     0x01, 0x00,             // major_version
//!     0x01, 0x00,             // minor_version
//!     0x00, 0x00, 0x00, 0x00, // reserved
//!     0x04, 0x00, 0x00, 0x00, // length = 4
//!     b'v', b'4', b'\0', b'\0',
//!     0x00, 0x00,             // flags
//!     0x01, 0x00,             // one stream
//!     0x24, 0x00, 0x00, 0x00, // stream offset
//!     0x04, 0x00, 0x00, 0x00, // stream size
//!     0x23, 0x7E, 0x00, 0x00, // "#~\0" padded
//!     0x00, 0x00, 0x00, 0x00, // the stream itself
//! ])?;
//! assert_eq!(root.version, "v4");
//! assert_eq!(root.stream_headers.len(), 1);
//! # Ok::<(), coffscope::Error>(())
//! ```

use crate::{
    file::io::{read_le, read_le_at},
    metadata::streams::StreamHeader,
    Error::OutOfBounds,
    Result,
};

/// The magic value introducing the CLI metadata root ('BSJB' little-endian).
pub const METADATA_SIGNATURE: u32 = 0x424A_5342;

/// The parsed metadata root with its stream directory.
///
/// The byte slice handed to [`Root::read`] is expected to be the complete
/// metadata region; all stream extents are validated against it.
pub struct Root {
    /// Magic signature for physical metadata: 0x424A5342
    pub signature: u32,
    /// `MajorVersion`, 1
    pub major_version: u16,
    /// `MinorVersion`, 1
    pub minor_version: u16,
    /// Reserved, always 0
    pub reserved: u32,
    /// Number of bytes allocated to hold the version string
    pub length: u32,
    /// The version string, NUL padding stripped
    pub version: String,
    /// Reserved, always 0
    pub flags: u16,
    /// Number of streams
    pub stream_number: u16,
    /// The stream directory
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Reads a metadata root from the metadata region.
    ///
    /// # Arguments
    /// * `data` - The complete metadata region, starting at the root
    ///
    /// # Errors
    /// Returns an error if the region is too short, the signature does not
    /// match, or a stream extends past the region.
    pub fn read(data: &[u8]) -> Result<Root> {
        if data.len() < 20 {
            return Err(OutOfBounds);
        }

        let signature = read_le::<u32>(data)?;
        if signature != METADATA_SIGNATURE {
            return Err(malformed_error!(
                "Metadata signature does not match - {:#x}",
                signature
            ));
        }

        let major_version = read_le::<u16>(&data[4..])?;
        let minor_version = read_le::<u16>(&data[6..])?;
        let reserved = read_le::<u32>(&data[8..])?;

        let length = read_le::<u32>(&data[12..])?;
        if length > 255 {
            return Err(malformed_error!(
                "Version string length {} exceeds the format limit (255)",
                length
            ));
        }

        // The version string occupies its declared length rounded up to a
        // 4-byte boundary; the stored text is NUL padded.
        let padded_length = ((length as usize) + 3) & !3;
        let Some(version_end) = 16_usize.checked_add(padded_length) else {
            return Err(OutOfBounds);
        };
        if version_end > data.len() {
            return Err(OutOfBounds);
        }

        let version_bytes = &data[16..16 + length as usize];
        let version_text = match version_bytes.iter().position(|&b| b == 0) {
            Some(nul) => &version_bytes[..nul],
            None => version_bytes,
        };
        let version = std::str::from_utf8(version_text)
            .map_err(|_| malformed_error!("Version string is not valid UTF-8"))?
            .to_string();

        let mut cursor = version_end;
        let flags = read_le_at::<u16>(data, &mut cursor)?;
        let stream_number = read_le_at::<u16>(data, &mut cursor)?;

        let mut streams = Vec::with_capacity(stream_number as usize);
        for _ in 0..stream_number {
            if cursor > data.len() {
                return Err(OutOfBounds);
            }

            let stream = StreamHeader::from(&data[cursor..])?;

            match u32::checked_add(stream.offset, stream.size) {
                Some(end) => {
                    if end as usize > data.len() {
                        return Err(OutOfBounds);
                    }
                }
                None => {
                    return Err(malformed_error!(
                        "Stream offset and size cause integer overflow - {} + {}",
                        stream.offset,
                        stream.size
                    ))
                }
            }

            cursor += stream.byte_size();
            streams.push(stream);
        }

        Ok(Root {
            signature,
            major_version,
            minor_version,
            reserved,
            length,
            version,
            flags,
            stream_number,
            stream_headers: streams,
        })
    }

    /// Looks up a stream header by name.
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&StreamHeader> {
        self.stream_headers
            .iter()
            .find(|stream| stream.name == name)
    }
}
