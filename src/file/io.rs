//! Safe little-endian reading utilities for PE/COFF and CLI metadata parsing.
//!
//! Every multi-byte field in a COFF image and its CLI metadata region is
//! little-endian regardless of host byte order, and none of them can be
//! assumed to be naturally aligned. The [`CoffIO`] trait and the `read_le*`
//! functions in this module are the sole primitive through which image bytes
//! become typed values; all of them are bounds-checked and overflow-safe.

use crate::{Error::OutOfBounds, Result};

/// Trait for types that can be read from an unaligned little-endian byte run.
///
/// Implemented for the integer widths that occur in COFF headers and CLI
/// metadata records. The associated `Bytes` array pins the wire size of the
/// type.
pub trait CoffIO: Sized {
    #[allow(missing_docs)]
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read Self from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

impl CoffIO for u8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u8::from_le_bytes(bytes)
    }
}

impl CoffIO for u16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u16::from_le_bytes(bytes)
    }
}

// Section numbers in symbol records are signed 16-bit.
impl CoffIO for i16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        i16::from_le_bytes(bytes)
    }
}

impl CoffIO for u32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u32::from_le_bytes(bytes)
    }
}

impl CoffIO for u64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u64::from_le_bytes(bytes)
    }
}

/// Safely read T in little-endian from the start of a data buffer.
///
/// ## Arguments
/// * 'data' - The data buffer to read from
///
/// # Errors
/// Returns [`OutOfBounds`] if the buffer is shorter than `size_of::<T>()`.
pub fn read_le<T: CoffIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely read T in little-endian from an offset into a data buffer.
///
/// ## Arguments
/// * 'data'    - The data buffer to read from
/// * 'offset'  - The offset to read at, advanced by the amount of bytes read
///
/// # Errors
/// Returns [`OutOfBounds`] if the read would cross the end of the buffer or
/// the offset arithmetic would overflow.
pub fn read_le_at<T: CoffIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Safely read 4 or 2 bytes in little-endian from an offset into a data buffer.
///
/// CLI metadata heap and table indices are 2 bytes in the common case and
/// widen to 4 bytes for large heaps/tables; the caller passes the width
/// decision in.
///
/// ## Arguments
/// * 'data'        - The data buffer to read from
/// * 'offset'      - The offset to read at, advanced by the amount of bytes read
/// * `is_large`    - Indicates if 4 or 2 bytes should be read
///
/// # Errors
/// Returns [`OutOfBounds`] if the read would cross the end of the buffer.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    let res = if is_large {
        read_le_at::<u32>(data, offset)?
    } else {
        u32::from(read_le_at::<u16>(data, offset)?)
    };

    Ok(res)
}
