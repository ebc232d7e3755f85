//! Binary reading utilities for parsing EVTC files.
//!
//! This module provides functions for reading little-endian integers,
//! byte arrays, and null-padded strings from byte buffers at a given
//! offset. All functions perform bounds checking and return
//! [`ParserError::Truncated`] when the buffer is too short.
//!
//! # Example
//!
//! ```
//! use evtc::binary::{read_u16_le, read_u64_le, read_fixed_string};
//!
//! let data = [0x34, 0x12, 0x01, 0, 0, 0, 0, 0, 0, 0, b'H', b'i', 0x00, 0x00];
//!
//! assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
//! assert_eq!(read_u64_le(&data, 2).unwrap(), 1);
//! assert_eq!(read_fixed_string(&data, 10, 4).unwrap(), "Hi");
//! ```

use crate::error::{ParserError, Result};

/// Reads `N` bytes at `offset` into a fixed-size array.
///
/// # Errors
///
/// Returns `ParserError::Truncated` if fewer than `N` bytes remain.
pub fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    let slice = read_bytes(bytes, offset, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

/// Reads a single byte at the given offset.
///
/// # Errors
///
/// Returns `ParserError::Truncated` if `offset` is past the end of the buffer.
pub fn read_u8(bytes: &[u8], offset: usize) -> Result<u8> {
    bytes
        .get(offset)
        .copied()
        .ok_or_else(|| ParserError::truncated(offset + 1, bytes.len()))
}

/// Reads a little-endian u16 value from the byte buffer at the given offset.
///
/// # Errors
///
/// Returns `ParserError::Truncated` if the buffer doesn't contain
/// at least 2 bytes starting from the given offset.
///
/// # Example
///
/// ```
/// use evtc::binary::read_u16_le;
///
/// let data = [0x34, 0x12, 0xFF, 0xFF];
/// assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_le(&data, 2).unwrap(), 0xFFFF);
/// ```
pub fn read_u16_le(bytes: &[u8], offset: usize) -> Result<u16> {
    read_array(bytes, offset).map(u16::from_le_bytes)
}

/// Reads a little-endian u32 value from the byte buffer at the given offset.
///
/// # Errors
///
/// Returns `ParserError::Truncated` if the buffer doesn't contain
/// at least 4 bytes starting from the given offset.
pub fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32> {
    read_array(bytes, offset).map(u32::from_le_bytes)
}

/// Reads a little-endian i32 value from the byte buffer at the given offset.
///
/// # Errors
///
/// Returns `ParserError::Truncated` if fewer than 4 bytes remain.
pub fn read_i32_le(bytes: &[u8], offset: usize) -> Result<i32> {
    read_array(bytes, offset).map(i32::from_le_bytes)
}

/// Reads a little-endian u64 value from the byte buffer at the given offset.
///
/// # Errors
///
/// Returns `ParserError::Truncated` if fewer than 8 bytes remain.
pub fn read_u64_le(bytes: &[u8], offset: usize) -> Result<u64> {
    read_array(bytes, offset).map(u64::from_le_bytes)
}

/// Reads a slice of bytes from the buffer at the given offset.
///
/// # Errors
///
/// Returns `ParserError::Truncated` if the buffer doesn't contain
/// at least `len` bytes starting from the given offset.
///
/// # Example
///
/// ```
/// use evtc::binary::read_bytes;
///
/// let data = b"EVTC20190101";
/// assert_eq!(read_bytes(data, 0, 4).unwrap(), b"EVTC");
/// ```
pub fn read_bytes(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset.saturating_add(len);
    if end > bytes.len() {
        return Err(ParserError::truncated(end, bytes.len()));
    }

    Ok(&bytes[offset..end])
}

/// Reads a fixed-length string field, stopping at the first null byte.
///
/// Game-supplied names are not guaranteed to be valid UTF-8, so invalid
/// sequences are replaced rather than rejected.
///
/// # Errors
///
/// Returns `ParserError::Truncated` if `offset + len` is beyond the buffer.
///
/// # Example
///
/// ```
/// use evtc::binary::read_fixed_string;
///
/// let data = b"Hi\x00\x00\x00\x00\x00\x00";
/// assert_eq!(read_fixed_string(data, 0, 8).unwrap(), "Hi");
/// ```
pub fn read_fixed_string(bytes: &[u8], offset: usize, len: usize) -> Result<String> {
    let slice = read_bytes(bytes, offset, len)?;
    Ok(null_terminated(slice))
}

/// Decodes the bytes up to the first null (or the whole slice) as a string.
#[must_use]
pub fn null_terminated(slice: &[u8]) -> String {
    let end = slice.iter().position(|&b| b == 0).unwrap_or(slice.len());
    String::from_utf8_lossy(&slice[..end]).into_owned()
}
