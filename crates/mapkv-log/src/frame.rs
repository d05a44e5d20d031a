//! Frame encoding for the record log.
//!
//! One frame is `key_len (8 bytes LE) | value_len (8 bytes LE) | key_bytes |
//! value_bytes`. Frames carry no checksum; corruption is detected through
//! length validation against the valid byte range and UTF-8 validation of
//! the key.

use crate::region::MappedRegion;
use mapkv_core::{Error, Result};

/// Byte length of the two length fields preceding every frame body.
pub const FRAME_HEADER_LEN: u64 = 16;

/// Total encoded length of a frame for the given key and value.
pub fn encoded_len(key: &str, value: &[u8]) -> u64 {
    FRAME_HEADER_LEN + key.len() as u64 + value.len() as u64
}

/// Write one frame at `offset`, returning the offset one past it.
///
/// The caller is responsible for checking that the frame fits below the
/// region's capacity; the region's own bounds checks are the backstop.
pub fn write_frame(
    region: &mut MappedRegion,
    offset: u64,
    key: &str,
    value: &[u8],
) -> Result<u64> {
    region.write_u64_at(offset, key.len() as u64)?;
    region.write_u64_at(offset + 8, value.len() as u64)?;
    region.write_at(offset + FRAME_HEADER_LEN, key.as_bytes())?;
    region.write_at(offset + FRAME_HEADER_LEN + key.len() as u64, value)?;
    Ok(offset + encoded_len(key, value))
}

/// Decode one frame at `offset`.
///
/// `limit` is the first offset past the last valid byte (header length plus
/// `total_written_bytes`). Declared lengths that would read past it signal
/// on-disk corruption, as do key bytes that do not decode as UTF-8.
///
/// Returns the key, the value and the offset of the next frame.
pub fn read_frame(region: &MappedRegion, offset: u64, limit: u64) -> Result<(String, Vec<u8>, u64)> {
    if offset + FRAME_HEADER_LEN > limit {
        return Err(Error::CorruptLog(format!(
            "frame header at offset {} reaches past valid bytes at {}",
            offset, limit
        )));
    }

    let key_len = region.read_u64_at(offset)?;
    let value_len = region.read_u64_at(offset + 8)?;

    let body_end = (offset + FRAME_HEADER_LEN)
        .checked_add(key_len)
        .and_then(|end| end.checked_add(value_len))
        .filter(|end| *end <= limit)
        .ok_or_else(|| {
            Error::CorruptLog(format!(
                "frame at offset {} declares {} key bytes and {} value bytes, past valid bytes at {}",
                offset, key_len, value_len, limit
            ))
        })?;

    let key_bytes = region.read_at(offset + FRAME_HEADER_LEN, key_len as usize)?;
    let key = std::str::from_utf8(key_bytes)
        .map_err(|_| {
            Error::CorruptLog(format!(
                "key of {} bytes at offset {} is not valid UTF-8",
                key_len,
                offset + FRAME_HEADER_LEN
            ))
        })?
        .to_string();

    let value = region
        .read_at(offset + FRAME_HEADER_LEN + key_len, value_len as usize)?
        .to_vec();

    Ok((key, value, body_end))
}
