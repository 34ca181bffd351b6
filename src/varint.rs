//! Unsigned LEB128 varints and ZigZag signed varints.
//!
//! Used by the delta key layout and available to value implementations that
//! want compact integers in their own byte formats.

use bytes::{Buf, BufMut};
use thiserror::Error;

/// Longest encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Failure to read a varint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VarintError {
    /// Input ended inside a varint.
    #[error("varint truncated after {0} bytes")]
    Truncated(usize),

    /// Varint does not fit in 64 bits.
    #[error("varint exceeds 64 bits")]
    Overflow,
}

/// Appends `v` as an unsigned varint.
pub fn put_u64<B: BufMut>(buf: &mut B, mut v: u64) {
    while v >= 0x80 {
        buf.put_u8((v as u8 & 0x7f) | 0x80);
        v >>= 7;
    }
    buf.put_u8(v as u8);
}

/// Reads an unsigned varint, advancing `buf` past it.
pub fn get_u64<B: Buf>(buf: &mut B) -> Result<u64, VarintError> {
    let mut result = 0u64;
    for i in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return Err(VarintError::Truncated(i));
        }
        let byte = buf.get_u8();
        let payload = u64::from(byte & 0x7f);
        if i == MAX_VARINT_LEN - 1 && payload > 1 {
            return Err(VarintError::Overflow);
        }
        result |= payload << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(VarintError::Overflow)
}

/// Appends `v` as a ZigZag varint.
pub fn put_i64<B: BufMut>(buf: &mut B, v: i64) {
    put_u64(buf, ((v << 1) ^ (v >> 63)) as u64);
}

/// Reads a ZigZag varint, advancing `buf` past it.
pub fn get_i64<B: Buf>(buf: &mut B) -> Result<i64, VarintError> {
    let zigzag = get_u64(buf)?;
    Ok(((zigzag >> 1) as i64) ^ -((zigzag & 1) as i64))
}

/// Number of bytes `put_u64` writes for `v`.
pub fn encoded_len(v: u64) -> usize {
    let bits = 64 - v.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}
