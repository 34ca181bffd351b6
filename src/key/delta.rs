//! Delta encoding of keys against a page base key.
//!
//! Keys in one page tend to have close ordinals and often share a raw
//! prefix with the base key, so a key is stored as the ordinal difference plus
//! the unshared tail of its raw component.
//!
//! ## Format
//!
//! ```text
//! [ordinal delta: zigzag varint]                        // ordinal - base.ordinal, wrapping
//! [tag: u8]
//!   0x00  raw absent, nothing follows
//!   0x01  raw present:
//!         [shared: varint]                              // prefix length shared with base.raw
//!         [suffix: bytes to end]
//! ```
//!
//! `shared` is always 0 when the base key has no raw component.

use super::OrderedKey;
use crate::error::{Error, Result};
use crate::varint;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Tag for a key without a raw component.
pub const TAG_NO_RAW: u8 = 0x00;

/// Tag for a key whose raw component follows as shared length + suffix.
pub const TAG_RAW: u8 = 0x01;

/// Encodes `key` relative to `base`.
pub fn encode(key: &OrderedKey, base: &OrderedKey) -> Bytes {
    let delta = key.ordinal.wrapping_sub(base.ordinal);

    let Some(raw) = key.raw() else {
        let mut buf = BytesMut::with_capacity(varint::MAX_VARINT_LEN + 1);
        varint::put_i64(&mut buf, delta);
        buf.put_u8(TAG_NO_RAW);
        return buf.freeze();
    };

    let shared = base.raw().map_or(0, |base_raw| shared_prefix_len(base_raw, raw));
    let suffix = &raw[shared..];

    let mut buf = BytesMut::with_capacity(2 * varint::MAX_VARINT_LEN + 1 + suffix.len());
    varint::put_i64(&mut buf, delta);
    buf.put_u8(TAG_RAW);
    varint::put_u64(&mut buf, shared as u64);
    buf.put_slice(suffix);
    buf.freeze()
}

/// Decodes a key produced by [`encode`] with the same `base`.
pub fn decode(data: &[u8], base: &OrderedKey) -> Result<OrderedKey> {
    let mut buf = data;

    let delta = varint::get_i64(&mut buf)
        .map_err(|e| Error::malformed_key(format!("delta key ordinal: {}", e)))?;
    let ordinal = base.ordinal.wrapping_add(delta);

    if !buf.has_remaining() {
        return Err(Error::malformed_key("delta key truncated before raw tag"));
    }

    match buf.get_u8() {
        TAG_NO_RAW => {
            if buf.has_remaining() {
                return Err(Error::malformed_key(format!(
                    "delta key has {} trailing bytes",
                    buf.remaining()
                )));
            }
            Ok(OrderedKey::from_ordinal(ordinal))
        }
        TAG_RAW => {
            let shared = varint::get_u64(&mut buf)
                .map_err(|e| Error::malformed_key(format!("delta key shared length: {}", e)))?;
            let base_raw = base.raw().unwrap_or_default();
            if shared > base_raw.len() as u64 {
                return Err(Error::malformed_key(format!(
                    "delta key shares {} bytes but base raw has {}",
                    shared,
                    base_raw.len()
                )));
            }
            let shared = shared as usize;

            let mut raw = BytesMut::with_capacity(shared + buf.len());
            raw.put_slice(&base_raw[..shared]);
            raw.put_slice(buf);
            Ok(OrderedKey {
                ordinal,
                raw: Some(raw.freeze()),
            })
        }
        tag => Err(Error::malformed_key(format!("unknown delta key tag {:#04x}", tag))),
    }
}

fn shared_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
