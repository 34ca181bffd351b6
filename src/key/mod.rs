//! # Ordered Key Format
//!
//! Keys stored in pages are composite: a signed 64-bit ordinal plus an
//! optional raw byte string.
//!
//! ## Absolute Format
//!
//! ```text
//! raw absent:   [ordinal ^ SIGN_BIT: u64 BE]
//! raw present:  [ordinal ^ SIGN_BIT: u64 BE] [0x01] [raw: bytes to end]
//! ```
//!
//! ## Ordering
//!
//! Keys are ordered by:
//! 1. ordinal (ascending, signed)
//! 2. raw: absent before present, then lexicographic (unsigned bytes)
//!
//! The absolute encoding preserves this ordering under plain byte comparison,
//! so page code can binary search encoded keys directly.
//!
//! Delta encoding against a page base key lives in [`delta`].

pub mod delta;

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// Size of the fixed ordinal prefix.
pub const ORDINAL_SIZE: usize = 8;

/// Marker byte between the ordinal and a present raw component.
pub const RAW_PRESENT: u8 = 0x01;

const SIGN_BIT: u64 = 1 << 63;

static NEGATIVE_INFINITY_BYTES: OnceLock<Bytes> = OnceLock::new();

/// Composite page key.
///
/// Immutable once built; cloning shares the raw buffer.
///
/// # Example
///
/// ```rust
/// use pagekv::OrderedKey;
///
/// let a = OrderedKey::new(1000, Some(b"abc".to_vec()));
/// let b = OrderedKey::new(1000, None::<Vec<u8>>);
/// assert!(b < a);
/// assert_eq!(OrderedKey::from_bytes(&a.to_bytes()).unwrap(), a);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderedKey {
    ordinal: i64,
    raw: Option<Bytes>,
}

impl OrderedKey {
    /// Creates a new key.
    pub fn new(ordinal: i64, raw: Option<impl Into<Bytes>>) -> Self {
        Self {
            ordinal,
            raw: raw.map(Into::into),
        }
    }

    /// Creates a key with no raw component.
    pub fn from_ordinal(ordinal: i64) -> Self {
        Self { ordinal, raw: None }
    }

    /// The reserved lower bound `(0, none)` used for open page boundaries.
    ///
    /// It sorts below every key whose ordinal is non-negative. Keys with a
    /// negative ordinal sort below it, both as keys and as encoded bytes, so
    /// callers that rely on the bound must keep ordinals `>= 0`.
    pub fn negative_infinity() -> Self {
        Self::from_ordinal(0)
    }

    /// Cached absolute encoding of [`OrderedKey::negative_infinity`].
    ///
    /// Computed on first use and identical on every call afterwards.
    pub fn encoded_negative_infinity() -> Bytes {
        NEGATIVE_INFINITY_BYTES
            .get_or_init(|| Self::negative_infinity().to_bytes())
            .clone()
    }

    /// Returns true for the reserved lower bound.
    pub fn is_negative_infinity(&self) -> bool {
        self.ordinal == 0 && self.raw.is_none()
    }

    /// Returns the ordinal.
    pub fn ordinal(&self) -> i64 {
        self.ordinal
    }

    /// Returns the raw component, if any.
    pub fn raw(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    /// Returns true if the key carries a raw component.
    pub fn has_raw(&self) -> bool {
        self.raw.is_some()
    }

    /// Size of the absolute encoding.
    pub fn encoded_size(&self) -> usize {
        ORDINAL_SIZE + self.raw.as_ref().map_or(0, |raw| 1 + raw.len())
    }

    /// Encodes the key in the absolute format.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_size());
        buf.put_u64(self.ordinal as u64 ^ SIGN_BIT);
        if let Some(raw) = &self.raw {
            buf.put_u8(RAW_PRESENT);
            buf.put_slice(raw);
        }
        buf.freeze()
    }

    /// Decodes a key from the absolute format.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedKey` if the ordinal is truncated or the byte
    /// after it is not the raw marker.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < ORDINAL_SIZE {
            return Err(Error::malformed_key(format!(
                "absolute key too short: {} bytes",
                data.len()
            )));
        }

        let mut buf = data;
        let ordinal = (buf.get_u64() ^ SIGN_BIT) as i64;

        if !buf.has_remaining() {
            return Ok(Self::from_ordinal(ordinal));
        }

        let marker = buf.get_u8();
        if marker != RAW_PRESENT {
            return Err(Error::malformed_key(format!(
                "invalid raw marker {:#04x} after ordinal {}",
                marker, ordinal
            )));
        }

        Ok(Self {
            ordinal,
            raw: Some(Bytes::copy_from_slice(buf)),
        })
    }

    /// Encodes this key relative to `base`. See [`delta`] for the layout.
    pub fn delta_encode(&self, base: &OrderedKey) -> Bytes {
        delta::encode(self, base)
    }

    /// Decodes a key produced by [`OrderedKey::delta_encode`] with the same base.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedKey` if the bytes are not a valid delta
    /// against `base`.
    pub fn delta_decode(data: &[u8], base: &OrderedKey) -> Result<Self> {
        delta::decode(data, base)
    }
}

impl PartialOrd for OrderedKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Option orders None first, and Bytes compares as unsigned bytes
        self.ordinal
            .cmp(&other.ordinal)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl fmt::Display for OrderedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ordinal)?;
        if let Some(raw) = &self.raw {
            f.write_str(":")?;
            for byte in raw.iter() {
                write!(f, "{:02x}", byte)?;
            }
        }
        Ok(())
    }
}
