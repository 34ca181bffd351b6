//! Page encoding formats.
//!
//! Every page is written in exactly one format. The format is tracked by the
//! page store (usually in the page header) and passed to every encode and
//! decode call for that page; it is never inferred from entry bytes.
//!
//! ## Tags
//!
//! ```text
//! Legacy    = 0   general-purpose object codec for values, absolute keys
//! Sparse    = 1   self-encoding values, absolute keys
//! DeltaKeys = 2   self-encoding values, keys delta-encoded against the page base key
//! ```
//!
//! The tag is also the format version handed to self-encoding values, so it
//! must never change for an existing variant.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// On-disk layout of the entries in a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EncodingFormat {
    /// Values go through the legacy object codec.
    Legacy = 0,

    /// Values encode themselves; keys are stored absolute.
    Sparse = 1,

    /// Like `Sparse`, with keys stored as deltas against the page base key.
    DeltaKeys = 2,
}

impl EncodingFormat {
    /// All formats, in tag order.
    pub const ALL: [EncodingFormat; 3] =
        [EncodingFormat::Legacy, EncodingFormat::Sparse, EncodingFormat::DeltaKeys];

    /// Converts a stored tag to a format.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedFormat` for any tag outside the known set.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(EncodingFormat::Legacy),
            1 => Ok(EncodingFormat::Sparse),
            2 => Ok(EncodingFormat::DeltaKeys),
            other => Err(Error::UnsupportedFormat(other)),
        }
    }

    /// Returns the stable tag, which doubles as the value format version.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Whether keys are delta-encoded against the page base key.
    pub fn encodes_keys_as_delta(self) -> bool {
        matches!(self, EncodingFormat::DeltaKeys)
    }

    /// Whether values are serialized through `SelfEncodingValue`.
    pub fn is_self_encoding(self) -> bool {
        match self {
            EncodingFormat::Legacy => false,
            EncodingFormat::Sparse | EncodingFormat::DeltaKeys => true,
        }
    }
}

impl Default for EncodingFormat {
    fn default() -> Self {
        EncodingFormat::DeltaKeys
    }
}

impl TryFrom<u8> for EncodingFormat {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        EncodingFormat::from_tag(tag)
    }
}

impl From<EncodingFormat> for u8 {
    fn from(format: EncodingFormat) -> u8 {
        format.tag()
    }
}

impl fmt::Display for EncodingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EncodingFormat::Legacy => "Legacy",
            EncodingFormat::Sparse => "Sparse",
            EncodingFormat::DeltaKeys => "DeltaKeys",
        };
        f.write_str(name)
    }
}
