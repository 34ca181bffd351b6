//! Error types for the PageKV coder.

use crate::format::EncodingFormat;
use thiserror::Error;

/// The result type used throughout PageKV.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error raised by value implementations and legacy codecs.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type for coder operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A format tag outside the known set reached a dispatch point.
    #[error("Unsupported encoding format: {0}")]
    UnsupportedFormat(u8),

    /// Bytes could not be parsed as an absolute or delta key.
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    /// A value could not be serialized.
    #[error("Failed to encode {value_type} value as {format}: {source}")]
    Encoding {
        /// Type name of the value being encoded.
        value_type: &'static str,
        /// Page format in force for the call.
        format: EncodingFormat,
        /// Underlying codec or value error.
        #[source]
        source: BoxError,
    },

    /// A value could not be constructed or populated from bytes.
    #[error("Failed to decode {value_type} value as {format}: {source}")]
    Decoding {
        /// Type name of the value being decoded.
        value_type: &'static str,
        /// Page format in force for the call.
        format: EncodingFormat,
        /// Underlying codec, factory or value error.
        #[source]
        source: BoxError,
    },

    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Creates a new malformed key error.
    pub fn malformed_key(msg: impl Into<String>) -> Self {
        Error::MalformedKey(msg.into())
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Returns true if this error reports an unrecognized format tag.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Error::UnsupportedFormat(_))
    }

    /// Returns true if this error reports an unparseable key.
    pub fn is_malformed_key(&self) -> bool {
        matches!(self, Error::MalformedKey(_))
    }
}
