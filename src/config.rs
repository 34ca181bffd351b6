//! Configuration options for the PageKV coder.

use crate::format::EncodingFormat;
use crate::value::legacy::DEFAULT_LEGACY_SIZE_LIMIT;

/// Configuration options for building a coder.
#[derive(Debug, Clone)]
pub struct Options {
    /// Format suggested to the page store for newly created pages.
    /// Default: EncodingFormat::DeltaKeys
    pub default_format: EncodingFormat,

    /// Largest legacy-encoded value the coder will write or read (in bytes).
    /// Enforced by the coder whichever legacy codec is installed.
    /// Default: 64MB
    pub legacy_size_limit: u64,

    /// Decode every delta-encoded key right after encoding it and fail if it
    /// does not come back unchanged.
    /// Default: false
    pub verify_encoded_keys: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_format: EncodingFormat::default(),
            legacy_size_limit: DEFAULT_LEGACY_SIZE_LIMIT,
            verify_encoded_keys: false,
        }
    }
}

impl Options {
    /// Creates a new Options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the format for new pages.
    pub fn default_format(mut self, format: EncodingFormat) -> Self {
        self.default_format = format;
        self
    }

    /// Sets the legacy codec size limit.
    pub fn legacy_size_limit(mut self, limit: u64) -> Self {
        self.legacy_size_limit = limit;
        self
    }

    /// Enables or disables verification of delta-encoded keys.
    pub fn verify_encoded_keys(mut self, value: bool) -> Self {
        self.verify_encoded_keys = value;
        self
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> crate::Result<()> {
        if self.legacy_size_limit == 0 {
            return Err(crate::Error::invalid_argument("legacy_size_limit must be > 0"));
        }
        Ok(())
    }
}
