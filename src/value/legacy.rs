//! Legacy object codec for `Legacy` pages.
//!
//! Pages written before values could encode themselves store values through a
//! general-purpose object marshaller. The coder only relies on the
//! [`LegacyCodec`] contract; [`BincodeCodec`] provides it on top of serde.

use crate::error::BoxError;
use bincode::Options as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Default upper bound on a legacy-encoded value (64MB).
pub const DEFAULT_LEGACY_SIZE_LIMIT: u64 = 64 * 1024 * 1024;

/// General-purpose object codec used for `Legacy` values.
pub trait LegacyCodec<V>: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Marshals a value. Absent values never reach the codec.
    fn encode(&self, value: &V) -> Result<Vec<u8>, BoxError>;

    /// Unmarshals `bytes`, starting from the freshly constructed `instance`.
    ///
    /// Codecs that fill objects in place populate `instance`; codecs that
    /// build their own object may discard it. `bytes` is never empty.
    fn decode(&self, instance: V, bytes: &[u8]) -> Result<V, BoxError>;
}

/// Bincode-backed legacy codec.
///
/// Layout is bincode 1.x with fixed-width little-endian integers applied to
/// `V` itself. Absent values are handled by the coder as empty bytes.
pub struct BincodeCodec<V> {
    limit: u64,
    _marker: PhantomData<fn() -> V>,
}

impl<V> BincodeCodec<V> {
    /// Creates a codec with the default size limit.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LEGACY_SIZE_LIMIT)
    }

    /// Creates a codec that rejects values larger than `limit` bytes.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit,
            _marker: PhantomData,
        }
    }

    /// Returns the size limit.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    fn options(&self) -> impl bincode::Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .with_limit(self.limit)
    }
}

impl<V> Default for BincodeCodec<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LegacyCodec<V> for BincodeCodec<V>
where
    V: Serialize + DeserializeOwned,
{
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode(&self, value: &V) -> Result<Vec<u8>, BoxError> {
        Ok(self.options().serialize(value)?)
    }

    fn decode(&self, _instance: V, bytes: &[u8]) -> Result<V, BoxError> {
        Ok(self.options().deserialize(bytes)?)
    }
}
