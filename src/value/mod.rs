//! Value serialization contracts.
//!
//! Values reach page bytes through one of two paths:
//!
//! - **Self-encoding** (`Sparse`, `DeltaKeys`): the value type implements
//!   [`SelfEncodingValue`] and owns its byte layout, versioned by the page
//!   format tag.
//! - **Legacy** (`Legacy`): a general-purpose object codec implementing
//!   [`LegacyCodec`] marshals the value. [`BincodeCodec`] is the default.
//!
//! Decoding always starts from a fresh instance built by a [`ValueFactory`].

pub mod legacy;

pub use legacy::{BincodeCodec, LegacyCodec};

use crate::error::BoxError;
use std::fmt;
use std::sync::Arc;

/// A value type that serializes itself for `Sparse` and `DeltaKeys` pages.
///
/// `format_version` is the page format tag (see
/// [`EncodingFormat::tag`](crate::EncodingFormat::tag)), which lets a value
/// change its layout together with page format upgrades.
pub trait SelfEncodingValue {
    /// Serializes the value.
    fn to_bytes(&self, format_version: u8) -> Result<Vec<u8>, BoxError>;

    /// Fills a freshly constructed value from bytes written by `to_bytes`
    /// with the same `format_version`.
    fn populate_from_bytes(&mut self, bytes: &[u8], format_version: u8) -> Result<(), BoxError>;
}

type FactoryFn<V> = dyn Fn() -> Result<V, BoxError> + Send + Sync;

/// Builds empty value instances for the decode path.
pub struct ValueFactory<V> {
    make: Arc<FactoryFn<V>>,
}

impl<V> ValueFactory<V> {
    /// Creates a factory from a fallible constructor.
    pub fn new<F>(make: F) -> Self
    where
        F: Fn() -> Result<V, BoxError> + Send + Sync + 'static,
    {
        Self { make: Arc::new(make) }
    }

    /// Builds one empty instance.
    pub fn create(&self) -> Result<V, BoxError> {
        (self.make)()
    }
}

impl<V: Default> ValueFactory<V> {
    /// Creates a factory that uses `V::default()`.
    pub fn from_default() -> Self {
        Self::new(|| Ok(V::default()))
    }
}

impl<V> Clone for ValueFactory<V> {
    fn clone(&self) -> Self {
        Self { make: Arc::clone(&self.make) }
    }
}

impl<V> fmt::Debug for ValueFactory<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueFactory")
            .field("value_type", &std::any::type_name::<V>())
            .finish()
    }
}
