//! Key/value coder used by the page store.
//!
//! The coder turns typed keys and values into page entry bytes and back. The
//! page format is supplied by the caller on every call and selects the layout:
//!
//! | Format      | Keys                      | Values                         |
//! |-------------|---------------------------|--------------------------------|
//! | `Legacy`    | absolute                  | legacy object codec            |
//! | `Sparse`    | absolute                  | `SelfEncodingValue`            |
//! | `DeltaKeys` | delta against base key    | `SelfEncodingValue`            |
//!
//! An empty byte string stands for an absent key or value in every format,
//! both when encoding and when decoding.
//!
//! The coder holds only construction-time state, so one instance can be shared
//! across threads with `Arc`.

use crate::config::Options;
use crate::error::{BoxError, Error, Result};
use crate::format::EncodingFormat;
use crate::key::OrderedKey;
use crate::value::{BincodeCodec, LegacyCodec, SelfEncodingValue, ValueFactory};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Encoding of an absent key or value.
const EMPTY: Bytes = Bytes::new();

/// Coder contract consumed by the page store.
///
/// `K` is the page key type and `V` the stored value type.
pub trait KeyCoder<K, V> {
    /// The reserved key below every key with a non-negative ordinal.
    fn negative_infinity(&self) -> K;

    /// Cached absolute encoding of [`KeyCoder::negative_infinity`].
    fn encoded_negative_infinity(&self) -> Bytes;

    /// Encodes a key in absolute form; `None` becomes empty bytes.
    fn encode_key(&self, key: Option<&K>) -> Bytes;

    /// Encodes a key for a page with the given base key and format.
    fn encode_key_in_page(&self, key: Option<&K>, base: &K, format: EncodingFormat)
        -> Result<Bytes>;

    /// Encodes a value for a page in the given format.
    fn encode_value(&self, value: Option<&V>, format: EncodingFormat) -> Result<Bytes>;

    /// Decodes an absolute key; empty bytes give `None`.
    fn decode_key(&self, bytes: &[u8]) -> Result<Option<K>>;

    /// Decodes a key stored in a page with the given base key and format.
    fn decode_key_in_page(&self, bytes: &[u8], base: &K, format: EncodingFormat)
        -> Result<Option<K>>;

    /// Decodes a value stored in a page in the given format.
    fn decode_value(&self, bytes: &[u8], format: EncodingFormat) -> Result<Option<V>>;

    /// Like [`KeyCoder::encode_key_in_page`] with the format given as its stored tag.
    fn encode_key_with_tag(&self, key: Option<&K>, base: &K, tag: u8) -> Result<Bytes> {
        self.encode_key_in_page(key, base, EncodingFormat::from_tag(tag)?)
    }

    /// Like [`KeyCoder::encode_value`] with the format given as its stored tag.
    fn encode_value_with_tag(&self, value: Option<&V>, tag: u8) -> Result<Bytes> {
        self.encode_value(value, EncodingFormat::from_tag(tag)?)
    }

    /// Like [`KeyCoder::decode_key_in_page`] with the format given as its stored tag.
    fn decode_key_with_tag(&self, bytes: &[u8], base: &K, tag: u8) -> Result<Option<K>> {
        self.decode_key_in_page(bytes, base, EncodingFormat::from_tag(tag)?)
    }

    /// Like [`KeyCoder::decode_value`] with the format given as its stored tag.
    fn decode_value_with_tag(&self, bytes: &[u8], tag: u8) -> Result<Option<V>> {
        self.decode_value(bytes, EncodingFormat::from_tag(tag)?)
    }
}

/// Coder for [`OrderedKey`] keys and self-encoding values.
///
/// # Example
///
/// ```rust
/// use pagekv::{EncodingFormat, KeyCoder, KeyValueCoder, OrderedKey, Options};
/// use pagekv::value::SelfEncodingValue;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
/// struct Count(u64);
///
/// impl SelfEncodingValue for Count {
///     fn to_bytes(&self, _version: u8) -> Result<Vec<u8>, pagekv::BoxError> {
///         Ok(self.0.to_be_bytes().to_vec())
///     }
///
///     fn populate_from_bytes(&mut self, bytes: &[u8], _version: u8) -> Result<(), pagekv::BoxError> {
///         self.0 = u64::from_be_bytes(bytes.try_into()?);
///         Ok(())
///     }
/// }
///
/// # fn main() -> Result<(), pagekv::Error> {
/// let coder = KeyValueCoder::<Count>::new(Options::default())?;
/// let base = OrderedKey::new(1000, Some(b"abc".to_vec()));
/// let key = OrderedKey::new(1007, Some(b"abd".to_vec()));
///
/// let bytes = coder.encode_key_in_page(Some(&key), &base, EncodingFormat::DeltaKeys)?;
/// assert_eq!(coder.decode_key_in_page(&bytes, &base, EncodingFormat::DeltaKeys)?, Some(key));
///
/// let bytes = coder.encode_value(Some(&Count(3)), EncodingFormat::Sparse)?;
/// assert_eq!(coder.decode_value(&bytes, EncodingFormat::Sparse)?, Some(Count(3)));
/// # Ok(())
/// # }
/// ```
pub struct KeyValueCoder<V> {
    legacy: Arc<dyn LegacyCodec<V>>,
    factory: ValueFactory<V>,
    negative_infinity: Bytes,
    options: Options,
}

impl<V> KeyValueCoder<V>
where
    V: SelfEncodingValue + Serialize + DeserializeOwned + Default + 'static,
{
    /// Creates a coder with the bincode legacy codec and a `Default` value factory.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the options are invalid.
    pub fn new(options: Options) -> Result<Self> {
        let legacy = BincodeCodec::<V>::with_limit(options.legacy_size_limit);
        Self::builder()
            .options(options)
            .legacy_codec(legacy)
            .factory(ValueFactory::from_default())
            .build()
    }
}

impl<V: SelfEncodingValue> KeyValueCoder<V> {
    /// Starts building a coder with a custom legacy codec or value factory.
    pub fn builder() -> CoderBuilder<V> {
        CoderBuilder::new()
    }

    /// Returns the options the coder was built with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Format suggested for newly created pages.
    pub fn default_format(&self) -> EncodingFormat {
        self.options.default_format
    }

    fn value_type() -> &'static str {
        std::any::type_name::<V>()
    }

    fn encoding_error(format: EncodingFormat, source: BoxError) -> Error {
        Error::Encoding { value_type: Self::value_type(), format, source }
    }

    fn decoding_error(format: EncodingFormat, source: BoxError) -> Error {
        Error::Decoding { value_type: Self::value_type(), format, source }
    }

    fn verify_delta(&self, encoded: &[u8], key: &OrderedKey, base: &OrderedKey) -> Result<()> {
        let decoded = OrderedKey::delta_decode(encoded, base)?;
        if &decoded != key {
            return Err(Error::malformed_key(format!(
                "delta key {} decoded as {} against base {}",
                key, decoded, base
            )));
        }
        Ok(())
    }

    fn check_legacy_size(&self, len: usize) -> std::result::Result<(), BoxError> {
        let limit = self.options.legacy_size_limit;
        if len as u64 > limit {
            return Err(format!("legacy value is {} bytes, limit is {}", len, limit).into());
        }
        Ok(())
    }
}

impl<V: SelfEncodingValue> KeyCoder<OrderedKey, V> for KeyValueCoder<V> {
    fn negative_infinity(&self) -> OrderedKey {
        OrderedKey::negative_infinity()
    }

    fn encoded_negative_infinity(&self) -> Bytes {
        self.negative_infinity.clone()
    }

    fn encode_key(&self, key: Option<&OrderedKey>) -> Bytes {
        match key {
            Some(key) => key.to_bytes(),
            None => EMPTY,
        }
    }

    fn encode_key_in_page(
        &self,
        key: Option<&OrderedKey>,
        base: &OrderedKey,
        format: EncodingFormat,
    ) -> Result<Bytes> {
        let Some(key) = key else {
            return Ok(EMPTY);
        };
        match format {
            EncodingFormat::Legacy | EncodingFormat::Sparse => Ok(key.to_bytes()),
            EncodingFormat::DeltaKeys => {
                let encoded = key.delta_encode(base);
                if self.options.verify_encoded_keys {
                    self.verify_delta(&encoded, key, base)?;
                }
                Ok(encoded)
            }
        }
    }

    fn encode_value(&self, value: Option<&V>, format: EncodingFormat) -> Result<Bytes> {
        let Some(value) = value else {
            return Ok(EMPTY);
        };
        let encoded = match format {
            EncodingFormat::Legacy => self.legacy.encode(value).and_then(|bytes| {
                self.check_legacy_size(bytes.len())?;
                Ok(bytes)
            }),
            EncodingFormat::Sparse | EncodingFormat::DeltaKeys => value.to_bytes(format.tag()),
        };
        encoded
            .map(Bytes::from)
            .map_err(|e| Self::encoding_error(format, e))
    }

    fn decode_key(&self, bytes: &[u8]) -> Result<Option<OrderedKey>> {
        if bytes.is_empty() {
            return Ok(None);
        }
        OrderedKey::from_bytes(bytes).map(Some).map_err(|e| {
            log::warn!("Failed to decode absolute key ({} bytes): {}", bytes.len(), e);
            e
        })
    }

    fn decode_key_in_page(
        &self,
        bytes: &[u8],
        base: &OrderedKey,
        format: EncodingFormat,
    ) -> Result<Option<OrderedKey>> {
        if bytes.is_empty() {
            return Ok(None);
        }
        let decoded = match format {
            EncodingFormat::Legacy | EncodingFormat::Sparse => OrderedKey::from_bytes(bytes),
            EncodingFormat::DeltaKeys => OrderedKey::delta_decode(bytes, base),
        };
        decoded.map(Some).map_err(|e| {
            log::warn!("Failed to decode {} key against base {}: {}", format, base, e);
            e
        })
    }

    fn decode_value(&self, bytes: &[u8], format: EncodingFormat) -> Result<Option<V>> {
        if bytes.is_empty() {
            return Ok(None);
        }
        let instance = self
            .factory
            .create()
            .map_err(|e| Self::decoding_error(format, e))?;
        let decoded = match format {
            EncodingFormat::Legacy => self
                .check_legacy_size(bytes.len())
                .and_then(|()| self.legacy.decode(instance, bytes)),
            EncodingFormat::Sparse | EncodingFormat::DeltaKeys => {
                let mut value = instance;
                value
                    .populate_from_bytes(bytes, format.tag())
                    .map(|()| value)
            }
        };
        decoded
            .map(Some)
            .map_err(|e| Self::decoding_error(format, e))
    }
}

impl<V> fmt::Debug for KeyValueCoder<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValueCoder")
            .field("legacy_codec", &self.legacy.name())
            .field("value_type", &std::any::type_name::<V>())
            .field("default_format", &self.options.default_format)
            .finish()
    }
}

/// Builder for [`KeyValueCoder`].
pub struct CoderBuilder<V> {
    options: Options,
    legacy: Option<Arc<dyn LegacyCodec<V>>>,
    factory: Option<ValueFactory<V>>,
}

impl<V: SelfEncodingValue> CoderBuilder<V> {
    fn new() -> Self {
        Self {
            options: Options::default(),
            legacy: None,
            factory: None,
        }
    }

    /// Sets the coder options.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Sets the codec used for `Legacy` values.
    pub fn legacy_codec(mut self, codec: impl LegacyCodec<V> + 'static) -> Self {
        self.legacy = Some(Arc::new(codec));
        self
    }

    /// Sets the factory that builds empty values for decoding.
    pub fn factory(mut self, factory: ValueFactory<V>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Builds the coder.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the options are invalid or the
    /// legacy codec or value factory was not set.
    pub fn build(self) -> Result<KeyValueCoder<V>> {
        self.options.validate()?;
        let legacy = self
            .legacy
            .ok_or_else(|| Error::invalid_argument("legacy codec not set"))?;
        let factory = self
            .factory
            .ok_or_else(|| Error::invalid_argument("value factory not set"))?;

        log::debug!(
            "Building key/value coder: value_type={}, legacy_codec={}, default_format={}",
            std::any::type_name::<V>(),
            legacy.name(),
            self.options.default_format
        );

        Ok(KeyValueCoder {
            legacy,
            factory,
            negative_infinity: OrderedKey::encoded_negative_infinity(),
            options: self.options,
        })
    }
}
