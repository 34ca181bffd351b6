//! # PageKV - Key/Value Serialization for a Page-Organized Store
//!
//! PageKV defines the bytes a sorted, page-organized key-value store writes
//! for each entry. Pages are homogeneous in format, and the page store passes
//! that format to every encode and decode call.
//!
//! ## Architecture
//!
//! - **OrderedKey**: composite `(ordinal, raw)` key with an order-preserving
//!   absolute encoding and a delta encoding against a page base key
//! - **EncodingFormat**: `Legacy`, `Sparse` or `DeltaKeys`, with stable tags
//! - **SelfEncodingValue**: values that serialize themselves per format version
//! - **LegacyCodec**: general-purpose object codec for `Legacy` pages (bincode)
//! - **KeyValueCoder**: the [`KeyCoder`] implementation the page store calls
//!
//! ## Example Usage
//!
//! ```rust
//! use pagekv::{BoxError, EncodingFormat, KeyCoder, KeyValueCoder, OrderedKey, Options};
//! use pagekv::value::SelfEncodingValue;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
//! struct Hits(u32);
//!
//! impl SelfEncodingValue for Hits {
//!     fn to_bytes(&self, _version: u8) -> Result<Vec<u8>, BoxError> {
//!         Ok(self.0.to_le_bytes().to_vec())
//!     }
//!
//!     fn populate_from_bytes(&mut self, bytes: &[u8], _version: u8) -> Result<(), BoxError> {
//!         self.0 = u32::from_le_bytes(bytes.try_into()?);
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), pagekv::Error> {
//! let coder = KeyValueCoder::<Hits>::new(Options::default())?;
//! let base = coder.negative_infinity();
//! let format = coder.default_format();
//!
//! let key = OrderedKey::new(17, Some(b"page".to_vec()));
//! let key_bytes = coder.encode_key_in_page(Some(&key), &base, format)?;
//! let value_bytes = coder.encode_value(Some(&Hits(5)), format)?;
//!
//! assert_eq!(coder.decode_key_in_page(&key_bytes, &base, format)?, Some(key));
//! assert_eq!(coder.decode_value(&value_bytes, format)?, Some(Hits(5)));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod coder;
pub mod config;
pub mod error;
pub mod format;
pub mod key;
pub mod value;
pub mod varint;

// Re-exports
pub use coder::{CoderBuilder, KeyCoder, KeyValueCoder};
pub use config::Options;
pub use error::{BoxError, Error, Result};
pub use format::EncodingFormat;
pub use key::OrderedKey;
pub use value::{BincodeCodec, LegacyCodec, SelfEncodingValue, ValueFactory};
