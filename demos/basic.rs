//! Basic usage example for PageKV
//!
//! This example demonstrates the fundamental operations:
//! - Building a coder
//! - Encoding a page's base key and its entries in every format
//! - Decoding them back using the format tag stored with the page

use pagekv::value::SelfEncodingValue;
use pagekv::{varint, BoxError, EncodingFormat, KeyCoder, KeyValueCoder, OrderedKey, Options};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Visits {
    count: u64,
}

impl SelfEncodingValue for Visits {
    fn to_bytes(&self, _format_version: u8) -> Result<Vec<u8>, BoxError> {
        let mut buf = Vec::new();
        varint::put_u64(&mut buf, self.count);
        Ok(buf)
    }

    fn populate_from_bytes(&mut self, bytes: &[u8], _format_version: u8) -> Result<(), BoxError> {
        let mut buf = bytes;
        self.count = varint::get_u64(&mut buf)?;
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    // Configure the coder
    let options = Options::default().verify_encoded_keys(true);
    let coder = KeyValueCoder::<Visits>::new(options)?;
    println!("New pages use {}", coder.default_format());

    let base = OrderedKey::new(1000, Some(b"user:alice".to_vec()));
    let entries = [
        (OrderedKey::new(1000, Some(b"user:alice".to_vec())), Some(Visits { count: 3 })),
        (OrderedKey::new(1004, Some(b"user:alina".to_vec())), Some(Visits { count: 250 })),
        (OrderedKey::from_ordinal(1010), None),
    ];

    for format in EncodingFormat::ALL {
        println!("Format {} (tag {})", format, format.tag());

        // Base key is always stored in absolute form
        let base_bytes = coder.encode_key(Some(&base));
        let base_read = coder.decode_key(&base_bytes)?.ok_or("base key missing")?;

        for (key, value) in &entries {
            let key_bytes = coder.encode_key_in_page(Some(key), &base, format)?;
            let value_bytes = coder.encode_value(value.as_ref(), format)?;

            let key_read = coder.decode_key_with_tag(&key_bytes, &base_read, format.tag())?;
            let value_read = coder.decode_value_with_tag(&value_bytes, format.tag())?;
            println!(
                "  {} => {:?} (key {} bytes, value {} bytes)",
                key,
                value_read,
                key_bytes.len(),
                value_bytes.len()
            );
            assert_eq!(key_read.as_ref(), Some(key));
            assert_eq!(&value_read, value);
        }
    }

    println!(
        "Negative infinity encodes to {:02x?}",
        &coder.encoded_negative_infinity()[..]
    );

    Ok(())
}
