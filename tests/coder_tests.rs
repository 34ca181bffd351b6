// Key/Value Coder Tests for PageKV
// These tests exercise the coder the way the page store drives it

use pagekv::value::SelfEncodingValue;
use pagekv::{
    varint, BincodeCodec, BoxError, EncodingFormat, Error, KeyCoder, KeyValueCoder, OrderedKey,
    Options, ValueFactory,
};
use serde::{Deserialize, Serialize};

/// Visit counter stored per key; the byte layout depends on the page format.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Counter {
    hits: u64,
    label: String,
}

impl SelfEncodingValue for Counter {
    fn to_bytes(&self, format_version: u8) -> Result<Vec<u8>, BoxError> {
        let mut buf = Vec::new();
        match format_version {
            1 => buf.extend_from_slice(&self.hits.to_le_bytes()),
            2 => varint::put_u64(&mut buf, self.hits),
            v => return Err(format!("unknown counter version {}", v).into()),
        }
        buf.extend_from_slice(self.label.as_bytes());
        Ok(buf)
    }

    fn populate_from_bytes(&mut self, bytes: &[u8], format_version: u8) -> Result<(), BoxError> {
        let mut buf = bytes;
        self.hits = match format_version {
            1 => {
                if buf.len() < 8 {
                    return Err("counter too short".into());
                }
                let (head, rest) = buf.split_at(8);
                buf = rest;
                u64::from_le_bytes(head.try_into()?)
            }
            2 => varint::get_u64(&mut buf)?,
            v => return Err(format!("unknown counter version {}", v).into()),
        };
        self.label = String::from_utf8(buf.to_vec())?;
        Ok(())
    }
}

fn coder() -> KeyValueCoder<Counter> {
    KeyValueCoder::new(Options::default()).unwrap()
}

fn coder_with_limit(limit: u64) -> KeyValueCoder<Counter> {
    KeyValueCoder::new(Options::new().legacy_size_limit(limit)).unwrap()
}

fn key(ordinal: i64, raw: &str) -> OrderedKey {
    OrderedKey::new(ordinal, Some(raw.as_bytes().to_vec()))
}

/// Sibling key delta-encoded against the page base key
#[test]
fn test_sibling_key_delta_scenario() {
    let coder = coder();
    let base = key(1000, "abc");
    let sibling = key(1007, "abd");

    let absolute = coder.encode_key(Some(&base));
    assert_eq!(coder.decode_key(&absolute).unwrap(), Some(base.clone()));

    let delta = coder
        .encode_key_in_page(Some(&sibling), &base, EncodingFormat::DeltaKeys)
        .unwrap();
    assert!(delta.len() < sibling.to_bytes().len());
    assert_eq!(
        coder
            .decode_key_in_page(&delta, &base, EncodingFormat::DeltaKeys)
            .unwrap(),
        Some(sibling)
    );
}

/// Absent keys encode to empty bytes and come back absent in every format
#[test]
fn test_absent_key_scenario() {
    let coder = coder();
    let base = key(1000, "abc");

    let bytes = coder
        .encode_key_in_page(None, &base, EncodingFormat::DeltaKeys)
        .unwrap();
    assert!(bytes.is_empty());
    assert_eq!(
        coder
            .decode_key_in_page(&[], &base, EncodingFormat::DeltaKeys)
            .unwrap(),
        None
    );

    for format in EncodingFormat::ALL {
        let bytes = coder.encode_key_in_page(None, &base, format).unwrap();
        assert_eq!(coder.decode_key_in_page(&bytes, &base, format).unwrap(), None);
    }
    assert_eq!(coder.decode_key(&coder.encode_key(None)).unwrap(), None);
}

/// Keys round trip in every format, including keys below the base
#[test]
fn test_key_roundtrip_every_format() {
    let coder = coder();
    let base = key(500, "m");
    let keys = [
        key(500, "m"),
        key(499, "a"),
        key(-7, "negative"),
        OrderedKey::from_ordinal(500),
        OrderedKey::from_ordinal(i64::MAX),
        key(i64::MIN, ""),
    ];

    for format in EncodingFormat::ALL {
        for k in &keys {
            let bytes = coder.encode_key_in_page(Some(k), &base, format).unwrap();
            let decoded = coder.decode_key_in_page(&bytes, &base, format).unwrap();
            assert_eq!(decoded.as_ref(), Some(k), "format {} key {}", format, k);
        }
    }
}

/// Values round trip in every format
#[test]
fn test_value_roundtrip_every_format() {
    let coder = coder();
    let value = Counter { hits: 300, label: "home".to_string() };

    for format in EncodingFormat::ALL {
        let bytes = coder.encode_value(Some(&value), format).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(coder.decode_value(&bytes, format).unwrap(), Some(value.clone()));
    }
}

/// Format tag is passed to the value as its version
#[test]
fn test_value_layout_tracks_format() {
    let coder = coder();
    let value = Counter { hits: 5, label: String::new() };

    let sparse = coder.encode_value(Some(&value), EncodingFormat::Sparse).unwrap();
    let delta = coder.encode_value(Some(&value), EncodingFormat::DeltaKeys).unwrap();
    assert_eq!(&sparse[..], &[5, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(&delta[..], &[5]);
}

/// Absent values are empty bytes in every format, Legacy included
#[test]
fn test_absent_value() {
    let coder = coder();
    for format in EncodingFormat::ALL {
        let bytes = coder.encode_value(None, format).unwrap();
        assert!(bytes.is_empty(), "format {}", format);
        assert_eq!(coder.decode_value(&bytes, format).unwrap(), None);
        assert_eq!(coder.decode_value_with_tag(&[], format.tag()).unwrap(), None);
    }
}

/// Legacy pages read empty value slots as absent, even with a failing factory
#[test]
fn test_legacy_empty_slot_is_absent() {
    let coder = KeyValueCoder::<Counter>::builder()
        .legacy_codec(BincodeCodec::new())
        .factory(ValueFactory::new(|| Err("no instances".into())))
        .build()
        .unwrap();

    assert!(coder.encode_value(None, EncodingFormat::Legacy).unwrap().is_empty());
    assert_eq!(coder.decode_value(&[], EncodingFormat::Legacy).unwrap(), None);
}

/// Negative infinity bytes are stable and match the sentinel key
#[test]
fn test_negative_infinity_stability() {
    let coder = coder();
    let first = coder.encoded_negative_infinity();
    for _ in 0..10 {
        assert_eq!(coder.encoded_negative_infinity(), first);
    }
    assert_eq!(first, coder.negative_infinity().to_bytes());

    // Shared across coders
    let other = KeyValueCoder::<Counter>::new(Options::new().default_format(EncodingFormat::Sparse))
        .unwrap();
    assert_eq!(other.encoded_negative_infinity(), first);

    // Below every key with a non-negative ordinal
    assert!(first < coder.encode_key(Some(&key(0, ""))));
    assert!(first < coder.encode_key(Some(&OrderedKey::from_ordinal(1))));

    // Negative ordinals sort below the sentinel
    assert!(coder.encode_key(Some(&key(-1, "zzz"))) < first);
    assert!(key(-1, "zzz") < coder.negative_infinity());
}

/// Unrecognized format tags fail at every dispatch point
#[test]
fn test_unsupported_format_tags() {
    let coder = coder();
    let base = key(1, "a");
    let value = Counter::default();

    for tag in [3u8, 4, 127, 255] {
        assert!(matches!(
            coder.encode_key_with_tag(Some(&base), &base, tag),
            Err(Error::UnsupportedFormat(t)) if t == tag
        ));
        assert!(coder.decode_key_with_tag(&[1], &base, tag).unwrap_err().is_unsupported_format());
        assert!(coder.encode_value_with_tag(Some(&value), tag).unwrap_err().is_unsupported_format());
        assert!(coder.decode_value_with_tag(&[1], tag).unwrap_err().is_unsupported_format());
    }

    for format in EncodingFormat::ALL {
        let bytes = coder.encode_value_with_tag(Some(&value), format.tag()).unwrap();
        assert_eq!(coder.decode_value_with_tag(&bytes, format.tag()).unwrap(), Some(value.clone()));
    }
}

/// Corrupt key bytes surface as MalformedKey instead of a default key
#[test]
fn test_malformed_keys_propagate() {
    let coder = coder();
    let base = key(10, "ab");

    assert!(coder.decode_key(&[0x80, 0, 0]).unwrap_err().is_malformed_key());
    assert!(coder
        .decode_key_in_page(&[0x80, 0, 0], &base, EncodingFormat::Sparse)
        .unwrap_err()
        .is_malformed_key());
    assert!(coder
        .decode_key_in_page(&[0xff], &base, EncodingFormat::DeltaKeys)
        .unwrap_err()
        .is_malformed_key());
    assert!(coder
        .decode_key_in_page(&[0, 0x01, 0x09], &base, EncodingFormat::DeltaKeys)
        .unwrap_err()
        .is_malformed_key());
}

/// Delta bytes decoded against the wrong base give a different key
#[test]
fn test_delta_depends_on_base() {
    let coder = coder();
    let base = key(100, "abc");
    let k = key(105, "abz");
    let bytes = coder
        .encode_key_in_page(Some(&k), &base, EncodingFormat::DeltaKeys)
        .unwrap();

    let other_base = key(200, "xyz");
    let decoded = coder
        .decode_key_in_page(&bytes, &other_base, EncodingFormat::DeltaKeys)
        .unwrap()
        .unwrap();
    assert_ne!(decoded, k);
    assert_eq!(decoded.ordinal(), 205);
}

/// Value errors are wrapped with the value type and format
#[test]
fn test_value_errors_are_wrapped() {
    let coder = coder();

    let err = coder.decode_value(&[1, 2, 3], EncodingFormat::Sparse).unwrap_err();
    match err {
        Error::Decoding { value_type, format, .. } => {
            assert!(value_type.contains("Counter"));
            assert_eq!(format, EncodingFormat::Sparse);
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = coder.decode_value(&[0xff, 0xff], EncodingFormat::DeltaKeys).unwrap_err();
    assert!(matches!(err, Error::Decoding { format: EncodingFormat::DeltaKeys, .. }));

    // Legacy bytes must come from the legacy codec
    let err = coder.decode_value(&[1], EncodingFormat::Legacy).unwrap_err();
    assert!(matches!(err, Error::Decoding { format: EncodingFormat::Legacy, .. }));
}

/// Legacy size limit applies to encoded values
#[test]
fn test_legacy_size_limit() {
    let coder = KeyValueCoder::<Counter>::new(Options::new().legacy_size_limit(16)).unwrap();
    let big = Counter { hits: 1, label: "x".repeat(64) };

    let err = coder.encode_value(Some(&big), EncodingFormat::Legacy).unwrap_err();
    assert!(matches!(err, Error::Encoding { format: EncodingFormat::Legacy, .. }));

    // The limit does not apply to self-encoding formats
    assert!(coder.encode_value(Some(&big), EncodingFormat::Sparse).is_ok());
}

/// Legacy size limit holds for a builder-supplied codec, both ways
#[test]
fn test_legacy_size_limit_with_builder_codec() {
    let coder = KeyValueCoder::<Counter>::builder()
        .legacy_codec(BincodeCodec::new())
        .factory(ValueFactory::from_default())
        .options(Options::new().legacy_size_limit(1))
        .build()
        .unwrap();

    let err = coder
        .encode_value(Some(&Counter::default()), EncodingFormat::Legacy)
        .unwrap_err();
    assert!(matches!(err, Error::Encoding { format: EncodingFormat::Legacy, .. }));

    let roomy = coder_with_limit(1024);
    let bytes = roomy
        .encode_value(Some(&Counter { hits: 7, label: "ok".into() }), EncodingFormat::Legacy)
        .unwrap();
    assert!(bytes.len() > 1);
    let err = coder.decode_value(&bytes, EncodingFormat::Legacy).unwrap_err();
    assert!(matches!(err, Error::Decoding { format: EncodingFormat::Legacy, .. }));
    assert_eq!(
        roomy.decode_value(&bytes, EncodingFormat::Legacy).unwrap(),
        Some(Counter { hits: 7, label: "ok".into() })
    );
}

/// Custom factories seed the instance handed to values
#[test]
fn test_custom_factory() {
    let coder = KeyValueCoder::<Counter>::builder()
        .legacy_codec(BincodeCodec::new())
        .factory(ValueFactory::new(|| {
            Ok(Counter { hits: 0, label: "unset".to_string() })
        }))
        .options(Options::new().default_format(EncodingFormat::Sparse))
        .build()
        .unwrap();

    assert_eq!(coder.default_format(), EncodingFormat::Sparse);
    let bytes = coder
        .encode_value(Some(&Counter { hits: 2, label: "set".into() }), EncodingFormat::Sparse)
        .unwrap();
    assert_eq!(
        coder.decode_value(&bytes, EncodingFormat::Sparse).unwrap(),
        Some(Counter { hits: 2, label: "set".into() })
    );
}
