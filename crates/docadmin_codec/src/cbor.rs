//! Canonical CBOR encoding of documents.
//!
//! Persisted documents are stored as canonical CBOR:
//! - Map keys are sorted by their encoded form (length-first, then bytewise)
//! - Integers use the shortest encoding
//! - No indefinite-length items
//! - No floats

use crate::bridge::{from_cbor_value, to_cbor_value};
use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use ciborium::value::Value as CborValue;

/// Encodes a value to canonical CBOR bytes.
///
/// Identical values produce identical bytes regardless of the insertion
/// order of their map entries.
///
/// # Errors
///
/// Returns an error if the underlying writer fails.
pub fn to_canonical_cbor(value: &Value) -> CodecResult<Vec<u8>> {
    let canonical = canonicalize(to_cbor_value(value));
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&canonical, &mut bytes)
        .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    Ok(bytes)
}

/// Decodes a value from CBOR bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid CBOR, contain floats or
/// non-text map keys, or carry trailing data.
pub fn from_cbor(bytes: &[u8]) -> CodecResult<Value> {
    let mut reader = bytes;
    let value: CborValue = ciborium::de::from_reader(&mut reader)
        .map_err(|e| CodecError::decoding_failed(e.to_string()))?;
    if !reader.is_empty() {
        return Err(CodecError::decoding_failed(format!(
            "{} trailing bytes after document",
            reader.len()
        )));
    }
    from_cbor_value(value)
}

fn canonicalize(value: CborValue) -> CborValue {
    match value {
        CborValue::Array(items) => CborValue::Array(items.into_iter().map(canonicalize).collect()),
        CborValue::Map(pairs) => {
            let mut pairs: Vec<_> = pairs
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            pairs.sort_by(|(a, _), (b, _)| match (a.as_text(), b.as_text()) {
                (Some(a), Some(b)) => Value::cmp_canonical_keys(a, b),
                _ => std::cmp::Ordering::Equal,
            });
            CborValue::Map(pairs)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_integer_uses_one_byte() {
        assert_eq!(to_canonical_cbor(&Value::Integer(10)).unwrap(), vec![0x0a]);
        assert_eq!(to_canonical_cbor(&Value::Integer(-1)).unwrap(), vec![0x20]);
    }

    #[test]
    fn map_encoding_ignores_insertion_order() {
        let a = Value::map([("name", Value::from("Bob")), ("age", Value::from(30i64))]);
        let b = Value::map([("age", Value::from(30i64)), ("name", Value::from("Bob"))]);
        assert_eq!(to_canonical_cbor(&a).unwrap(), to_canonical_cbor(&b).unwrap());
    }

    #[test]
    fn decoded_map_is_in_canonical_order() {
        let doc = Value::map([
            ("title", Value::from("x")),
            ("id", Value::from(1i64)),
            ("a", Value::Bool(true)),
        ]);
        let decoded = from_cbor(&to_canonical_cbor(&doc).unwrap()).unwrap();

        let keys: Vec<_> = decoded.as_map().unwrap().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a", "id", "title"]);
    }

    #[test]
    fn nested_document_survives_storage() {
        let doc = Value::map([
            ("name", Value::from("Alice")),
            ("tags", Value::Array(vec![Value::from("a"), Value::from("b")])),
            ("address", Value::map([("city", Value::from("Oslo"))])),
            ("avatar", Value::Bytes(vec![1, 2, 3])),
            ("nickname", Value::Null),
        ]);
        let decoded = from_cbor(&to_canonical_cbor(&doc).unwrap()).unwrap();

        assert_eq!(decoded.get("address").and_then(|a| a.get("city")), Some(&Value::from("Oslo")));
        assert_eq!(decoded.get("avatar"), Some(&Value::Bytes(vec![1, 2, 3])));
        assert_eq!(decoded.get("nickname"), Some(&Value::Null));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = to_canonical_cbor(&Value::Integer(1)).unwrap();
        bytes.push(0x00);
        assert!(matches!(from_cbor(&bytes), Err(CodecError::DecodingFailed { .. })));
    }

    #[test]
    fn float_is_rejected_on_decode() {
        // 0xf9 3c00 is the half-precision float 1.0
        let bytes = [0xf9, 0x3c, 0x00];
        assert_eq!(from_cbor(&bytes), Err(CodecError::FloatForbidden));
    }

    #[test]
    fn truncated_input_fails() {
        assert!(from_cbor(&[0x62, b'a']).is_err());
        assert!(from_cbor(&[]).is_err());
    }
}
