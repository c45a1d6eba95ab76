//! Serde bridge between Rust types and [`Value`].
//!
//! Record shapes are plain serde types. They reach the dynamic value model
//! through `ciborium`'s value serializer, so any `Serialize +
//! DeserializeOwned` type can be inspected and rebuilt field by field.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use ciborium::value::{Integer, Value as CborValue};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes `value` into a dynamic [`Value`].
///
/// # Errors
///
/// Fails if the type serializes to something outside the document model,
/// such as a float or a map with non-text keys.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> CodecResult<Value> {
    let cbor = CborValue::serialized(value).map_err(|e| CodecError::serialize_failed(e.to_string()))?;
    from_cbor_value(cbor)
}

/// Deserializes a dynamic [`Value`] into `T`.
///
/// # Errors
///
/// Fails if the value does not have the shape `T` expects.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> CodecResult<T> {
    to_cbor_value(value)
        .deserialized()
        .map_err(|e| CodecError::deserialize_failed(e.to_string()))
}

/// Converts a [`Value`] into a `ciborium` value.
pub(crate) fn to_cbor_value(value: &Value) -> CborValue {
    match value {
        Value::Null => CborValue::Null,
        Value::Bool(b) => CborValue::Bool(*b),
        Value::Integer(n) => CborValue::Integer(Integer::from(*n)),
        Value::Bytes(b) => CborValue::Bytes(b.clone()),
        Value::Text(s) => CborValue::Text(s.clone()),
        Value::Array(items) => CborValue::Array(items.iter().map(to_cbor_value).collect()),
        Value::Map(pairs) => CborValue::Map(
            pairs
                .iter()
                .map(|(k, v)| (CborValue::Text(k.clone()), to_cbor_value(v)))
                .collect(),
        ),
    }
}

/// Converts a `ciborium` value into a [`Value`].
pub(crate) fn from_cbor_value(value: CborValue) -> CodecResult<Value> {
    match value {
        CborValue::Null => Ok(Value::Null),
        CborValue::Bool(b) => Ok(Value::Bool(b)),
        CborValue::Integer(n) => i64::try_from(n)
            .map(Value::Integer)
            .map_err(|_| CodecError::IntegerOverflow),
        CborValue::Bytes(b) => Ok(Value::Bytes(b)),
        CborValue::Text(s) => Ok(Value::Text(s)),
        CborValue::Float(_) => Err(CodecError::FloatForbidden),
        // Tags carry no meaning in the document model
        CborValue::Tag(_, inner) => from_cbor_value(*inner),
        CborValue::Array(items) => items
            .into_iter()
            .map(from_cbor_value)
            .collect::<CodecResult<Vec<_>>>()
            .map(Value::Array),
        CborValue::Map(pairs) => pairs
            .into_iter()
            .map(|(k, v)| match k {
                CborValue::Text(key) => Ok((key, from_cbor_value(v)?)),
                _ => Err(CodecError::NonTextKey),
            })
            .collect::<CodecResult<Vec<_>>>()
            .map(Value::Map),
        _ => Err(CodecError::unsupported_type("unknown")),
    }
}
