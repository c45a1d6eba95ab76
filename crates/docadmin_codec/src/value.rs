//! Dynamic document value type.

use std::cmp::Ordering;
use std::fmt;

/// A dynamic document value.
///
/// Every record, submitted form and persisted document passes through this
/// type. Floats are intentionally not supported, matching the canonical
/// CBOR rules used for persistence.
///
/// Map entries keep their insertion order so that field order follows the
/// declaration order of the record they came from. Canonical ordering is
/// only applied when encoding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Null value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (full i64 range).
    Integer(i64),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Text string (UTF-8).
    Text(String),
    /// Array of values.
    Array(Vec<Value>),
    /// Map of text keys to values, in insertion order.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Creates a map value from key/value pairs, keeping their order.
    pub fn map<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Creates an empty map value.
    pub fn empty_map() -> Self {
        Value::Map(Vec::new())
    }

    /// Short name of this value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is an `Integer`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the bytes, if this is `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the text, if this is `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items, if this is an `Array`.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the entries, if this is a `Map`.
    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the value stored under `key`, if this is a map holding it.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Sets `key` in this map value, returning the previous value.
    ///
    /// Existing keys keep their position; new keys are appended. Does
    /// nothing on non-map values.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let Value::Map(pairs) = self else {
            return None;
        };
        let key = key.into();
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                pairs.push((key, value));
                None
            }
        }
    }

    /// Removes `key` from this map value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let Value::Map(pairs) = self else {
            return None;
        };
        let pos = pairs.iter().position(|(k, _)| k == key)?;
        Some(pairs.remove(pos).1)
    }

    /// Compares two map keys by their canonical CBOR encoding.
    ///
    /// Text keys encode with a length header first, so canonical order is
    /// length-first, then bytewise.
    pub fn cmp_canonical_keys(a: &str, b: &str) -> Ordering {
        match a.len().cmp(&b.len()) {
            Ordering::Equal => a.as_bytes().cmp(b.as_bytes()),
            ord => ord,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Bytes(b) => {
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Value::Text(s) => f.write_str(s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_insertion_order() {
        let map = Value::map([
            ("z", Value::Integer(1)),
            ("a", Value::Integer(2)),
            ("m", Value::Integer(3)),
        ]);

        let keys: Vec<_> = map.as_map().unwrap().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn canonical_key_order_is_length_first() {
        let mut keys = vec!["abc", "b", "ab", "a"];
        keys.sort_by(|a, b| Value::cmp_canonical_keys(a, b));
        assert_eq!(keys, ["a", "b", "ab", "abc"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map = Value::map([("name", Value::from("Bob")), ("age", Value::from(30i64))]);

        let previous = map.insert("name", Value::from("Alice"));
        assert_eq!(previous, Some(Value::from("Bob")));
        assert_eq!(map.as_map().unwrap()[0].0, "name");

        assert_eq!(map.insert("email", Value::from("a@b.c")), None);
        assert_eq!(map.as_map().unwrap().len(), 3);
    }

    #[test]
    fn insert_on_scalar_is_noop() {
        let mut value = Value::Integer(1);
        assert_eq!(value.insert("x", Value::Null), None);
        assert_eq!(value, Value::Integer(1));
    }

    #[test]
    fn remove_key() {
        let mut map = Value::map([("a", Value::Integer(1)), ("b", Value::Integer(2))]);
        assert_eq!(map.remove("a"), Some(Value::Integer(1)));
        assert_eq!(map.remove("a"), None);
        assert_eq!(map.get("b"), Some(&Value::Integer(2)));
    }

    #[test]
    fn value_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(42).as_bool(), None);
        assert_eq!(Value::Integer(42).as_integer(), Some(42));
        assert_eq!(Value::Text("42".into()).as_integer(), None);
        assert_eq!(Value::Text("hello".into()).as_text(), Some("hello"));
        assert_eq!(Value::Bytes(vec![1, 2, 3]).as_bytes(), Some(&[1, 2, 3][..]));
        assert_eq!(Value::Array(vec![]).kind_name(), "array");
    }

    #[test]
    fn display_renders_plain_text() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from("Alice").to_string(), "Alice");
        assert_eq!(Value::from(vec![Value::from(1i64), Value::from(2i64)]).to_string(), "[1, 2]");
        assert_eq!(Value::Bytes(vec![0xab, 0x01]).to_string(), "ab01");
        assert_eq!(
            Value::map([("k", Value::from(true))]).to_string(),
            "{k: true}"
        );
    }

    #[test]
    fn from_impls() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i32), Value::Integer(42));
        assert_eq!(Value::from(42u32), Value::Integer(42));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
        assert_eq!(Value::from(()), Value::Null);
    }
}
