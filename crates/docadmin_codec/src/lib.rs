//! # DocAdmin Codec
//!
//! The dynamic value model shared by records, form input and persisted
//! documents, plus canonical CBOR encoding for storage.
//!
//! - [`Value`] is the schemaless value type
//! - [`to_value`] / [`from_value`] bridge any serde type to and from it
//! - [`to_canonical_cbor`] / [`from_cbor`] persist it deterministically
//!
//! ## Usage
//!
//! ```
//! use docadmin_codec::{from_cbor, to_canonical_cbor, Value};
//!
//! let doc = Value::map([("name", Value::from("Alice")), ("age", Value::from(30i64))]);
//! let bytes = to_canonical_cbor(&doc).unwrap();
//!
//! let decoded = from_cbor(&bytes).unwrap();
//! assert_eq!(decoded.get("name"), Some(&Value::from("Alice")));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bridge;
mod cbor;
mod error;
mod value;

pub use bridge::{from_value, to_value};
pub use cbor::{from_cbor, to_canonical_cbor};
pub use error::{CodecError, CodecResult};
pub use value::Value;
