//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while converting, encoding or decoding values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a value to CBOR.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode CBOR bytes.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// A Rust value could not be serialized into a [`crate::Value`].
    #[error("serialization failed: {message}")]
    SerializeFailed {
        /// Description of the serializer error.
        message: String,
    },

    /// A [`crate::Value`] could not be deserialized into a Rust value.
    #[error("deserialization failed: {message}")]
    DeserializeFailed {
        /// Description of the deserializer error.
        message: String,
    },

    /// Float values are not part of the document model.
    #[error("float values are not supported")]
    FloatForbidden,

    /// Map keys must be text.
    #[error("map keys must be text")]
    NonTextKey,

    /// Integer does not fit in an `i64`.
    #[error("integer overflow")]
    IntegerOverflow,

    /// Unsupported CBOR type.
    #[error("unsupported CBOR type: {type_name}")]
    UnsupportedType {
        /// Name of the unsupported type.
        type_name: String,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }

    /// Create a serialization failed error.
    pub fn serialize_failed(message: impl Into<String>) -> Self {
        Self::SerializeFailed {
            message: message.into(),
        }
    }

    /// Create a deserialization failed error.
    pub fn deserialize_failed(message: impl Into<String>) -> Self {
        Self::DeserializeFailed {
            message: message.into(),
        }
    }

    /// Create an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }
}
