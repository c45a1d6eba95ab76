//! Error types for store operations.

use crate::types::{CollectionName, DocumentId};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Description of the transport failure.
        message: String,
    },

    /// No document exists at the given identity.
    #[error("document {id} not found in {collection}")]
    NotFound {
        /// The collection searched.
        collection: CollectionName,
        /// The missing document.
        id: DocumentId,
    },

    /// A document body could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] docadmin_codec::CodecError),

    /// A document body is not a map.
    #[error("document body must be a map, got {kind}")]
    InvalidDocument {
        /// Kind of the rejected value.
        kind: &'static str,
    },

    /// Any other backend failure.
    #[error("backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Returns true if this is a missing-document error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
