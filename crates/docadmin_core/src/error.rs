//! Error types for DocAdmin core.

use crate::binder::BindErrors;
use docadmin_store::InvalidCollectionName;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in registry, descriptor and binding operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Value conversion error.
    #[error("codec error: {0}")]
    Codec(#[from] docadmin_codec::CodecError),

    /// Malformed collection identifier.
    #[error(transparent)]
    InvalidCollectionName(#[from] InvalidCollectionName),

    /// A descriptor is already registered for this collection.
    #[error("collection {collection} is already registered to {existing}, cannot register {attempted}")]
    DuplicateRegistration {
        /// The contested collection.
        collection: String,
        /// Type already registered.
        existing: &'static str,
        /// Type that tried to register.
        attempted: &'static str,
    },

    /// The registry has been frozen by first use.
    #[error("registry is frozen, cannot register {collection} after the admin started serving")]
    RegistryFrozen {
        /// The collection that arrived too late.
        collection: String,
    },

    /// The record type cannot be administered.
    #[error("unsupported record shape {type_name}: {message}")]
    UnsupportedShape {
        /// Rust type name of the shape.
        type_name: &'static str,
        /// Why it was rejected.
        message: String,
    },

    /// A persisted document cannot be loaded into its record shape.
    #[error("document in {collection} does not fit its record shape: {message}")]
    InvalidDocument {
        /// The collection the document came from.
        collection: String,
        /// Description of the mismatch.
        message: String,
    },

    /// One or more input fields failed to bind.
    #[error(transparent)]
    Binding(#[from] BindErrors),
}

impl CoreError {
    /// Creates an unsupported shape error.
    pub fn unsupported_shape(type_name: &'static str, message: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            type_name,
            message: message.into(),
        }
    }

    /// Creates an invalid document error.
    pub fn invalid_document(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors that belong to startup configuration.
    ///
    /// These are fatal for the embedding application: they mean the set of
    /// registered types is wrong, not that a request was bad.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidCollectionName(_)
                | CoreError::DuplicateRegistration { .. }
                | CoreError::RegistryFrozen { .. }
                | CoreError::UnsupportedShape { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docadmin_store::CollectionName;

    #[test]
    fn configuration_errors_are_classified() {
        let invalid = CoreError::from(CollectionName::parse("nodot").unwrap_err());
        assert!(invalid.is_configuration_error());

        let frozen = CoreError::RegistryFrozen {
            collection: "a.b".into(),
        };
        assert!(frozen.is_configuration_error());

        assert!(!CoreError::invalid_document("a.b", "bad").is_configuration_error());
    }

    #[test]
    fn duplicate_message_names_both_types() {
        let err = CoreError::DuplicateRegistration {
            collection: "db1.users".into(),
            existing: "app::User",
            attempted: "app::Account",
        };
        let msg = err.to_string();
        assert!(msg.contains("db1.users"));
        assert!(msg.contains("app::User"));
        assert!(msg.contains("app::Account"));
    }
}
