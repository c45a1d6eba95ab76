//! Error types for the admin engine.

use docadmin_core::{BindErrors, CoreError};
use docadmin_store::{CollectionName, DocumentId, StoreError};
use thiserror::Error;

/// Result type for admin operations.
pub type AdminResult<T> = Result<T, AdminError>;

/// Errors that can occur while serving the admin.
#[derive(Error, Debug)]
pub enum AdminError {
    /// The authorizer rejected the request.
    #[error("not authorized")]
    Unauthorized,

    /// An admin token was presented but is not valid.
    #[error("invalid admin token: {reason}")]
    InvalidToken {
        /// Why the token was rejected.
        reason: &'static str,
    },

    /// The admin is missing a required collaborator.
    #[error("admin misconfigured: {message}")]
    Misconfigured {
        /// What is missing.
        message: String,
    },

    /// No route matches the request path.
    #[error("no admin route for path: {path}")]
    RouteNotFound {
        /// The request path.
        path: String,
    },

    /// The collection identifier is not registered.
    #[error("collection not registered: {collection}")]
    CollectionNotFound {
        /// The requested identifier.
        collection: String,
    },

    /// The document does not exist in the collection.
    #[error("document {id} not found in {collection}")]
    DocumentNotFound {
        /// Collection searched.
        collection: String,
        /// Requested document.
        id: DocumentId,
    },

    /// Malformed request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The action does not accept the request method.
    #[error("method {method} not allowed for {path}")]
    MethodNotAllowed {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
    },

    /// Submitted fields could not be bound to the record shape.
    #[error("{collection}: {errors}")]
    Binding {
        /// Collection being written.
        collection: String,
        /// Per-field failures.
        errors: BindErrors,
    },

    /// Store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Registry or record failure.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Invalid admin configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong.
        message: String,
    },
}

impl AdminError {
    /// Creates a misconfiguration error.
    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::Misconfigured {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a document not found error.
    pub fn document_not_found(collection: &CollectionName, id: DocumentId) -> Self {
        Self::DocumentNotFound {
            collection: collection.to_string(),
            id,
        }
    }

    /// Maps a binding failure in `collection` to [`AdminError::Binding`].
    ///
    /// Other core errors are wrapped unchanged.
    pub fn from_binding(collection: &CollectionName, err: CoreError) -> Self {
        match err {
            CoreError::Binding(errors) => Self::Binding {
                collection: collection.to_string(),
                errors,
            },
            other => Self::Core(other),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            AdminError::Unauthorized | AdminError::InvalidToken { .. } => 401,
            AdminError::RouteNotFound { .. }
            | AdminError::CollectionNotFound { .. }
            | AdminError::DocumentNotFound { .. } => 404,
            AdminError::InvalidRequest(_) => 400,
            AdminError::MethodNotAllowed { .. } => 405,
            AdminError::Binding { .. } => 422,
            AdminError::Store(e) if e.is_not_found() => 404,
            AdminError::Misconfigured { .. }
            | AdminError::Store(_)
            | AdminError::Core(_)
            | AdminError::InvalidConfig { .. } => 500,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status() >= 500
    }

    /// Returns true for the not-found family.
    pub fn is_not_found(&self) -> bool {
        self.status() == 404
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docadmin_core::FieldError;

    #[test]
    fn error_classification() {
        assert!(AdminError::Unauthorized.is_client_error());
        assert!(AdminError::InvalidRequest("bad".into()).is_client_error());
        assert!(AdminError::misconfigured("no store").is_server_error());
        assert!(!AdminError::InvalidRequest("bad".into()).is_server_error());
        assert!(AdminError::Store(StoreError::unavailable("down")).is_server_error());
    }

    #[test]
    fn status_codes() {
        let name = CollectionName::parse("db1.users").unwrap();
        assert_eq!(AdminError::Unauthorized.status(), 401);
        assert_eq!(AdminError::document_not_found(&name, DocumentId::new()).status(), 404);
        assert_eq!(
            AdminError::CollectionNotFound {
                collection: "db1.x".into()
            }
            .status(),
            404
        );
        assert_eq!(
            AdminError::MethodNotAllowed {
                method: "DELETE".into(),
                path: "/list/db1.users".into()
            }
            .status(),
            405
        );
    }

    #[test]
    fn binding_errors_are_unwrapped() {
        let name = CollectionName::parse("db1.users").unwrap();
        let errors = BindErrors::new(vec![FieldError::new("age", "expected integer")]);

        let err = AdminError::from_binding(&name, CoreError::Binding(errors));
        match &err {
            AdminError::Binding { collection, errors } => {
                assert_eq!(collection, "db1.users");
                assert!(errors.contains("age"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.status(), 422);

        let other = AdminError::from_binding(&name, CoreError::invalid_document("db1.users", "x"));
        assert!(matches!(other, AdminError::Core(_)));
    }

    #[test]
    fn error_display() {
        let name = CollectionName::parse("db1.users").unwrap();
        let id = DocumentId::new();
        let msg = AdminError::document_not_found(&name, id).to_string();
        assert!(msg.contains("db1.users"));
        assert!(msg.contains(&id.to_string()));
    }
}
