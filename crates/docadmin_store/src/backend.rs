//! Document store trait definition.

use crate::error::StoreResult;
use crate::types::{CollectionName, DocumentId};
use docadmin_codec::Value;

/// A persisted document: its store-assigned identity and its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Store-assigned identity.
    pub id: DocumentId,
    /// Document body; always a map.
    pub body: Value,
}

impl Document {
    /// Creates a document.
    pub fn new(id: DocumentId, body: Value) -> Self {
        Self { id, body }
    }
}

/// A handle to namespaced document collections.
///
/// Stores are **schemaless**: they keep whatever map they are given and do
/// not know about record shapes. The admin engine owns all interpretation.
///
/// # Invariants
///
/// - `insert` assigns a fresh identity and never overwrites
/// - `fetch` returns exactly what was last written at that identity
/// - `replace` fails with [`crate::StoreError::NotFound`] if nothing exists
///   at the identity
/// - Stores must be `Send + Sync`; one handle serves all requests
///
/// Failures propagate immediately. Retry policy, if any, belongs to the
/// implementation.
pub trait DocumentStore: Send + Sync {
    /// Fetches every document in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    fn fetch_all(&self, collection: &CollectionName) -> StoreResult<Vec<Document>>;

    /// Fetches one document by identity.
    ///
    /// Returns `None` if no document exists at `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    fn fetch(&self, collection: &CollectionName, id: DocumentId) -> StoreResult<Option<Document>>;

    /// Inserts a new document and returns its assigned identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a map or the store cannot be
    /// reached.
    fn insert(&self, collection: &CollectionName, body: Value) -> StoreResult<DocumentId>;

    /// Replaces the body of an existing document.
    ///
    /// # Errors
    ///
    /// Returns an error if no document exists at `id`, the body is not a
    /// map, or the store cannot be reached.
    fn replace(&self, collection: &CollectionName, id: DocumentId, body: Value) -> StoreResult<()>;
}
