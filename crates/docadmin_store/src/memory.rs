//! In-memory document store.

use crate::backend::{Document, DocumentStore};
use crate::error::{StoreError, StoreResult};
use crate::types::{CollectionName, DocumentId};
use docadmin_codec::{from_cbor, to_canonical_cbor, Value};
use parking_lot::RwLock;
use std::collections::HashMap;

type Collection = Vec<(DocumentId, Vec<u8>)>;

/// An in-memory document store.
///
/// Documents are kept as canonical CBOR bytes, so what comes back out has
/// been through the same encoding a persistent store would apply. Each
/// collection keeps insertion order.
///
/// Suitable for:
/// - Unit and integration tests
/// - Demos and ephemeral admin sessions
///
/// # Example
///
/// ```rust
/// use docadmin_codec::Value;
/// use docadmin_store::{CollectionName, DocumentStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// let users = CollectionName::parse("app.users").unwrap();
///
/// let id = store.insert(&users, Value::map([("name", Value::from("Alice"))])).unwrap();
/// let doc = store.fetch(&users, id).unwrap().unwrap();
/// assert_eq!(doc.body.get("name"), Some(&Value::from("Alice")));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<CollectionName, Collection>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents in a collection.
    #[must_use]
    pub fn len(&self, collection: &CollectionName) -> usize {
        self.collections.read().get(collection).map_or(0, Vec::len)
    }

    /// Returns the number of documents across all collections.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.collections.read().values().map(Vec::len).sum()
    }

    /// Returns true if no collection holds any document.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document_count() == 0
    }

    /// Removes all documents.
    pub fn clear(&self) {
        self.collections.write().clear();
    }

    fn encode(body: &Value) -> StoreResult<Vec<u8>> {
        if body.as_map().is_none() {
            return Err(StoreError::InvalidDocument {
                kind: body.kind_name(),
            });
        }
        Ok(to_canonical_cbor(body)?)
    }
}

impl DocumentStore for MemoryStore {
    fn fetch_all(&self, collection: &CollectionName) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        docs.iter()
            .map(|(id, bytes)| -> StoreResult<Document> {
                Ok(Document::new(*id, from_cbor(bytes)?))
            })
            .collect()
    }

    fn fetch(&self, collection: &CollectionName, id: DocumentId) -> StoreResult<Option<Document>> {
        let collections = self.collections.read();
        let found = collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| *doc_id == id));

        match found {
            Some((_, bytes)) => Ok(Some(Document::new(id, from_cbor(bytes)?))),
            None => Ok(None),
        }
    }

    fn insert(&self, collection: &CollectionName, body: Value) -> StoreResult<DocumentId> {
        let bytes = Self::encode(&body)?;
        let id = DocumentId::new();

        self.collections
            .write()
            .entry(collection.clone())
            .or_default()
            .push((id, bytes));

        tracing::debug!(%collection, %id, "inserted document");
        Ok(id)
    }

    fn replace(&self, collection: &CollectionName, id: DocumentId, body: Value) -> StoreResult<()> {
        let bytes = Self::encode(&body)?;

        let mut collections = self.collections.write();
        let slot = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| *doc_id == id));

        match slot {
            Some((_, stored)) => {
                *stored = bytes;
                tracing::debug!(%collection, %id, "replaced document");
                Ok(())
            }
            None => Err(StoreError::NotFound {
                collection: collection.clone(),
                id,
            }),
        }
    }
}
