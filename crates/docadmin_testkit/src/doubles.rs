//! Test doubles for the admin's collaborators.

use docadmin_codec::Value;
use docadmin_core::BindErrors;
use docadmin_server::{
    AdminError, AdminRequest, AdminResponse, DetailView, FormView, IndexView, ListView, Renderer,
};
use docadmin_store::{
    CollectionName, Document, DocumentId, DocumentStore, MemoryStore, StoreError, StoreResult,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A [`MemoryStore`] that counts every call made to it.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    fetch_all: AtomicUsize,
    fetch: AtomicUsize,
    insert: AtomicUsize,
    replace: AtomicUsize,
}

impl RecordingStore {
    /// Creates an empty recording store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the wrapped store, for seeding and inspection without
    /// counting.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Number of `fetch_all` calls.
    pub fn fetch_all_calls(&self) -> usize {
        self.fetch_all.load(Ordering::SeqCst)
    }

    /// Number of `fetch` calls.
    pub fn fetch_calls(&self) -> usize {
        self.fetch.load(Ordering::SeqCst)
    }

    /// Number of `insert` calls.
    pub fn insert_calls(&self) -> usize {
        self.insert.load(Ordering::SeqCst)
    }

    /// Number of `replace` calls.
    pub fn replace_calls(&self) -> usize {
        self.replace.load(Ordering::SeqCst)
    }

    /// Total number of calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.fetch_all_calls() + self.fetch_calls() + self.insert_calls() + self.replace_calls()
    }
}

impl DocumentStore for RecordingStore {
    fn fetch_all(&self, collection: &CollectionName) -> StoreResult<Vec<Document>> {
        self.fetch_all.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_all(collection)
    }

    fn fetch(&self, collection: &CollectionName, id: DocumentId) -> StoreResult<Option<Document>> {
        self.fetch.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(collection, id)
    }

    fn insert(&self, collection: &CollectionName, body: Value) -> StoreResult<DocumentId> {
        self.insert.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(collection, body)
    }

    fn replace(&self, collection: &CollectionName, id: DocumentId, body: Value) -> StoreResult<()> {
        self.replace.fetch_add(1, Ordering::SeqCst);
        self.inner.replace(collection, id, body)
    }
}

/// A store whose every call fails with [`StoreError::Unavailable`].
#[derive(Debug, Default)]
pub struct FailingStore;

impl FailingStore {
    fn fail<T>(&self) -> StoreResult<T> {
        Err(StoreError::unavailable("store is down"))
    }
}

impl DocumentStore for FailingStore {
    fn fetch_all(&self, _collection: &CollectionName) -> StoreResult<Vec<Document>> {
        self.fail()
    }

    fn fetch(&self, _collection: &CollectionName, _id: DocumentId) -> StoreResult<Option<Document>> {
        self.fail()
    }

    fn insert(&self, _collection: &CollectionName, _body: Value) -> StoreResult<DocumentId> {
        self.fail()
    }

    fn replace(&self, _collection: &CollectionName, _id: DocumentId, _body: Value) -> StoreResult<()> {
        self.fail()
    }
}

/// One call received by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    /// `unauthorized`
    Unauthorized,
    /// `internal_error`, with the error message.
    InternalError(String),
    /// `not_found`, with the error message.
    NotFound(String),
    /// `bad_request`, with the error message.
    BadRequest(String),
    /// `index`
    Index(IndexView),
    /// `list`
    List(ListView),
    /// `detail`
    Detail(DetailView),
    /// `form`
    Form(FormView),
    /// `binding_errors`
    BindingErrors(FormView, BindErrors),
    /// `saved`, with the redirect location.
    Saved(String),
}

impl RenderCall {
    /// Short name of the renderer method.
    pub fn name(&self) -> &'static str {
        match self {
            RenderCall::Unauthorized => "unauthorized",
            RenderCall::InternalError(_) => "internal_error",
            RenderCall::NotFound(_) => "not_found",
            RenderCall::BadRequest(_) => "bad_request",
            RenderCall::Index(_) => "index",
            RenderCall::List(_) => "list",
            RenderCall::Detail(_) => "detail",
            RenderCall::Form(_) => "form",
            RenderCall::BindingErrors(..) => "binding_errors",
            RenderCall::Saved(_) => "saved",
        }
    }
}

/// A renderer that records every call and answers with a plain-text body
/// naming the method.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RenderCall>>,
}

impl RecordingRenderer {
    /// Creates a renderer with no recorded calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every call so far.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    /// Returns the most recent call.
    pub fn last(&self) -> Option<RenderCall> {
        self.calls.lock().last().cloned()
    }

    /// Returns the number of calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, call: RenderCall, status: u16) -> AdminResponse {
        let response = AdminResponse::text(status, call.name());
        self.calls.lock().push(call);
        response
    }
}

impl Renderer for RecordingRenderer {
    fn unauthorized(&self, _request: &AdminRequest) -> AdminResponse {
        self.record(RenderCall::Unauthorized, 401)
    }

    fn internal_error(&self, _request: &AdminRequest, error: &AdminError) -> AdminResponse {
        self.record(RenderCall::InternalError(error.to_string()), error.status())
    }

    fn not_found(&self, _request: &AdminRequest, error: &AdminError) -> AdminResponse {
        self.record(RenderCall::NotFound(error.to_string()), error.status())
    }

    fn bad_request(&self, _request: &AdminRequest, error: &AdminError) -> AdminResponse {
        self.record(RenderCall::BadRequest(error.to_string()), error.status())
    }

    fn index(&self, _request: &AdminRequest, view: &IndexView) -> AdminResponse {
        self.record(RenderCall::Index(view.clone()), 200)
    }

    fn list(&self, _request: &AdminRequest, view: &ListView) -> AdminResponse {
        self.record(RenderCall::List(view.clone()), 200)
    }

    fn detail(&self, _request: &AdminRequest, view: &DetailView) -> AdminResponse {
        self.record(RenderCall::Detail(view.clone()), 200)
    }

    fn form(&self, _request: &AdminRequest, view: &FormView) -> AdminResponse {
        self.record(RenderCall::Form(view.clone()), 200)
    }

    fn binding_errors(
        &self,
        _request: &AdminRequest,
        view: &FormView,
        errors: &BindErrors,
    ) -> AdminResponse {
        self.record(RenderCall::BindingErrors(view.clone(), errors.clone()), 422)
    }

    fn saved(&self, _request: &AdminRequest, location: &str) -> AdminResponse {
        let response = AdminResponse::redirect(location);
        self.calls.lock().push(RenderCall::Saved(location.to_string()));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_store_counts_calls() {
        let store = RecordingStore::new();
        let users = CollectionName::parse("db1.users").unwrap();

        let id = store.insert(&users, Value::empty_map()).unwrap();
        store.fetch(&users, id).unwrap();
        store.fetch_all(&users).unwrap();
        store.replace(&users, id, Value::empty_map()).unwrap();

        assert_eq!(store.insert_calls(), 1);
        assert_eq!(store.fetch_calls(), 1);
        assert_eq!(store.fetch_all_calls(), 1);
        assert_eq!(store.replace_calls(), 1);
        assert_eq!(store.total_calls(), 4);
        assert_eq!(store.inner().len(&users), 1);
    }

    #[test]
    fn failing_store_fails() {
        let users = CollectionName::parse("db1.users").unwrap();
        let err = FailingStore.fetch_all(&users).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }

    #[test]
    fn recording_renderer_records() {
        let renderer = RecordingRenderer::new();
        let response = renderer.unauthorized(&AdminRequest::get("/"));
        assert_eq!(response.status, 401);
        assert_eq!(renderer.last(), Some(RenderCall::Unauthorized));
        assert_eq!(renderer.call_count(), 1);
    }
}
