//! The admin engine.

use crate::auth::Authorizer;
use crate::config::AdminConfig;
use crate::error::{AdminError, AdminResult};
use crate::handler::RequestHandler;
use crate::render::{
    CollectionLink, DetailView, FieldInput, FormField, FormView, HtmlRenderer, IndexView, ListView,
    NamespaceView, Renderer, Summary,
};
use crate::request::{AdminRequest, AdminResponse};
use crate::router::Router;
use docadmin_codec::Value;
use docadmin_core::{
    bind, CollectionIndex, IndexCache, InputFields, RecordDescriptor, RecordInstance, TypeRegistry,
};
use docadmin_store::{CollectionName, DocumentId, DocumentStore};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Generic admin over every collection in a [`TypeRegistry`].
///
/// The typed operations (`list`, `detail`, `create`, ...) are the engine's
/// programmatic surface; [`Admin::handle`] wraps them with authorization,
/// routing and rendering.
///
/// The first operation freezes the registry.
///
/// # Example
///
/// ```
/// use docadmin_core::{InputFields, TypeRegistry};
/// use docadmin_server::Admin;
/// use docadmin_store::MemoryStore;
/// use serde::{Deserialize, Serialize};
/// use std::sync::Arc;
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct Product {
///     name: String,
///     stock: i64,
/// }
///
/// let registry = Arc::new(TypeRegistry::new());
/// registry.register::<Product>("shop.products").unwrap();
///
/// let admin = Admin::builder(registry)
///     .store(Arc::new(MemoryStore::new()))
///     .build()
///     .unwrap();
///
/// let input = InputFields::new().with("name", "Lamp").with("stock", "3");
/// let id = admin.create("shop.products", &input).unwrap();
///
/// let detail = admin.detail("shop.products", id).unwrap();
/// assert_eq!(detail.fields[1].1.as_integer(), Some(3));
/// ```
pub struct Admin {
    registry: Arc<TypeRegistry>,
    store: Option<Arc<dyn DocumentStore>>,
    renderer: Arc<dyn Renderer>,
    authorizer: Option<Arc<dyn Authorizer>>,
    config: AdminConfig,
    router: OnceLock<Router>,
    index: IndexCache,
}

/// Builder for [`Admin`].
pub struct AdminBuilder {
    registry: Arc<TypeRegistry>,
    store: Option<Arc<dyn DocumentStore>>,
    renderer: Option<Arc<dyn Renderer>>,
    authorizer: Option<Arc<dyn Authorizer>>,
    config: AdminConfig,
}

impl AdminBuilder {
    /// Sets the document store.
    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the renderer. Defaults to [`HtmlRenderer`].
    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Sets the authorizer. Without one every request is allowed.
    pub fn authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    /// Sets the configuration.
    pub fn config(mut self, config: AdminConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the admin.
    ///
    /// A missing store is not an error here; requests fail with
    /// [`AdminError::Misconfigured`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidConfig`] if the route table is invalid.
    pub fn build(self) -> AdminResult<Admin> {
        self.config.validate()?;
        let renderer: Arc<dyn Renderer> = match self.renderer {
            Some(renderer) => renderer,
            None => Arc::new(HtmlRenderer::new(self.config.title.clone())),
        };
        if self.store.is_none() {
            tracing::warn!("admin built without a document store");
        }
        Ok(Admin {
            registry: self.registry,
            store: self.store,
            renderer,
            authorizer: self.authorizer,
            config: self.config,
            router: OnceLock::new(),
            index: IndexCache::new(),
        })
    }
}

impl Admin {
    /// Starts building an admin over `registry`.
    pub fn builder(registry: Arc<TypeRegistry>) -> AdminBuilder {
        AdminBuilder {
            registry,
            store: None,
            renderer: None,
            authorizer: None,
            config: AdminConfig::default(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub(crate) fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub(crate) fn router(&self) -> &Router {
        self.router.get_or_init(|| {
            tracing::debug!("building admin route table");
            Router::new(&self.config.routes)
        })
    }

    /// Returns the store, or [`AdminError::Misconfigured`] if none was set.
    pub fn store(&self) -> AdminResult<&Arc<dyn DocumentStore>> {
        self.store
            .as_ref()
            .ok_or_else(|| AdminError::misconfigured("document store not configured"))
    }

    /// Returns true if `request` may be served.
    pub fn is_authorized(&self, request: &AdminRequest) -> bool {
        self.authorizer
            .as_ref()
            .is_none_or(|auth| auth.authorize(request))
    }

    /// Handles one request end to end.
    ///
    /// Authorization runs first; a denied request touches neither the
    /// registry nor the store.
    pub fn handle(&self, request: &AdminRequest) -> AdminResponse {
        if !self.is_authorized(request) {
            tracing::warn!(method = %request.method, path = request.path(), "admin request denied");
            return self.renderer.unauthorized(request);
        }
        if let Err(e) = self.store() {
            tracing::warn!(error = %e, "cannot serve admin request");
            return self.renderer.internal_error(request, &e);
        }
        RequestHandler::new(self).handle(request)
    }

    /// Returns the collection index, building it on first use.
    pub fn index(&self) -> Arc<CollectionIndex> {
        self.index.get_or_build(&self.registry)
    }

    /// Builds the index page model.
    pub fn index_view(&self) -> IndexView {
        let routes = &self.config.routes;
        let namespaces = self
            .index()
            .sorted()
            .into_iter()
            .map(|(namespace, collections)| NamespaceView {
                collections: collections
                    .iter()
                    .filter_map(|c| CollectionName::new(&namespace, c).ok())
                    .map(|collection| CollectionLink {
                        list_path: routes.list_path(&collection),
                        create_path: routes.create_path(&collection),
                        collection,
                    })
                    .collect(),
                name: namespace,
            })
            .collect();
        IndexView { namespaces }
    }

    /// Resolves `collection` through the index.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::CollectionNotFound`] for unknown or malformed
    /// identifiers.
    pub fn descriptor(&self, collection: &str) -> AdminResult<Arc<RecordDescriptor>> {
        let not_found = || AdminError::CollectionNotFound {
            collection: collection.to_string(),
        };
        let name = CollectionName::parse(collection).map_err(|_| not_found())?;
        if !self.index().contains(name.namespace(), name.collection()) {
            return Err(not_found());
        }
        self.registry.resolve_name(&name).ok_or_else(not_found)
    }

    /// Lists every document in `collection`.
    ///
    /// A stored document that no longer fits the record shape is listed
    /// under its id.
    pub fn list(&self, collection: &str) -> AdminResult<ListView> {
        let descriptor = self.descriptor(collection)?;
        let name = descriptor.collection();
        let documents = self.store()?.fetch_all(name)?;
        tracing::debug!(collection = %name, count = documents.len(), "listing documents");

        let routes = &self.config.routes;
        let items = documents
            .iter()
            .map(|document| -> AdminResult<Summary> {
                let title = match descriptor.load(&document.body) {
                    Ok(instance) => title_of(&instance, document.id)?,
                    Err(e) => {
                        tracing::warn!(
                            collection = %name,
                            id = %document.id,
                            error = %e,
                            "stored document does not fit its record shape"
                        );
                        document.id.to_string()
                    }
                };
                Ok(Summary {
                    id: document.id,
                    title,
                    detail_path: routes.detail_path(name, document.id),
                    update_path: routes.update_path(name, document.id),
                })
            })
            .collect::<AdminResult<Vec<_>>>()?;

        Ok(ListView {
            collection: name.clone(),
            items,
            create_path: routes.create_path(name),
            index_path: routes.index_path(),
        })
    }

    /// Shows one document.
    pub fn detail(&self, collection: &str, id: DocumentId) -> AdminResult<DetailView> {
        let descriptor = self.descriptor(collection)?;
        let instance = self.load(&descriptor, id)?;
        self.detail_view(&instance, id)
    }

    /// Creates a document from `input`.
    ///
    /// Nothing is persisted if any field fails to bind.
    pub fn create(&self, collection: &str, input: &InputFields) -> AdminResult<DocumentId> {
        let descriptor = self.descriptor(collection)?;
        let store = self.store()?;
        let name = descriptor.collection();

        let mut instance = descriptor.instantiate();
        bind(&mut instance, input).map_err(|e| AdminError::from_binding(name, e))?;

        let id = store.insert(name, instance.to_value()?)?;
        tracing::info!(collection = %name, %id, "created document");
        Ok(id)
    }

    /// Updates a document with `input`, keeping every field `input` does not
    /// mention.
    ///
    /// Nothing is persisted if any field fails to bind.
    pub fn update(
        &self,
        collection: &str,
        id: DocumentId,
        input: &InputFields,
    ) -> AdminResult<DetailView> {
        let descriptor = self.descriptor(collection)?;
        let store = self.store()?;
        let name = descriptor.collection();

        let document = store
            .fetch(name, id)?
            .ok_or_else(|| AdminError::document_not_found(name, id))?;
        let mut instance = descriptor.load(&document.body)?;
        bind(&mut instance, input).map_err(|e| AdminError::from_binding(name, e))?;

        // Fields outside the record shape survive the write
        let mut body = document.body;
        for (field, value) in instance.field_values()? {
            body.insert(field, value);
        }
        store.replace(name, id, body).map_err(|e| {
            if e.is_not_found() {
                AdminError::document_not_found(name, id)
            } else {
                AdminError::Store(e)
            }
        })?;
        tracing::info!(collection = %name, %id, "updated document");

        self.detail_view(&instance, id)
    }

    /// Builds an empty create form for `collection`.
    pub fn new_form(&self, collection: &str) -> AdminResult<FormView> {
        let descriptor = self.descriptor(collection)?;
        let action = self.config.routes.create_path(descriptor.collection());
        form_view(&descriptor.instantiate(), None, action)
    }

    /// Builds an edit form holding the persisted values of one document.
    pub fn edit_form(&self, collection: &str, id: DocumentId) -> AdminResult<FormView> {
        let descriptor = self.descriptor(collection)?;
        let instance = self.load(&descriptor, id)?;
        let action = self.config.routes.update_path(descriptor.collection(), id);
        form_view(&instance, Some(id), action)
    }

    fn load(&self, descriptor: &Arc<RecordDescriptor>, id: DocumentId) -> AdminResult<RecordInstance> {
        let name = descriptor.collection();
        let document = self
            .store()?
            .fetch(name, id)?
            .ok_or_else(|| AdminError::document_not_found(name, id))?;
        Ok(descriptor.load(&document.body)?)
    }

    fn detail_view(&self, instance: &RecordInstance, id: DocumentId) -> AdminResult<DetailView> {
        let name = instance.collection();
        Ok(DetailView {
            collection: name.clone(),
            id,
            fields: instance.field_values()?,
            update_path: self.config.routes.update_path(name, id),
            list_path: self.config.routes.list_path(name),
        })
    }
}

impl fmt::Debug for Admin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Admin")
            .field("registry", &self.registry)
            .field("has_store", &self.store.is_some())
            .field("has_authorizer", &self.authorizer.is_some())
            .field("config", &self.config)
            .field("index_built", &self.index.is_built())
            .finish_non_exhaustive()
    }
}

/// First non-empty text field, falling back to the document id.
fn title_of(instance: &RecordInstance, id: DocumentId) -> AdminResult<String> {
    let title = instance
        .field_values()?
        .into_iter()
        .find_map(|(_, value)| match value {
            Value::Text(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        });
    Ok(title.unwrap_or_else(|| id.to_string()))
}

fn form_view(
    instance: &RecordInstance,
    id: Option<DocumentId>,
    action: String,
) -> AdminResult<FormView> {
    let descriptor = instance.descriptor();
    let fields = instance
        .field_values()?
        .into_iter()
        .filter_map(|(name, value)| {
            let kind = descriptor.field(&name)?.kind;
            Some(FormField {
                input: FieldInput::for_value(kind, &value),
                name,
                kind,
                error: None,
            })
        })
        .collect();
    Ok(FormView {
        collection: descriptor.collection().clone(),
        id,
        action,
        fields,
    })
}
