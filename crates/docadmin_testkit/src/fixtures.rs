//! Sample record shapes and admin helpers.
//!
//! Provides a small registry of realistic shapes and a fully wired admin
//! whose store and renderer can be inspected after a request.

use crate::doubles::{RecordingRenderer, RecordingStore};
use docadmin_core::{InputFields, TypeRegistry};
use docadmin_server::{Admin, AdminConfig, Authorizer};
use docadmin_store::{CollectionName, DocumentId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A user record: one text field, one integer field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: i64,
}

/// An order record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Ordered item.
    pub item: String,
    /// Quantity ordered.
    pub quantity: i64,
    /// Whether the order is paid.
    pub paid: bool,
}

/// A product record with collection and optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product name.
    pub name: String,
    /// Price in cents.
    pub price: i64,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Optional note.
    pub note: Option<String>,
}

/// A postal address, stored as a nested map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// City.
    pub city: String,
    /// Postal code.
    pub postcode: String,
}

/// A shipment: sequence, nested and optional fields side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    /// Shipping label.
    pub label: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Parcel weights in grams.
    pub weights: Vec<i64>,
    /// Destination.
    pub address: Address,
    /// Optional tracking number.
    pub tracking: Option<i64>,
    /// Whether the shipment left the warehouse.
    pub dispatched: bool,
}

/// Identifier of the sample users collection.
pub const USERS: &str = "db1.users";
/// Identifier of the sample orders collection.
pub const ORDERS: &str = "db1.orders";
/// Identifier of the sample products collection.
pub const PRODUCTS: &str = "db2.products";
/// Identifier of the shipments collection in [`shipment_registry`].
pub const SHIPMENTS: &str = "db3.shipments";

/// Parses a collection identifier known to be valid.
pub fn collection(name: &str) -> CollectionName {
    CollectionName::parse(name).expect("fixture collection names are valid")
}

/// Creates a registry holding [`User`], [`Order`] and [`Product`] under
/// [`USERS`], [`ORDERS`] and [`PRODUCTS`].
pub fn sample_registry() -> TypeRegistry {
    let registry = TypeRegistry::new();
    registry.register::<User>(USERS).expect("register users");
    registry.register::<Order>(ORDERS).expect("register orders");
    registry
        .register::<Product>(PRODUCTS)
        .expect("register products");
    registry
}

/// Creates a registry holding only [`Shipment`] under [`SHIPMENTS`].
pub fn shipment_registry() -> TypeRegistry {
    let registry = TypeRegistry::new();
    registry
        .register::<Shipment>(SHIPMENTS)
        .expect("register shipments");
    registry
}

/// An admin over the sample registry with inspectable collaborators.
pub struct TestAdmin {
    /// The admin under test.
    pub admin: Admin,
    /// The registry the admin serves.
    pub registry: Arc<TypeRegistry>,
    /// The store, counting calls.
    pub store: Arc<RecordingStore>,
    /// The renderer, recording calls.
    pub renderer: Arc<RecordingRenderer>,
}

impl TestAdmin {
    /// Creates an admin with no authorizer.
    pub fn new() -> Self {
        Self::build(sample_registry(), None, AdminConfig::default())
    }

    /// Creates an admin over `registry` instead of the sample one.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self::build(registry, None, AdminConfig::default())
    }

    /// Creates an admin guarded by `authorizer`.
    pub fn with_authorizer(authorizer: impl Authorizer + 'static) -> Self {
        Self::build(sample_registry(), Some(Arc::new(authorizer)), AdminConfig::default())
    }

    /// Creates an admin with a custom configuration.
    pub fn with_config(config: AdminConfig) -> Self {
        Self::build(sample_registry(), None, config)
    }

    fn build(
        registry: TypeRegistry,
        authorizer: Option<Arc<dyn Authorizer>>,
        config: AdminConfig,
    ) -> Self {
        let registry = Arc::new(registry);
        let store = Arc::new(RecordingStore::new());
        let renderer = Arc::new(RecordingRenderer::new());

        let mut builder = Admin::builder(Arc::clone(&registry))
            .store(store.clone())
            .renderer(renderer.clone())
            .config(config);
        if let Some(authorizer) = authorizer {
            builder = builder.authorizer(authorizer);
        }

        Self {
            admin: builder.build().expect("valid test admin"),
            registry,
            store,
            renderer,
        }
    }

    /// Creates a user directly through the engine.
    pub fn seed_user(&self, name: &str, age: i64) -> DocumentId {
        let input = InputFields::new().with("name", name).with("age", age);
        self.admin.create(USERS, &input).expect("seed user")
    }
}

impl Default for TestAdmin {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_registry_has_three_collections() {
        let registry = sample_registry();
        assert_eq!(registry.len(), 3);
        assert!(registry.resolve(USERS).unwrap().is::<User>());
        assert!(registry.resolve(PRODUCTS).unwrap().is::<Product>());
    }

    #[test]
    fn shipment_fields_cover_every_form_control() {
        let registry = shipment_registry();
        let descriptor = registry.resolve(SHIPMENTS).unwrap();
        let kinds: Vec<_> = descriptor.fields().iter().map(|f| f.kind.name()).collect();
        assert_eq!(kinds, ["text", "array", "array", "map", "nullable", "bool"]);
    }

    #[test]
    fn seeded_users_are_stored() {
        let harness = TestAdmin::new();
        let id = harness.seed_user("Alice", 30);

        let doc = harness.admin.detail(USERS, id).unwrap();
        assert_eq!(doc.fields.len(), 2);
        assert_eq!(harness.store.insert_calls(), 1);
    }
}
