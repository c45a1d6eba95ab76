//! Type registry.
//!
//! Maps collection identifiers to record descriptors. Populated by the
//! embedding application during startup, then frozen when the admin first
//! builds its collection index.
//!
//! # Lifecycle
//!
//! 1. Create an empty registry
//! 2. `register` every administered shape (single-threaded startup)
//! 3. Hand the registry to the admin; first use freezes it
//! 4. Any later `register` fails with [`CoreError::RegistryFrozen`]

use crate::descriptor::{RecordDescriptor, RecordInstance, RecordShape};
use crate::error::{CoreError, CoreResult};
use docadmin_store::CollectionName;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Registry of administered record shapes.
///
/// # Example
///
/// ```rust
/// use docadmin_core::TypeRegistry;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// let registry = TypeRegistry::new();
/// registry.register::<User>("app.users").unwrap();
///
/// assert!(registry.resolve("app.users").is_some());
/// assert!(registry.resolve("app.orders").is_none());
/// assert!(registry.register::<User>("app.users").is_err());
/// ```
#[derive(Debug, Default)]
pub struct TypeRegistry {
    descriptors: RwLock<HashMap<CollectionName, Arc<RecordDescriptor>>>,
    frozen: AtomicBool,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers shape `T` for `collection` (`<namespace>.<collection>`).
    ///
    /// # Errors
    ///
    /// All errors are startup configuration errors:
    /// - [`CoreError::InvalidCollectionName`] if the identifier is malformed
    /// - [`CoreError::DuplicateRegistration`] if the identifier is taken,
    ///   even by the same shape
    /// - [`CoreError::UnsupportedShape`] if `T` is not a record of fields
    /// - [`CoreError::RegistryFrozen`] if the admin has already started
    pub fn register<T: RecordShape>(&self, collection: &str) -> CoreResult<()> {
        if self.is_frozen() {
            return Err(CoreError::RegistryFrozen {
                collection: collection.to_string(),
            });
        }

        let name = CollectionName::parse(collection)?;
        let mut descriptors = self.descriptors.write();
        if let Some(existing) = descriptors.get(&name) {
            return Err(CoreError::DuplicateRegistration {
                collection: name.to_string(),
                existing: existing.type_name(),
                attempted: std::any::type_name::<T>(),
            });
        }

        let descriptor = RecordDescriptor::of::<T>(name.clone())?;
        tracing::info!(
            collection = %name,
            shape = descriptor.type_name(),
            fields = descriptor.fields().len(),
            "registered record shape"
        );
        descriptors.insert(name, Arc::new(descriptor));
        Ok(())
    }

    /// Looks up the descriptor for `collection`.
    ///
    /// Unknown and malformed identifiers both resolve to `None`.
    pub fn resolve(&self, collection: &str) -> Option<Arc<RecordDescriptor>> {
        let name = CollectionName::parse(collection).ok()?;
        self.resolve_name(&name)
    }

    /// Looks up the descriptor for an already-parsed identifier.
    pub fn resolve_name(&self, collection: &CollectionName) -> Option<Arc<RecordDescriptor>> {
        self.descriptors.read().get(collection).cloned()
    }

    /// Resolves `collection` and allocates a zero-valued instance.
    pub fn instantiate(&self, collection: &str) -> Option<RecordInstance> {
        self.resolve(collection).map(|d| d.instantiate())
    }

    /// Returns every registered identifier.
    pub fn names(&self) -> Vec<CollectionName> {
        self.descriptors.read().keys().cloned().collect()
    }

    /// Returns every registered descriptor.
    pub fn descriptors(&self) -> Vec<Arc<RecordDescriptor>> {
        self.descriptors.read().values().cloned().collect()
    }

    /// Returns the number of registered shapes.
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }

    /// Rejects all further registrations.
    pub fn freeze(&self) {
        if !self.frozen.swap(true, Ordering::AcqRel) {
            tracing::debug!(shapes = self.len(), "type registry frozen");
        }
    }

    /// Returns true once the registry has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
        age: i64,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Order {
        total: i64,
    }

    #[test]
    fn register_then_resolve() {
        let registry = TypeRegistry::new();
        registry.register::<User>("db1.users").unwrap();

        let descriptor = registry.resolve("db1.users").unwrap();
        assert!(descriptor.is::<User>());
        assert_eq!(descriptor.collection().as_str(), "db1.users");

        let instance = descriptor.instantiate();
        assert_eq!(instance.downcast_ref::<User>(), Some(&User::default()));
    }

    #[test]
    fn instantiate_composes_resolve() {
        let registry = TypeRegistry::new();
        registry.register::<Order>("db1.orders").unwrap();

        let instance = registry.instantiate("db1.orders").unwrap();
        assert_eq!(instance.into_inner::<Order>(), Some(Order::default()));
        assert!(registry.instantiate("db1.users").is_none());
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = TypeRegistry::new();
        registry.register::<User>("db1.users").unwrap();

        let same = registry.register::<User>("db1.users");
        assert!(matches!(same, Err(CoreError::DuplicateRegistration { .. })));

        let different = registry.register::<Order>("db1.users");
        assert!(matches!(different, Err(CoreError::DuplicateRegistration { .. })));

        // The original registration is untouched
        assert!(registry.resolve("db1.users").unwrap().is::<User>());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn malformed_identifier_fails() {
        let registry = TypeRegistry::new();
        for bad in ["users", "db1.users.old", ".users", "db1."] {
            let result = registry.register::<User>(bad);
            assert!(matches!(result, Err(CoreError::InvalidCollectionName(_))), "{bad}");
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn resolve_unknown_is_none() {
        let registry = TypeRegistry::new();
        registry.register::<User>("db1.users").unwrap();

        assert!(registry.resolve("db1.orders").is_none());
        assert!(registry.resolve("garbage").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn frozen_registry_rejects_registration() {
        let registry = TypeRegistry::new();
        registry.register::<User>("db1.users").unwrap();
        registry.freeze();

        let result = registry.register::<Order>("db1.orders");
        assert!(matches!(result, Err(CoreError::RegistryFrozen { .. })));
        assert!(registry.resolve("db1.orders").is_none());
        assert!(registry.resolve("db1.users").is_some());
    }

    #[test]
    fn names_lists_registrations() {
        let registry = TypeRegistry::new();
        registry.register::<User>("db1.users").unwrap();
        registry.register::<Order>("db2.orders").unwrap();

        let mut names: Vec<_> = registry.names().iter().map(|n| n.to_string()).collect();
        names.sort();
        assert_eq!(names, ["db1.users", "db2.orders"]);
        assert_eq!(registry.descriptors().len(), 2);
    }
}
