//! Collection index: registered collections grouped by namespace.

use crate::registry::TypeRegistry;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

/// Namespace to collection-name grouping of a registry.
///
/// No ordering is kept; use [`CollectionIndex::sorted`] for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionIndex {
    namespaces: HashMap<String, HashSet<String>>,
}

impl CollectionIndex {
    /// Groups every registered identifier by namespace.
    pub fn build(registry: &TypeRegistry) -> Self {
        let mut namespaces: HashMap<String, HashSet<String>> = HashMap::new();
        for name in registry.names() {
            namespaces
                .entry(name.namespace().to_string())
                .or_default()
                .insert(name.collection().to_string());
        }
        Self { namespaces }
    }

    /// Iterates over the namespaces.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// Returns the collections of `namespace`.
    pub fn collections(&self, namespace: &str) -> Option<&HashSet<String>> {
        self.namespaces.get(namespace)
    }

    /// Returns true if `namespace.collection` is indexed.
    pub fn contains(&self, namespace: &str, collection: &str) -> bool {
        self.collections(namespace)
            .is_some_and(|set| set.contains(collection))
    }

    /// Returns the number of namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Returns true if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Namespaces and their collections, both sorted by name.
    pub fn sorted(&self) -> Vec<(String, Vec<String>)> {
        let mut entries: Vec<_> = self
            .namespaces
            .iter()
            .map(|(ns, set)| {
                let mut collections: Vec<_> = set.iter().cloned().collect();
                collections.sort();
                (ns.clone(), collections)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

/// Build-once cache of a [`CollectionIndex`].
///
/// The first call freezes the registry and builds the index; every later
/// call returns the same `Arc`.
#[derive(Debug, Default)]
pub struct IndexCache {
    cell: OnceLock<Arc<CollectionIndex>>,
}

impl IndexCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached index, building it from `registry` on first use.
    pub fn get_or_build(&self, registry: &TypeRegistry) -> Arc<CollectionIndex> {
        let index = self.cell.get_or_init(|| {
            registry.freeze();
            let index = CollectionIndex::build(registry);
            tracing::debug!(namespaces = index.len(), "built collection index");
            Arc::new(index)
        });
        Arc::clone(index)
    }

    /// Returns true once the index has been built.
    pub fn is_built(&self) -> bool {
        self.cell.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use proptest::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Doc {
        title: String,
    }

    fn registry(names: &[&str]) -> TypeRegistry {
        let registry = TypeRegistry::new();
        for name in names {
            registry.register::<Doc>(name).unwrap();
        }
        registry
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn groups_by_namespace() {
        let registry = registry(&["db1.users", "db1.orders", "db2.products"]);
        let index = CollectionIndex::build(&registry);

        assert_eq!(index.len(), 2);
        assert_eq!(index.collections("db1"), Some(&set(&["users", "orders"])));
        assert_eq!(index.collections("db2"), Some(&set(&["products"])));
        assert!(index.contains("db1", "orders"));
        assert!(!index.contains("db2", "orders"));
    }

    #[test]
    fn sorted_orders_everything() {
        let registry = registry(&["zoo.b", "app.z", "app.a"]);
        let sorted = CollectionIndex::build(&registry).sorted();

        assert_eq!(
            sorted,
            vec![
                ("app".to_string(), vec!["a".to_string(), "z".to_string()]),
                ("zoo".to_string(), vec!["b".to_string()]),
            ]
        );
    }

    #[test]
    fn cache_returns_same_index() {
        let registry = registry(&["db1.users", "db1.orders", "db2.products"]);
        let cache = IndexCache::new();
        assert!(!cache.is_built());

        let first = cache.get_or_build(&registry);
        let second = cache.get_or_build(&registry);

        assert!(cache.is_built());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn cache_does_not_refresh() {
        let registry = registry(&["db1.users", "db1.orders", "db2.products"]);
        let cache = IndexCache::new();
        let first = cache.get_or_build(&registry);

        // Late registration is rejected rather than silently missed
        let late = registry.register::<Doc>("db3.audit");
        assert!(matches!(late, Err(CoreError::RegistryFrozen { .. })));

        let second = cache.get_or_build(&registry);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.collections("db3").is_none());
    }

    #[test]
    fn empty_registry_gives_empty_index() {
        let index = CollectionIndex::build(&TypeRegistry::new());
        assert!(index.is_empty());
        assert_eq!(index.namespaces().count(), 0);
    }

    proptest! {
        #[test]
        fn every_registration_is_indexed(
            names in proptest::collection::hash_set(("[a-c]{1,2}", "[a-z]{1,4}"), 0..12)
        ) {
            let registry = TypeRegistry::new();
            for (ns, coll) in &names {
                registry.register::<Doc>(&format!("{ns}.{coll}")).unwrap();
            }

            let index = CollectionIndex::build(&registry);
            for (ns, coll) in &names {
                prop_assert!(index.contains(ns, coll));
            }
            let total: usize = index.sorted().iter().map(|(_, c)| c.len()).sum();
            prop_assert_eq!(total, names.len());
        }
    }
}
