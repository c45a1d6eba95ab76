//! Admin configuration.

use crate::error::{AdminError, AdminResult};
use docadmin_store::{CollectionName, DocumentId};

/// URL path prefix for each admin action.
///
/// A path ending in `/` matches every request path below it; any other path
/// matches only itself. The matched prefix is stripped before the action
/// sees the remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    /// Collection index.
    pub index: String,
    /// Document listing.
    pub list: String,
    /// Edit form and update submission.
    pub update: String,
    /// Create form and create submission.
    pub create: String,
    /// Single document view.
    pub detail: String,
}

impl RouteConfig {
    /// Sets the index path.
    pub fn with_index(mut self, path: impl Into<String>) -> Self {
        self.index = path.into();
        self
    }

    /// Sets the list path.
    pub fn with_list(mut self, path: impl Into<String>) -> Self {
        self.list = path.into();
        self
    }

    /// Sets the update path.
    pub fn with_update(mut self, path: impl Into<String>) -> Self {
        self.update = path.into();
        self
    }

    /// Sets the create path.
    pub fn with_create(mut self, path: impl Into<String>) -> Self {
        self.create = path.into();
        self
    }

    /// Sets the detail path.
    pub fn with_detail(mut self, path: impl Into<String>) -> Self {
        self.detail = path.into();
        self
    }

    /// Returns `(action name, path)` for every route.
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("index", self.index.as_str()),
            ("list", self.list.as_str()),
            ("update", self.update.as_str()),
            ("create", self.create.as_str()),
            ("detail", self.detail.as_str()),
        ]
    }

    /// Checks that every path is absolute and no two actions share a path.
    pub fn validate(&self) -> AdminResult<()> {
        let entries = self.entries();
        for (i, (action, path)) in entries.iter().enumerate() {
            if !path.starts_with('/') {
                return Err(AdminError::invalid_config(format!(
                    "{action} route must start with '/': {path:?}"
                )));
            }
            if let Some((other, _)) = entries[..i].iter().find(|(_, p)| p == path) {
                return Err(AdminError::invalid_config(format!(
                    "{other} and {action} routes share the path {path:?}"
                )));
            }
        }
        Ok(())
    }

    /// Path of the collection index.
    pub fn index_path(&self) -> String {
        self.index.clone()
    }

    /// Path listing `collection`.
    pub fn list_path(&self, collection: &CollectionName) -> String {
        format!("{}{collection}", self.list)
    }

    /// Path showing one document.
    pub fn detail_path(&self, collection: &CollectionName, id: DocumentId) -> String {
        format!("{}{collection}/{id}", self.detail)
    }

    /// Path of the create form for `collection`.
    pub fn create_path(&self, collection: &CollectionName) -> String {
        format!("{}{collection}", self.create)
    }

    /// Path of the edit form for one document.
    pub fn update_path(&self, collection: &CollectionName, id: DocumentId) -> String {
        format!("{}{collection}/{id}", self.update)
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            index: "/".to_string(),
            list: "/list/".to_string(),
            update: "/update/".to_string(),
            create: "/create/".to_string(),
            detail: "/detail/".to_string(),
        }
    }
}

/// Configuration for the admin engine.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Route table.
    pub routes: RouteConfig,
    /// Title shown by the default renderer.
    pub title: String,
}

impl AdminConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            routes: RouteConfig::default(),
            title: "Admin".to_string(),
        }
    }

    /// Sets the route table.
    pub fn with_routes(mut self, routes: RouteConfig) -> Self {
        self.routes = routes;
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AdminResult<()> {
        self.routes.validate()
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_routes() {
        let routes = RouteConfig::default();
        assert_eq!(routes.index, "/");
        assert_eq!(routes.list, "/list/");
        assert_eq!(routes.update, "/update/");
        assert_eq!(routes.create, "/create/");
        assert_eq!(routes.detail, "/detail/");
        assert!(routes.validate().is_ok());
    }

    #[test]
    fn config_builder() {
        let config = AdminConfig::new()
            .with_title("Shop admin")
            .with_routes(RouteConfig::default().with_list("/browse/"));

        assert_eq!(config.title, "Shop admin");
        assert_eq!(config.routes.list, "/browse/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn relative_route_is_rejected() {
        let routes = RouteConfig::default().with_detail("detail/");
        let err = routes.validate().unwrap_err();
        assert!(matches!(err, AdminError::InvalidConfig { .. }));
        assert!(err.to_string().contains("detail"));
    }

    #[test]
    fn shared_route_is_rejected() {
        let routes = RouteConfig::default().with_create("/list/");
        let err = routes.validate().unwrap_err();
        assert!(err.to_string().contains("list and create"));
    }

    #[test]
    fn reverse_paths() {
        let routes = RouteConfig::default();
        let name = CollectionName::parse("shop.products").unwrap();
        let id = DocumentId::new();

        assert_eq!(routes.list_path(&name), "/list/shop.products");
        assert_eq!(routes.create_path(&name), "/create/shop.products");
        assert_eq!(routes.detail_path(&name, id), format!("/detail/shop.products/{id}"));
        assert_eq!(routes.update_path(&name, id), format!("/update/shop.products/{id}"));
    }
}
