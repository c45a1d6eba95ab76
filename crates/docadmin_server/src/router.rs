//! Route table: request path to admin action.

use crate::config::RouteConfig;
use crate::error::{AdminError, AdminResult};
use docadmin_store::{CollectionName, DocumentId};
use std::fmt;

/// An admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Collection index.
    Index,
    /// Document listing.
    List,
    /// Edit form / update submission.
    Update,
    /// Create form / create submission.
    Create,
    /// Single document view.
    Detail,
}

impl Action {
    /// Returns the action name used in route configuration.
    pub fn name(self) -> &'static str {
        match self {
            Action::Index => "index",
            Action::List => "list",
            Action::Update => "update",
            Action::Create => "create",
            Action::Detail => "detail",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A matched route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// The action to run.
    pub action: Action,
    /// The path with the route prefix stripped.
    pub remainder: &'a str,
}

/// Immutable route table built from a [`RouteConfig`].
///
/// Patterns ending in `/` match any path below them, other patterns match
/// exactly. The longest matching pattern wins.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<(String, Action)>,
}

impl Router {
    /// Builds the table.
    pub fn new(config: &RouteConfig) -> Self {
        let mut routes = vec![
            (config.index.clone(), Action::Index),
            (config.list.clone(), Action::List),
            (config.update.clone(), Action::Update),
            (config.create.clone(), Action::Create),
            (config.detail.clone(), Action::Detail),
        ];
        routes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { routes }
    }

    /// Finds the action for `path`.
    pub fn route<'a>(&self, path: &'a str) -> Option<RouteMatch<'a>> {
        self.routes.iter().find_map(|(pattern, action)| {
            let remainder = if pattern.ends_with('/') {
                path.strip_prefix(pattern.as_str())?
            } else if path == pattern {
                ""
            } else {
                return None;
            };
            Some(RouteMatch {
                action: *action,
                remainder,
            })
        })
    }
}

/// What a route remainder points at: a collection, optionally one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Collection identifier.
    pub collection: CollectionName,
    /// Document identity, if the remainder names one.
    pub id: Option<DocumentId>,
}

impl Target {
    /// Parses `<ns>.<coll>` or `<ns>.<coll>/<id>`.
    ///
    /// A trailing slash is allowed. A malformed identifier is a missing
    /// route; a malformed document id is a bad request.
    pub fn parse(remainder: &str) -> AdminResult<Self> {
        let remainder = remainder.strip_suffix('/').unwrap_or(remainder);
        let (collection, id) = match remainder.split_once('/') {
            Some((collection, id)) => (collection, Some(id)),
            None => (remainder, None),
        };

        let collection =
            CollectionName::parse(collection).map_err(|_| AdminError::RouteNotFound {
                path: remainder.to_string(),
            })?;
        let id = id
            .map(|id| {
                DocumentId::parse(id).ok_or_else(|| {
                    AdminError::InvalidRequest(format!("invalid document id: {id:?}"))
                })
            })
            .transpose()?;

        Ok(Self { collection, id })
    }

    /// Returns the document id, failing if the remainder named none.
    pub fn require_id(&self) -> AdminResult<DocumentId> {
        self.id.ok_or_else(|| {
            AdminError::InvalidRequest(format!("missing document id for {}", self.collection))
        })
    }

    /// Fails if the remainder named a document.
    pub fn forbid_id(&self) -> AdminResult<()> {
        match self.id {
            Some(id) => Err(AdminError::RouteNotFound {
                path: format!("{}/{id}", self.collection),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        Router::new(&RouteConfig::default())
    }

    #[test]
    fn longest_prefix_wins() {
        let router = router();

        let m = router.route("/list/db1.users").unwrap();
        assert_eq!(m.action, Action::List);
        assert_eq!(m.remainder, "db1.users");

        let m = router.route("/detail/db1.users/abc").unwrap();
        assert_eq!(m.action, Action::Detail);
        assert_eq!(m.remainder, "db1.users/abc");

        let m = router.route("/").unwrap();
        assert_eq!(m.action, Action::Index);
        assert_eq!(m.remainder, "");
    }

    #[test]
    fn root_catches_unknown_paths() {
        let m = router().route("/nowhere").unwrap();
        assert_eq!(m.action, Action::Index);
        assert_eq!(m.remainder, "nowhere");
    }

    #[test]
    fn exact_patterns() {
        let config = RouteConfig::default()
            .with_index("/admin")
            .with_list("/admin/list/");
        let router = Router::new(&config);

        assert_eq!(router.route("/admin").unwrap().action, Action::Index);
        assert!(router.route("/admin/other").is_none());
        assert_eq!(router.route("/admin/list/a.b").unwrap().remainder, "a.b");
        assert!(router.route("relative").is_none());
    }

    #[test]
    fn target_parsing() {
        let target = Target::parse("db1.users").unwrap();
        assert_eq!(target.collection.as_str(), "db1.users");
        assert_eq!(target.id, None);
        assert!(target.forbid_id().is_ok());
        assert!(target.require_id().is_err());

        let id = DocumentId::new();
        let target = Target::parse(&format!("db1.users/{id}/")).unwrap();
        assert_eq!(target.id, Some(id));
        assert_eq!(target.require_id().unwrap(), id);
        assert!(target.forbid_id().is_err());
    }

    #[test]
    fn target_errors() {
        assert!(matches!(
            Target::parse("users"),
            Err(AdminError::RouteNotFound { .. })
        ));
        assert!(matches!(
            Target::parse("db1.users/not-an-id"),
            Err(AdminError::InvalidRequest(_))
        ));
        assert!(matches!(Target::parse(""), Err(AdminError::RouteNotFound { .. })));
    }
}
