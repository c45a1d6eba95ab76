//! Routes command implementation.

use super::Format;
use docadmin_server::RouteConfig;
use serde::Serialize;

/// One row of the route table.
#[derive(Debug, Serialize)]
pub struct RouteEntry {
    /// Action name.
    pub action: &'static str,
    /// Path prefix.
    pub path: String,
}

/// Builds the route table, optionally mounted under `prefix`.
pub fn route_config(prefix: Option<&str>) -> Result<RouteConfig, Box<dyn std::error::Error>> {
    let routes = RouteConfig::default();
    let Some(prefix) = prefix else {
        return Ok(routes);
    };

    let prefix = prefix.trim_end_matches('/');
    let mount = |path: &str| format!("{prefix}{path}");
    let routes = RouteConfig {
        index: mount(&routes.index),
        list: mount(&routes.list),
        update: mount(&routes.update),
        create: mount(&routes.create),
        detail: mount(&routes.detail),
    };
    routes.validate()?;
    Ok(routes)
}

/// Runs the routes command.
pub fn run(routes: &RouteConfig, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let entries: Vec<RouteEntry> = routes
        .entries()
        .into_iter()
        .map(|(action, path)| RouteEntry {
            action,
            path: path.to_string(),
        })
        .collect();

    match Format::parse(format)? {
        Format::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        Format::Text => {
            for entry in &entries {
                println!("{:<8} {}", entry.action, entry.path);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_routes_without_prefix() {
        assert_eq!(route_config(None).unwrap(), RouteConfig::default());
    }

    #[test]
    fn prefix_mounts_every_route() {
        let routes = route_config(Some("/admin/")).unwrap();
        assert_eq!(routes.index, "/admin/");
        assert_eq!(routes.list, "/admin/list/");
        assert_eq!(routes.detail, "/admin/detail/");
    }

    #[test]
    fn relative_prefix_is_rejected() {
        assert!(route_config(Some("admin")).is_err());
    }
}
