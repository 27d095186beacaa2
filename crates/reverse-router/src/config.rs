// File: src/config.rs
// Purpose: Route table parsing from TOML

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::route::Route;
use crate::router::Router;

/// Router configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Host hint new contexts start with (`scheme://host` or a bare host)
    #[serde(default)]
    pub default_host: Option<String>,

    /// Routes in priority order
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// One `[[routes]]` entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub name: String,
    pub pattern: String,
    pub target: String,

    /// Allowed methods, empty means any
    #[serde(default)]
    pub methods: Vec<String>,

    #[serde(default)]
    pub scheme: Option<String>,

    /// Host pattern, may contain `{basename}`
    #[serde(default)]
    pub host: Option<String>,

    /// Requirement overrides keyed by placeholder name
    #[serde(default)]
    pub requirements: BTreeMap<String, String>,

    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
}

impl RouterConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read router config: {:?}", path))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse router config: {:?}", path))
    }

    /// Parse configuration from an in-memory TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config = toml::from_str(content)?;
        Ok(config)
    }
}

impl RouteConfig {
    /// Compiles this entry into a [`Route`]
    ///
    /// Requirement overrides are applied before defaults so defaults are
    /// validated against the final requirements.
    pub fn build(&self) -> crate::Result<Route> {
        let mut route = Route::new(&self.pattern, self.target.as_str())?
            .with_methods(self.methods.iter().map(String::as_str));

        if let Some(scheme) = &self.scheme {
            route = route.with_scheme(scheme);
        }
        if let Some(host) = &self.host {
            route = route.with_host(host)?;
        }
        for (name, requirement) in &self.requirements {
            route = route.with_requirement(name, requirement)?;
        }
        for (name, value) in &self.defaults {
            route = route.with_default(name, value)?;
        }

        Ok(route)
    }
}

impl Router {
    /// Builds a router from configuration
    ///
    /// Routes that fail to compile are logged and skipped.
    pub fn from_config(config: &RouterConfig) -> Self {
        let router = Router::new()
            .with_default_host(config.default_host.clone().unwrap_or_default());

        config
            .routes
            .iter()
            .fold(router, |router, entry| match entry.build() {
                Ok(route) => router.with_route(entry.name.as_str(), route),
                Err(err) => {
                    warn!(route = %entry.name, error = %err, "skipping route");
                    router
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::Arguments;
    use crate::request::Request;
    use pretty_assertions::assert_eq;

    const ROUTES: &str = r#"
        default_host = "http://example.com"

        [[routes]]
        name = "blog_post"
        pattern = '/blog/{year:\d}/{slug}/'
        target = "blog::show"
        methods = ["get", "HEAD"]

        [routes.requirements]
        slug = "[a-z-]"

        [routes.defaults]
        format = "html"

        [[routes]]
        name = "broken"
        pattern = "/oops/{x:a+}/"
        target = "oops"

        [[routes]]
        name = "admin"
        pattern = "/admin/"
        target = "admin::index"
        scheme = "https"
        host = "admin.{basename}"
    "#;

    #[test]
    fn test_empty_config() {
        let config = RouterConfig::from_toml("  \n").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert!(Router::from_config(&config).is_empty());
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = RouterConfig::load("definitely/not/here/routes.toml").unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn test_parse_routes() {
        let config = RouterConfig::from_toml(ROUTES).unwrap();

        assert_eq!(config.default_host.as_deref(), Some("http://example.com"));
        assert_eq!(config.routes.len(), 3);
        assert_eq!(config.routes[0].methods, vec!["get", "HEAD"]);
        assert_eq!(config.routes[0].requirements.get("slug").map(String::as_str), Some("[a-z-]"));
        assert_eq!(config.routes[2].host.as_deref(), Some("admin.{basename}"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(RouterConfig::from_toml("[[routes]]\nname = ").is_err());
        // target is required
        assert!(RouterConfig::from_toml("[[routes]]\nname = \"a\"\npattern = \"/\"").is_err());
    }

    #[test]
    fn test_from_config_skips_broken_routes() {
        let router = Router::from_config(&RouterConfig::from_toml(ROUTES).unwrap());

        let names: Vec<&str> = router.routes().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["blog_post", "admin"]);
        assert_eq!(router.context().host(), "http://example.com");
    }

    #[test]
    fn test_configured_route_behaviour() {
        let router = Router::from_config(&RouterConfig::from_toml(ROUTES).unwrap());
        let route = router.route("blog_post").unwrap();

        assert_eq!(route.methods(), &["GET".to_string(), "HEAD".to_string()]);
        assert_eq!(route.requirement("slug"), Some("[a-z-]"));
        assert_eq!(route.defaults().get("format"), Some("html"));

        let mut session = router.session();
        assert!(session.dispatch(&mut Request::get("/blog/2024/hello-world/")).is_ok());
        assert!(session.dispatch(&mut Request::get("/blog/2024/hello_world/")).is_err());
        assert!(session.dispatch(&mut Request::post("/blog/2024/hello/")).is_err());

        let url = router
            .generate_url(
                &router.context(),
                "blog_post",
                &Arguments::new().with("year", 2024).with("slug", "hi"),
            )
            .unwrap();
        assert_eq!(url, "http://example.com/blog/2024/hi/");
    }

    #[test]
    fn test_build_rejects_invalid_default() {
        let entry = RouteConfig {
            name: "page".to_string(),
            pattern: r"/page/{id:\d}/".to_string(),
            target: "page".to_string(),
            defaults: BTreeMap::from([("id".to_string(), "abc".to_string())]),
            ..Default::default()
        };
        assert!(entry.build().is_err());
    }
}
