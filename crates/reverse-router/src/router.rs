/// Route registry, dispatch and URL generation
///
/// The [`Router`] is built once at startup and only read afterwards. Anything
/// that depends on the request being served (the matched route, its
/// arguments, host, locale and format) lives in a [`RouterContext`] owned by
/// the caller, typically through a [`Session`].

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::arguments::Arguments;
use crate::error::{Result, RouteError};
use crate::request::{ArgumentStore, RequestInfo};
use crate::route::Route;

/// Per-request routing state
///
/// Snapshot taken after a successful dispatch; consulted when generating
/// self links and by callers needing the active locale or format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterContext {
    host: String,
    route_name: Option<String>,
    locale: Option<String>,
    format: Option<String>,
    arguments: Arguments,
}

impl RouterContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the host hint used for absolute URLs before any dispatch
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Host hint, `scheme://host` or a bare host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Name of the last dispatched route
    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Arguments of the last dispatched route
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }
}

/// Ordered registry of named routes
///
/// Registration order is match priority: the first registered route that
/// matches wins.
///
/// # Examples
///
/// ```
/// use reverse_router::{Arguments, Request, Route, Router};
///
/// let router = Router::new()
///     .with_route("router_foo_bar", Route::new(r"/router/{foo}/{bar:\d}/", "foo::bar").unwrap());
///
/// let mut session = router.session();
/// let mut request = Request::get("/router/foo/123/").with_host("http://test.com");
///
/// assert_eq!(session.dispatch(&mut request).unwrap(), "foo::bar");
///
/// let url = session
///     .generate_url("", &Arguments::new().with("foo", "foo").with("bar", 123))
///     .unwrap();
/// assert_eq!(url, "http://test.com/router/foo/123/");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<(String, Route)>,
    names: HashMap<String, usize>,
    default_host: String,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host hint every new [`RouterContext`] starts with
    pub fn with_default_host(mut self, host: impl Into<String>) -> Self {
        self.default_host = host.into();
        self
    }

    /// Adds a route (builder style)
    pub fn with_route(mut self, name: impl Into<String>, route: Route) -> Self {
        self.add_route(name, route);
        self
    }

    /// Adds a route under `name`
    ///
    /// Registering a name twice replaces the earlier route in place, keeping
    /// its priority slot.
    pub fn add_route(&mut self, name: impl Into<String>, mut route: Route) {
        let name = name.into();
        route.set_name(&name);

        match self.names.get(&name) {
            Some(&idx) => {
                warn!(route = %name, "route registered twice, replacing the earlier definition");
                self.routes[idx].1 = route;
            }
            None => {
                debug!(route = %name, pattern = %route.pattern().template(), "registered route");
                self.names.insert(name.clone(), self.routes.len());
                self.routes.push((name, route));
            }
        }
    }

    /// Gets a route by its name
    pub fn route(&self, name: &str) -> Option<&Route> {
        self.names.get(name).map(|&idx| &self.routes[idx].1)
    }

    /// Routes in priority order
    pub fn routes(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.routes.iter().map(|(name, route)| (name.as_str(), route))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// A fresh per-request context
    pub fn context(&self) -> RouterContext {
        RouterContext::new().with_host(self.default_host.clone())
    }

    /// A per-request session over this router
    pub fn session(&self) -> Session<'_> {
        Session {
            router: self,
            context: self.context(),
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Finds the first route matching `request`
    ///
    /// On success the matched arguments are merged into the request's argument
    /// store (existing entries that are not overwritten stay), `context` is
    /// refreshed and the route's target is returned.
    pub fn dispatch<'r, R>(&'r self, request: &mut R, context: &mut RouterContext) -> Result<&'r str>
    where
        R: RequestInfo + ArgumentStore + ?Sized,
    {
        for (name, route) in &self.routes {
            let Some(matched) = route.matches(&*request) else {
                trace!(route = %name, path = %request.path(), "route rejected request");
                continue;
            };

            for (key, value) in matched.arguments().iter() {
                if let Some(value) = value {
                    request.set_argument(key, value);
                }
            }

            // a request without host keeps the configured one
            let host = match request.host() {
                "" => std::mem::take(&mut context.host),
                host => host.to_string(),
            };

            *context = RouterContext {
                host,
                route_name: Some(name.clone()),
                locale: request.locale().map(str::to_string),
                format: request.format().map(str::to_string),
                arguments: matched.into_arguments(),
            };

            debug!(route = %name, target = %route.target(), path = %request.path(), "dispatched request");
            return Ok(route.target());
        }

        Err(RouteError::RouteNotFound(request.path().to_string()))
    }

    // ========================================================================
    // URL Generation
    // ========================================================================

    /// Generates a URL for a route name or target identifier
    ///
    /// An empty `name_or_target` means the route of the last dispatch (self
    /// link). A registered name is used directly; otherwise the first route
    /// whose target equals `name_or_target` and that accepts `arguments` is
    /// used. The arguments of the last dispatch fill gaps for the dispatched
    /// route only.
    pub fn generate_url(
        &self,
        context: &RouterContext,
        name_or_target: &str,
        arguments: &Arguments,
    ) -> Result<String> {
        self.generate(context, name_or_target, arguments, false)
    }

    /// Like [`Router::generate_url`], preferring a relative URL
    pub fn generate_relative_url(
        &self,
        context: &RouterContext,
        name_or_target: &str,
        arguments: &Arguments,
    ) -> Result<String> {
        self.generate(context, name_or_target, arguments, true)
    }

    /// Convenience method for generating URLs from parameter tuples
    pub fn url_for_params(
        &self,
        context: &RouterContext,
        name_or_target: &str,
        params: &[(&str, &str)],
    ) -> Result<String> {
        let arguments: Arguments = params.iter().copied().collect();
        self.generate_url(context, name_or_target, &arguments)
    }

    fn generate(
        &self,
        context: &RouterContext,
        name_or_target: &str,
        arguments: &Arguments,
        force_relative: bool,
    ) -> Result<String> {
        let name = if name_or_target.is_empty() {
            context.route_name().ok_or(RouteError::NoDefaultRoute)?
        } else {
            name_or_target
        };

        let empty = Arguments::new();
        // only the dispatched route sees the current arguments
        let current_for = |route: &Route| {
            if context.route_name() == route.name() {
                context.arguments()
            } else {
                &empty
            }
        };

        let route = match self.route(name) {
            Some(route) => route,
            None => self
                .routes
                .iter()
                .map(|(_, route)| route)
                .find(|&route| route.check_from(current_for(route), name, arguments))
                .ok_or_else(|| RouteError::RouteNotFound(name.to_string()))?,
        };

        let url = route.make_from(current_for(route), context.host(), arguments, force_relative)?;
        debug!(route = %route.name().unwrap_or_default(), %url, "generated url");
        Ok(url)
    }
}

/// A router paired with the routing state of one request
///
/// # Examples
///
/// ```
/// use reverse_router::{Arguments, Request, Route, Router, RouteError};
///
/// let router = Router::new().with_route("home", Route::new("/", "home").unwrap());
/// let mut session = router.session();
///
/// assert_eq!(session.generate_url("", &Arguments::new()), Err(RouteError::NoDefaultRoute));
///
/// session.dispatch(&mut Request::get("/")).unwrap();
/// assert_eq!(session.context().route_name(), Some("home"));
/// ```
#[derive(Debug, Clone)]
pub struct Session<'r> {
    router: &'r Router,
    context: RouterContext,
}

impl<'r> Session<'r> {
    pub fn router(&self) -> &'r Router {
        self.router
    }

    pub fn context(&self) -> &RouterContext {
        &self.context
    }

    pub fn into_context(self) -> RouterContext {
        self.context
    }

    /// See [`Router::dispatch`]
    pub fn dispatch<R>(&mut self, request: &mut R) -> Result<&'r str>
    where
        R: RequestInfo + ArgumentStore + ?Sized,
    {
        self.router.dispatch(request, &mut self.context)
    }

    /// See [`Router::generate_url`]
    pub fn generate_url(&self, name_or_target: &str, arguments: &Arguments) -> Result<String> {
        self.router
            .generate_url(&self.context, name_or_target, arguments)
    }

    /// See [`Router::generate_relative_url`]
    pub fn generate_relative_url(&self, name_or_target: &str, arguments: &Arguments) -> Result<String> {
        self.router
            .generate_relative_url(&self.context, name_or_target, arguments)
    }
}
