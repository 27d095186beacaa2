//! # Reverse Router
//!
//! A bidirectional URL router. One template such as
//! `/blog/{year:\d}/{slug}/({page:\d}/)` drives both directions:
//! - **Dispatch**: match an inbound request (path, method, scheme, host) and
//!   capture its arguments
//! - **Generation**: build a relative or absolute URL from a route name or
//!   target identifier plus arguments
//!
//! ## Template Grammar
//!
//! - `{name}`: required placeholder, default requirement `[a-z0-9\-._]`
//! - `{name:regex}`: required placeholder with a custom requirement
//! - `({name:regex}literal)`: optional placeholder; `literal` is only emitted
//!   when the placeholder has a value
//!
//! A requirement describes a single unit and must not end in `+`, `*` or `?`;
//! the router applies the repetition itself. Matching is case-insensitive and
//! tolerates a missing trailing slash. Generation validates raw values against
//! the requirement, then slugifies them.
//!
//! ## Request State
//!
//! Routes and the [`Router`] are immutable once registered. Per-request state
//! (matched route, arguments, host, locale, format) lives in a
//! [`RouterContext`], usually held by a [`Session`], so a router can be shared
//! between threads.
//!
//! ## Example
//!
//! ```
//! use reverse_router::{Arguments, Request, Route, Router};
//!
//! let router = Router::new()
//!     .with_route("post", Route::new(r"/blog/{year:\d}/{slug:[^/]}/", "blog::show").unwrap());
//!
//! let mut session = router.session();
//! let mut request = Request::get("/blog/2024/hello-world/").with_host("https://example.com");
//!
//! assert_eq!(session.dispatch(&mut request).unwrap(), "blog::show");
//! assert_eq!(request.arguments().get("slug"), Some("hello-world"));
//!
//! let url = session
//!     .generate_url("post", &Arguments::new().with("year", 2025).with("slug", "Ünïcode Títle"))
//!     .unwrap();
//! assert_eq!(url, "https://example.com/blog/2025/unicode-title/");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod arguments;
mod config;
mod error;
pub mod path;
pub mod pattern;
mod request;
mod route;
mod router;
mod slug;

// Re-export public types
pub use arguments::Arguments;
pub use config::{RouteConfig, RouterConfig};
pub use error::{Result, RouteError};
pub use path::normalize_path;
pub use pattern::{compile, CompiledPattern, PatternSegment, PlaceholderSpec, DEFAULT_REQUIREMENT};
pub use request::{ArgumentStore, Request, RequestInfo};
pub use route::{MatchResult, Route, BASENAME_TOKEN};
pub use router::{Router, RouterContext, Session};
pub use slug::slugify;
