//! Integration tests for reverse-router
//!
//! Tests are organized by feature area and cover:
//! - Pattern compilation and quantifier rejection
//! - Matching with optional segments and request constraints
//! - Check / Make symmetry
//! - Dispatch and self links
//! - Host substitution and relative URLs
//! - Configuration-driven routers

use pretty_assertions::assert_eq;
use reverse_router::*;
use rstest::rstest;

fn foo_route() -> Route {
    Route::new(r"/foo/{bar:\d}/({yada:\w}/)", "foo::show").unwrap()
}

// ============================================================================
// Compilation
// ============================================================================

#[rstest]
#[case(r"/foo/{bar:.?}/")]
#[case(r"/foo/{bar:.*}/")]
#[case(r"/foo/{bar:.+}/")]
#[case(r"/foo/({bar:\d+}/)")]
fn test_quantifier_rejection(#[case] template: &str) {
    assert!(matches!(
        Route::new(template, "foo"),
        Err(RouteError::PatternConfiguration { .. })
    ));
}

#[test]
fn test_compile_is_deterministic() {
    let template = r"/blog/{year:\d}/{slug}/({page:\d}/)";
    assert_eq!(compile(template).unwrap(), compile(template).unwrap());
}

#[test]
fn test_compiled_pattern_shape() {
    let pattern = compile(r"/foo/{bar:\d}/({yada:\w}/)").unwrap();

    assert_eq!(
        pattern.placeholders(),
        &[
            PlaceholderSpec::required("bar", r"\d"),
            PlaceholderSpec::optional("yada", r"\w", "/"),
        ]
    );
    assert_eq!(pattern.skeleton(), "/foo/{0}/{1}");
}

#[test]
fn test_default_requirement() {
    let pattern = compile("/tags/{tag}/").unwrap();
    assert_eq!(pattern.placeholders()[0].requirement, DEFAULT_REQUIREMENT);
}

// ============================================================================
// Matching
// ============================================================================

#[test]
fn test_optional_segment_absent() {
    let matched = foo_route().match_path("/foo/1/").unwrap();
    assert_eq!(matched.get("bar"), Some("1"));
    assert_eq!(matched.arguments().lookup("yada"), Some(None));
}

#[test]
fn test_optional_segment_present() {
    let matched = foo_route().match_path("/foo/123/abc/").unwrap();
    assert_eq!(matched.get("bar"), Some("123"));
    assert_eq!(matched.get("yada"), Some("abc"));
}

#[rstest]
#[case("/foo/1/")]
#[case("/FOO/1/")]
#[case("/foo/1/abc")]
fn test_trailing_slash_and_case_tolerance(#[case] path: &str) {
    assert!(foo_route().match_path(path).is_some());
}

#[rstest]
#[case("/foo/")]
#[case("/foo/1")]
#[case("/foo/x/")]
#[case("/foo/1/abc/extra/")]
#[case("/bar/1/")]
fn test_non_matching_paths(#[case] path: &str) {
    assert!(foo_route().match_path(path).is_none());
}

#[test]
fn test_constraint_gating_method() {
    let route = foo_route().with_methods(["POST"]);

    assert!(route.matches(&Request::get("/foo/1/")).is_none());
    assert!(route.matches(&Request::post("/foo/1/")).is_some());
}

#[test]
fn test_constraint_gating_host_and_scheme() {
    let route = foo_route()
        .with_scheme("https")
        .with_host("sub.{basename}")
        .unwrap();

    let request = Request::get("/foo/1/").with_host("sub.host.com");
    assert!(route.matches(&request).is_none());

    let request = request.with_scheme("https");
    assert!(route.matches(&request).is_some());

    let request = Request::get("/foo/1/").with_scheme("https").with_host("host.com");
    assert!(route.matches(&request).is_none());
}

// ============================================================================
// Generation
// ============================================================================

#[test]
fn test_no_host_relative_scenario() {
    let route = Route::new("/foo/", "foo").unwrap();
    assert_eq!(route.make("", &Arguments::new(), true).unwrap(), "./foo/");
    assert_eq!(route.make("", &Arguments::new(), false).unwrap(), "./foo/");
}

#[test]
fn test_host_substitution_scenario() {
    let route = Route::new("/foo/", "foo")
        .unwrap()
        .with_host("sub.{basename}")
        .unwrap();

    assert_eq!(
        route.make("http://host.com", &Arguments::new(), false).unwrap(),
        "http://sub.host.com/foo/"
    );
    assert_eq!(
        route.make("", &Arguments::new(), false).unwrap_err(),
        RouteError::MissingHost {
            route: "/foo/".to_string()
        }
    );
}

#[rstest]
#[case(Arguments::new().with("bar", 1))]
#[case(Arguments::new().with("bar", 1).with("yada", "abc"))]
#[case(Arguments::new().with("bar", "x"))]
#[case(Arguments::new().with("yada", "abc"))]
#[case(Arguments::new().with("bar", 1).with("yada", "a-b"))]
#[case(Arguments::new().with("bar", 1).with_unset("yada"))]
fn test_check_make_symmetry(#[case] arguments: Arguments) {
    let route = foo_route();
    let made = route.make("", &arguments, true);

    assert_eq!(route.check("foo::show", &arguments), made.is_ok());
    if let Err(err) = made {
        assert!(matches!(err, RouteError::ArgumentValidation { .. }));
    }
}

#[test]
fn test_check_requires_target() {
    let arguments = Arguments::new().with("bar", 1);
    assert!(!foo_route().check("other::target", &arguments));
}

#[rstest]
#[case("/foo/1/")]
#[case("/foo/123/abc/")]
#[case("/foo/42/x")]
#[case("/foo/7/x/")]
fn test_round_trip(#[case] path: &str) {
    let route = foo_route();
    let matched = route.match_path(path).unwrap();
    let made = route.make("", matched.arguments(), true).unwrap();

    assert_eq!(normalize_path(&made), normalize_path(path));
}

#[rstest]
#[case("/router/foo/1/")]
#[case("/router/foo--bar/1/")]
#[case("/router/-foo/1/")]
#[case("/router/foo-/1/")]
#[case("/router/a.b_c/1/")]
fn test_round_trip_keeps_dashes(#[case] path: &str) {
    let route = Route::new(r"/router/{foo}/{bar:\d}/", "router::foo_bar").unwrap();
    let matched = route.match_path(path).unwrap();
    let made = route.make("", matched.arguments(), true).unwrap();

    assert_eq!(normalize_path(&made), normalize_path(path));
}

#[test]
fn test_make_rejects_value_without_slug() {
    let route = Route::new("/post/{title:.}/x/", "post").unwrap();
    let arguments = Arguments::new().with("title", "!!!");

    assert!(matches!(
        route.make("", &arguments, true),
        Err(RouteError::ArgumentValidation { .. })
    ));
    assert!(!route.check("post", &arguments));
}

#[test]
fn test_extra_arguments_in_query() {
    let route = foo_route();
    let url = route
        .make(
            "example.com",
            &Arguments::new().with("bar", 5).with("sort", "new first"),
            false,
        )
        .unwrap();
    assert_eq!(url, "http://example.com/foo/5/?sort=new%20first");
}

// ============================================================================
// Router
// ============================================================================

fn router() -> Router {
    Router::new()
        .with_route(
            "router_foo_bar",
            Route::new(r"/router/{foo}/{bar:\d}/", "router::foo_bar").unwrap(),
        )
        .with_route("foo", foo_route())
}

#[test]
fn test_self_link_scenario() {
    let router = router();
    let mut session = router.session();
    let mut request = Request::get("/router/foo/123/").with_host("http://test.com");

    assert_eq!(session.dispatch(&mut request).unwrap(), "router::foo_bar");
    assert_eq!(session.context().route_name(), Some("router_foo_bar"));

    let url = session
        .generate_url("", &Arguments::new().with("foo", "foo").with("bar", 123))
        .unwrap();
    assert_eq!(url, "http://test.com/router/foo/123/");
}

#[test]
fn test_dispatch_writes_request_arguments() {
    let router = router();
    let mut session = router.session();
    let mut request = Request::get("/foo/9/zz/");

    assert_eq!(session.dispatch(&mut request).unwrap(), "foo::show");
    assert_eq!(request.argument("bar"), Some("9"));
    assert_eq!(request.argument("yada"), Some("zz"));
}

#[test]
fn test_dispatch_not_found() {
    let router = router();
    let err = router
        .dispatch(&mut Request::get("/missing/"), &mut RouterContext::new())
        .unwrap_err();
    assert_eq!(err, RouteError::RouteNotFound("/missing/".to_string()));
}

#[test]
fn test_generate_by_target() {
    let router = router();
    let context = RouterContext::new();

    let url = router
        .generate_relative_url(&context, "foo::show", &Arguments::new().with("bar", 3))
        .unwrap();
    assert_eq!(url, "./foo/3/");
}

#[test]
fn test_sessions_are_independent() {
    let router = router();
    let mut first = router.session();
    let second = router.session();

    first.dispatch(&mut Request::get("/foo/1/")).unwrap();

    assert_eq!(first.context().route_name(), Some("foo"));
    assert_eq!(second.context().route_name(), None);
    assert_eq!(
        second.generate_url("", &Arguments::new()).unwrap_err(),
        RouteError::NoDefaultRoute
    );
}

#[test]
fn test_router_is_shareable_between_threads() {
    let router = std::sync::Arc::new(router());

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let router = router.clone();
            std::thread::spawn(move || {
                let mut session = router.session();
                let path = format!("/foo/{n}/");
                session.dispatch(&mut Request::get(path)).unwrap();
                session.generate_url("", &Arguments::new()).unwrap()
            })
        })
        .collect();

    let urls: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(urls, vec!["./foo/0/", "./foo/1/", "./foo/2/", "./foo/3/"]);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_router_from_config() {
    let config = RouterConfig::from_toml(
        r#"
        default_host = "https://shop.test"

        [[routes]]
        name = "product"
        pattern = '/p/{id:\d}/({variant:[^/]}/)'
        target = "shop::product"
        methods = ["GET"]
        "#,
    )
    .unwrap();
    let router = Router::from_config(&config);

    let mut session = router.session();
    let mut request = Request::get("/p/10/red/");
    assert_eq!(session.dispatch(&mut request).unwrap(), "shop::product");

    let url = session
        .generate_url("", &Arguments::new().with("variant", "Dark Blue"))
        .unwrap();
    assert_eq!(url, "https://shop.test/p/10/dark-blue/");
}
