/// Compiled routes
///
/// A [`Route`] is built once at registration time and is immutable while
/// requests are served: the matching regex, the per-placeholder validators and
/// the host regex are compiled eagerly and cached on the value. Arguments
/// captured by a match are returned in a [`MatchResult`] instead of being
/// written back onto the route, so one route can serve concurrent requests.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::arguments::Arguments;
use crate::error::{Result, RouteError};
use crate::path::{collapse_slashes, split_host_hint, trim_relative_prefix};
use crate::pattern::parser::check_requirement;
use crate::pattern::{compile, CompiledPattern, PatternSegment, PlaceholderSpec};
use crate::request::RequestInfo;
use crate::slug::slugify;

/// Token in a host pattern standing for the host known at generation time
pub const BASENAME_TOKEN: &str = "{basename}";

const DEFAULT_SCHEME: &str = "http";

/// Host constraint, e.g. `sub.{basename}`
#[derive(Debug, Clone)]
struct HostPattern {
    template: String,
    regex: Regex,
}

impl HostPattern {
    fn compile(template: &str) -> Result<Self> {
        let expr = template
            .split(BASENAME_TOKEN)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".+");

        let regex = RegexBuilder::new(&format!("^{expr}$"))
            .case_insensitive(true)
            .build()
            .map_err(|err| RouteError::pattern(template, format!("invalid host pattern: {err}")))?;

        Ok(Self {
            template: template.to_string(),
            regex,
        })
    }

    fn matches(&self, host: &str) -> bool {
        let (_, host) = split_host_hint(host);
        self.regex.is_match(host)
    }

    fn resolve(&self, host: &str) -> String {
        self.template.replace(BASENAME_TOKEN, host)
    }
}

/// Arguments produced by a successful match
///
/// Holds the route defaults overlaid with every placeholder of the pattern:
/// captured values, or `None` for optional placeholders that were absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    arguments: Arguments,
}

impl MatchResult {
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.arguments.get(name)
    }

    pub fn into_arguments(self) -> Arguments {
        self.arguments
    }
}

/// A route template bound to a target identifier
///
/// # Examples
///
/// ```
/// use reverse_router::{Arguments, Route};
///
/// let route = Route::new(r"/foo/{bar:\d}/({yada:\w}/)", "foo::show").unwrap();
///
/// let matched = route.match_path("/foo/123/abc/").unwrap();
/// assert_eq!(matched.get("bar"), Some("123"));
/// assert_eq!(matched.get("yada"), Some("abc"));
///
/// let url = route.make("", matched.arguments(), true).unwrap();
/// assert_eq!(url, "./foo/123/abc/");
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    name: Option<String>,
    target: String,
    pattern: CompiledPattern,
    requirements: HashMap<String, String>,
    defaults: Arguments,
    scheme: Option<String>,
    methods: Vec<String>,
    host: Option<HostPattern>,
    matcher: Regex,
    validators: Vec<Regex>,
}

impl Route {
    /// Compiles `template` into a route resolving to `target`
    pub fn new(template: &str, target: impl Into<String>) -> Result<Self> {
        let pattern = compile(template)?;
        let requirements: HashMap<String, String> = pattern
            .placeholders()
            .iter()
            .map(|p| (p.name.clone(), p.requirement.clone()))
            .collect();
        let (matcher, validators) = build_matchers(&pattern, &requirements)?;

        Ok(Route {
            name: None,
            target: target.into(),
            pattern,
            requirements,
            defaults: Arguments::new(),
            scheme: None,
            methods: Vec::new(),
            host: None,
            matcher,
            validators,
        })
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Restricts the route to the given HTTP methods (case-insensitive)
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for method in methods {
            let method = method.as_ref().to_ascii_uppercase();
            if !self.methods.contains(&method) {
                self.methods.push(method);
            }
        }
        self
    }

    /// Requires the request scheme to contain `scheme` (`http` accepts
    /// `HTTP/1.1`)
    pub fn with_scheme(mut self, scheme: impl AsRef<str>) -> Self {
        self.scheme = Some(scheme.as_ref().to_ascii_lowercase());
        self
    }

    /// Restricts the route to hosts matching `pattern`; `{basename}` matches
    /// any host and is replaced by the host hint when generating URLs
    pub fn with_host(mut self, pattern: &str) -> Result<Self> {
        self.host = Some(HostPattern::compile(pattern)?);
        Ok(self)
    }

    /// Overrides the requirement of placeholder `name`
    pub fn with_requirement(mut self, name: &str, requirement: &str) -> Result<Self> {
        if !self.pattern.has_placeholder(name) {
            return Err(RouteError::pattern(
                self.pattern.template(),
                format!("unknown placeholder `{name}`"),
            ));
        }
        check_requirement(self.pattern.template(), name, requirement)?;

        self.requirements
            .insert(name.to_string(), requirement.to_string());
        let (matcher, validators) = build_matchers(&self.pattern, &self.requirements)?;

        if let (Some(idx), Some(value)) = (self.pattern.position(name), self.defaults.get(name)) {
            if !validators[idx].is_match(value) {
                return Err(RouteError::pattern(
                    self.pattern.template(),
                    format!("default {value:?} does not satisfy the requirement of `{name}`"),
                ));
            }
        }

        self.matcher = matcher;
        self.validators = validators;
        Ok(self)
    }

    /// Sets a default argument
    ///
    /// Defaults fill placeholders missing from generation arguments and are
    /// merged into the request store on every match. A default for a
    /// placeholder must satisfy its requirement.
    pub fn with_default(mut self, name: &str, value: impl ToString) -> Result<Self> {
        let value = value.to_string();
        if let Some(idx) = self.pattern.position(name) {
            if !self.validators[idx].is_match(&value) {
                return Err(RouteError::pattern(
                    self.pattern.template(),
                    format!("default {value:?} does not satisfy the requirement of `{name}`"),
                ));
            }
        }
        self.defaults.set(name, Some(value));
        Ok(self)
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Registration name, set when the route is added to a router
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    pub fn placeholders(&self) -> &[PlaceholderSpec] {
        self.pattern.placeholders()
    }

    /// Effective requirement of placeholder `name`
    pub fn requirement(&self, name: &str) -> Option<&str> {
        self.requirements.get(name).map(String::as_str)
    }

    pub fn defaults(&self) -> &Arguments {
        &self.defaults
    }

    /// Allowed methods, upper-cased; empty means any
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn host_pattern(&self) -> Option<&str> {
        self.host.as_ref().map(|h| h.template.as_str())
    }

    /// The anchored, case-insensitive regex used by [`Route::match_path`]
    pub fn regex(&self) -> &Regex {
        &self.matcher
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.pattern.template())
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Matches a request against the scheme, method and host constraints,
    /// then against the path
    ///
    /// A mismatch is `None`; it is the normal "try the next route" signal.
    pub fn matches<R: RequestInfo + ?Sized>(&self, request: &R) -> Option<MatchResult> {
        if let Some(scheme) = &self.scheme {
            if !request.scheme().to_ascii_lowercase().contains(scheme.as_str()) {
                return None;
            }
        }

        if !self.methods.is_empty() {
            let method = request.method().to_ascii_uppercase();
            if !self.methods.contains(&method) {
                return None;
            }
        }

        if let Some(host) = &self.host {
            if !host.matches(request.host()) {
                return None;
            }
        }

        self.match_path(request.path())
    }

    /// Matches a path only, ignoring scheme, method and host constraints
    pub fn match_path(&self, path: &str) -> Option<MatchResult> {
        let captures = self.matcher.captures(path)?;

        let mut arguments = self.defaults.clone();
        for spec in self.pattern.placeholders() {
            let value = captures
                .name(&spec.name)
                .map(|m| m.as_str())
                .filter(|value| !value.is_empty())
                .map(str::to_string);
            arguments.set(spec.name.clone(), value);
        }

        Some(MatchResult { arguments })
    }

    // ========================================================================
    // Reverse Routing
    // ========================================================================

    /// Tells whether this route resolves to `target` and can be generated
    /// from `arguments`
    ///
    /// Uses the same value lookup and validation as [`Route::make`], so
    /// `check` is true exactly when `make` would not fail validation.
    pub fn check(&self, target: &str, arguments: &Arguments) -> bool {
        self.check_from(&Arguments::new(), target, arguments)
    }

    /// Like [`Route::check`], with `current` consulted as in
    /// [`Route::make_from`]
    pub fn check_from(&self, current: &Arguments, target: &str, arguments: &Arguments) -> bool {
        self.target == target && self.resolve_values(Some(current), arguments).is_ok()
    }

    /// Generates a URL from `arguments`, falling back to route defaults
    ///
    /// Without a host pattern, an empty `host_hint` or `force_relative` yields
    /// a `./`-prefixed relative URL. Otherwise the URL is absolute and the host
    /// hint (`scheme://host` or a bare host) is substituted into the host
    /// pattern's `{basename}` token.
    pub fn make(&self, host_hint: &str, arguments: &Arguments, force_relative: bool) -> Result<String> {
        self.make_from(&Arguments::new(), host_hint, arguments, force_relative)
    }

    /// Like [`Route::make`], with `current` consulted between the caller's
    /// arguments and the route defaults
    ///
    /// Only caller arguments that are not placeholders end up in the query
    /// string; `current` and defaults only ever fill placeholders.
    pub fn make_from(
        &self,
        current: &Arguments,
        host_hint: &str,
        arguments: &Arguments,
        force_relative: bool,
    ) -> Result<String> {
        let values = self.resolve_values(Some(current), arguments)?;

        let mut path = String::new();
        for segment in self.pattern.segments() {
            match segment {
                PatternSegment::Literal(text) => path.push_str(text),
                PatternSegment::Placeholder(idx) => {
                    if let Some(value) = &values[*idx] {
                        path.push_str(value);
                        path.push_str(&self.pattern.placeholders()[*idx].trailing_literal);
                    }
                }
            }
        }

        let path = collapse_slashes(trim_relative_prefix(&path)).into_owned();
        let mut url = self.resolve_host(host_hint, path.trim_start_matches('/'), force_relative)?;

        let query = self.query_string(arguments);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        Ok(url)
    }

    /// Picks, validates and slugifies one value per placeholder
    ///
    /// A raw value must satisfy its requirement and must not slugify to an
    /// empty string.
    fn resolve_values(
        &self,
        current: Option<&Arguments>,
        arguments: &Arguments,
    ) -> Result<Vec<Option<String>>> {
        self.pattern
            .placeholders()
            .iter()
            .zip(&self.validators)
            .map(|(spec, validator)| {
                let value = arguments
                    .lookup(&spec.name)
                    .or_else(|| current.and_then(|c| c.lookup(&spec.name)))
                    .or_else(|| self.defaults.lookup(&spec.name))
                    .flatten()
                    .filter(|value| !value.is_empty());

                let slug = value
                    .filter(|value| validator.is_match(value))
                    .map(slugify)
                    .filter(|slug| !slug.is_empty());

                match (value, slug) {
                    (_, Some(slug)) => Ok(Some(slug)),
                    (None, None) if spec.optional => Ok(None),
                    (value, None) => Err(RouteError::ArgumentValidation {
                        route: self.display_name().to_string(),
                        placeholder: spec.name.clone(),
                        value: value.map(str::to_string),
                    }),
                }
            })
            .collect()
    }

    fn query_string(&self, arguments: &Arguments) -> String {
        arguments
            .iter()
            .filter(|(key, _)| !self.pattern.has_placeholder(key))
            .filter_map(|(key, value)| {
                value.map(|value| {
                    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
                })
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    fn resolve_host(&self, host_hint: &str, path: &str, force_relative: bool) -> Result<String> {
        match &self.host {
            None if force_relative || host_hint.is_empty() => Ok(format!("./{path}")),
            Some(_) if host_hint.is_empty() => Err(RouteError::MissingHost {
                route: self.display_name().to_string(),
            }),
            host => {
                let (scheme, hint_host) = split_host_hint(host_hint);
                let scheme = scheme
                    .or(self.scheme.as_deref())
                    .unwrap_or(DEFAULT_SCHEME);
                let host = match host {
                    Some(pattern) => pattern.resolve(hint_host),
                    None => hint_host.to_string(),
                };
                Ok(format!("{scheme}://{host}/{path}"))
            }
        }
    }
}

/// Builds the path regex and one validator per placeholder
///
/// Required placeholders become `(?P<name>(?:req)+)`, optional ones
/// `(?:(?P<name>(?:req)*)literal)?`. The whole expression is anchored,
/// case-insensitive, and tolerates one trailing `/`.
fn build_matchers(
    pattern: &CompiledPattern,
    requirements: &HashMap<String, String>,
) -> Result<(Regex, Vec<Regex>)> {
    let requirement_of = |spec: &PlaceholderSpec| -> String {
        requirements
            .get(&spec.name)
            .cloned()
            .unwrap_or_else(|| spec.requirement.clone())
    };

    let segments = pattern.segments();
    let mut expr = String::from("^");

    for (position, segment) in segments.iter().enumerate() {
        let is_last = position + 1 == segments.len();
        match segment {
            PatternSegment::Literal(text) => {
                let text = if is_last { strip_trailing_slash(text) } else { text };
                expr.push_str(&regex::escape(text));
            }
            PatternSegment::Placeholder(idx) => {
                let spec = &pattern.placeholders()[*idx];
                let requirement = requirement_of(spec);
                if spec.optional {
                    let literal = if is_last {
                        strip_trailing_slash(&spec.trailing_literal)
                    } else {
                        &spec.trailing_literal
                    };
                    expr.push_str(&format!(
                        "(?:(?P<{}>(?:{})*){})?",
                        spec.name,
                        requirement,
                        regex::escape(literal)
                    ));
                } else {
                    expr.push_str(&format!("(?P<{}>(?:{})+)", spec.name, requirement));
                }
            }
        }
    }
    expr.push_str("/?$");

    let matcher = case_insensitive(pattern.template(), &expr)?;
    let validators = pattern
        .placeholders()
        .iter()
        .map(|spec| case_insensitive(pattern.template(), &format!("^(?:{})+$", requirement_of(spec))))
        .collect::<Result<Vec<_>>>()?;

    Ok((matcher, validators))
}

fn strip_trailing_slash(text: &str) -> &str {
    text.strip_suffix('/').unwrap_or(text)
}

fn case_insensitive(template: &str, expr: &str) -> Result<Regex> {
    RegexBuilder::new(expr)
        .case_insensitive(true)
        .build()
        .map_err(|err| RouteError::pattern(template, err.to_string()))
}
