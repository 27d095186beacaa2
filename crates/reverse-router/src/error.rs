/// Errors raised while compiling, matching or generating routes
///
/// A failed match is not an error: `Route::matches` returns `None` and the
/// router simply tries the next route. Only exhausting the registry turns into
/// [`RouteError::RouteNotFound`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The template or one of its requirements cannot be compiled
    #[error("invalid route pattern `{pattern}`: {reason}")]
    PatternConfiguration { pattern: String, reason: String },

    /// A value handed to URL generation does not satisfy its placeholder
    #[error("placeholder `{placeholder}` of route `{route}` {}", describe_value(.value))]
    ArgumentValidation {
        route: String,
        placeholder: String,
        value: Option<String>,
    },

    /// No registered route matched the path, name or target
    #[error("no route found for `{0}`")]
    RouteNotFound(String),

    /// Self-link requested before any request was dispatched
    #[error("no current route to build a self link from")]
    NoDefaultRoute,

    /// An absolute URL was required but no host was known
    #[error("cannot build absolute URL for route `{route}` without host")]
    MissingHost { route: String },
}

fn describe_value(value: &Option<String>) -> String {
    match value {
        Some(value) => format!("rejects value {value:?}"),
        None => "has no value".to_string(),
    }
}

impl RouteError {
    pub(crate) fn pattern(pattern: &str, reason: impl Into<String>) -> Self {
        RouteError::PatternConfiguration {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = RouteError> = std::result::Result<T, E>;
