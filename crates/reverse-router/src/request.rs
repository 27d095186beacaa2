/// Request collaborator contracts
///
/// The engine never owns requests. It reads four accessors through
/// [`RequestInfo`] and writes captured arguments back through
/// [`ArgumentStore`]. [`Request`] is a plain value implementing both, handy
/// for tests and for adapters that copy fields out of a framework request.

use crate::arguments::Arguments;

/// Read-only view of an inbound request
pub trait RequestInfo {
    fn path(&self) -> &str;
    fn method(&self) -> &str;
    /// Scheme or protocol string, e.g. `https` or `HTTP/1.1`
    fn scheme(&self) -> &str;
    fn host(&self) -> &str;
}

/// Request-scoped key/value store receiving matched arguments
pub trait ArgumentStore {
    fn set_argument(&mut self, name: &str, value: &str);
    fn argument(&self, name: &str) -> Option<&str>;

    fn locale(&self) -> Option<&str> {
        self.argument("locale")
    }

    fn format(&self) -> Option<&str> {
        self.argument("format")
    }
}

/// Owned request value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    method: String,
    scheme: String,
    host: String,
    path: String,
    arguments: Arguments,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            scheme: "http".to_string(),
            host: String::new(),
            path: path.into(),
            arguments: Arguments::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Pre-populates the argument store (e.g. from query parameters)
    pub fn with_argument(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.arguments.set(name, Some(value.to_string()));
        self
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }
}

impl RequestInfo for Request {
    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn host(&self) -> &str {
        &self.host
    }
}

impl ArgumentStore for Request {
    fn set_argument(&mut self, name: &str, value: &str) {
        self.arguments.set(name, Some(value.to_string()));
    }

    fn argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name)
    }
}
