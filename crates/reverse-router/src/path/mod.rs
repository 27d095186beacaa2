/// Path and host utilities used by URL generation
///
/// All functions are pure. The slash helpers return `Cow::Borrowed` when the
/// input is already in the requested form.

use std::borrow::Cow;

/// Collapses every run of `/` into a single slash
///
/// # Examples
///
/// ```
/// use reverse_router::path::collapse_slashes;
/// use std::borrow::Cow;
///
/// assert!(matches!(collapse_slashes("/foo/bar/"), Cow::Borrowed("/foo/bar/")));
/// assert_eq!(collapse_slashes("/foo//bar///"), "/foo/bar/");
/// ```
pub fn collapse_slashes(path: &str) -> Cow<'_, str> {
    if !path.contains("//") {
        return Cow::Borrowed(path);
    }

    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        let is_slash = c == '/';
        if !(is_slash && previous_slash) {
            collapsed.push(c);
        }
        previous_slash = is_slash;
    }
    Cow::Owned(collapsed)
}

/// Removes leading `./` prefixes
pub fn trim_relative_prefix(path: &str) -> &str {
    let mut trimmed = path;
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed
}

/// Validates if a path is in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//`
/// - Must not end with `/` (except root `/`)
///
/// # Examples
///
/// ```
/// use reverse_router::path::is_canonical_path;
///
/// assert!(is_canonical_path("/"));
/// assert!(is_canonical_path("/users/123"));
///
/// assert!(!is_canonical_path(""));
/// assert!(!is_canonical_path("users")); // Missing leading /
/// assert!(!is_canonical_path("/users/")); // Trailing /
/// assert!(!is_canonical_path("/users//123")); // Double //
/// ```
pub fn is_canonical_path(path: &str) -> bool {
    if !path.starts_with('/') || path.contains("//") {
        return false;
    }
    path == "/" || !path.ends_with('/')
}

/// Normalizes a path so that trailing-slash and duplicate-slash variants of
/// the same location compare equal
///
/// A leading `./` is dropped and a leading `/` ensured, which makes relative
/// generated paths comparable with request paths.
///
/// # Examples
///
/// ```
/// use reverse_router::path::normalize_path;
///
/// assert_eq!(normalize_path("/foo/1/"), "/foo/1");
/// assert_eq!(normalize_path("./foo//1"), "/foo/1");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_canonical_path(path) {
        return Cow::Borrowed(path);
    }

    let normalized = trim_relative_prefix(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Splits a host hint of the form `scheme://host` into its parts
///
/// A hint without `://` is a bare host. Trailing slashes are ignored.
///
/// # Examples
///
/// ```
/// use reverse_router::path::split_host_hint;
///
/// assert_eq!(split_host_hint("http://test.com"), (Some("http"), "test.com"));
/// assert_eq!(split_host_hint("test.com/"), (None, "test.com"));
/// ```
pub fn split_host_hint(hint: &str) -> (Option<&str>, &str) {
    match hint.split_once("://") {
        Some((scheme, host)) => (Some(scheme), host.trim_end_matches('/')),
        None => (None, hint.trim_end_matches('/')),
    }
}
