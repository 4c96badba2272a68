//! URL processing utilities.
//!
//! Provides consistent URL handling for render targets:
//! - Query string splitting
//! - URL joining with forward slashes
//! - Safe filename generation from resource locators

/// Split a render target into path and query parts
///
/// # Returns
/// A tuple of (path, query) where query is `None` if no `?` was found
///
/// # Examples
/// ```
/// use packtag::utils::path::split_query;
/// assert_eq!(split_query("out/site.js?v=2"), ("out/site.js", Some("v=2")));
/// assert_eq!(split_query("out/site.js"), ("out/site.js", None));
/// ```
#[inline]
pub fn split_query(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

/// Join a URL base and a relative path with exactly one `/`
///
/// # Examples
/// ```
/// use packtag::utils::path::join_url;
/// assert_eq!(join_url("/js/", "app.js"), "/js/app.js");
/// assert_eq!(join_url("js", "lib/a.js"), "js/lib/a.js");
/// ```
pub fn join_url(base: &str, rest: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    let rest = rest.trim_start_matches('/');
    if trimmed.is_empty() && !base.starts_with('/') {
        return rest.to_string();
    }
    format!("{trimmed}/{rest}")
}

/// Convert a resource locator to a safe filename
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; every other character
/// becomes `_`.
///
/// # Examples
/// ```
/// use packtag::utils::path::url_to_safe_filename;
/// assert_eq!(url_to_safe_filename("app://js/embedded.js"), "app___js_embedded.js");
/// ```
#[inline]
pub fn url_to_safe_filename(url: &str) -> String {
    url.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_query_keeps_everything_after_first_mark() {
        assert_eq!(split_query("a.js?v=2&x=1"), ("a.js", Some("v=2&x=1")));
        assert_eq!(split_query("a.js?"), ("a.js", Some("")));
    }

    #[test]
    fn test_join_url_empty_base() {
        assert_eq!(join_url("", "a.js"), "a.js");
        assert_eq!(join_url("/", "a.js"), "/a.js");
    }

    #[test]
    fn test_url_to_safe_filename() {
        assert_eq!(url_to_safe_filename("plain.js"), "plain.js");
        assert_eq!(url_to_safe_filename("a b/c"), "a_b_c");
    }
}
