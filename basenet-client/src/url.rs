//! Query-string merging and URL parsing.

use serde_json::{Map, Value};

/// Ordered key-value query parameters.
pub type QueryParams = Map<String, Value>;

/// A URL split into the parts used for per-domain lookups.
///
/// All fields are `None` when the URL has no `scheme://host` prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Host part, including any port.
    pub hostname: Option<String>,
    /// Path before the first `?`.
    pub pathname: Option<String>,
    /// Query from the first `?` to the end, or empty.
    pub search: Option<String>,
}

impl ParsedUrl {
    /// Returns `true` if the URL did not match `scheme://host`.
    pub fn is_empty(&self) -> bool {
        self.hostname.is_none()
    }

    /// Get the hostname.
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Get the pathname, or `""`.
    pub fn pathname(&self) -> &str {
        self.pathname.as_deref().unwrap_or_default()
    }

    /// Get the search string, or `""`.
    pub fn search(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }
}

/// Parse the query part of `url` into ordered parameters.
///
/// Segments without `=` are skipped. A repeated key keeps its first position
/// and its last value.
pub fn get_url_params(url: &str) -> QueryParams {
    let mut params = QueryParams::new();

    let Some(query) = url.split('?').nth(1) else {
        return params;
    };

    for segment in query.split('&') {
        if let Some((key, value)) = segment.split_once('=') {
            params.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    params
}

/// Merge `params` into the query string of `url`.
///
/// Existing parameters come first in their original order, followed by new
/// ones in insertion order. A new value replaces an existing one in place.
/// `null` values are dropped, and `?` is only kept when a pair survives.
/// Values are written as-is, without percent-encoding.
pub fn build_url_params(url: &str, params: Option<&QueryParams>) -> String {
    let Some(params) = params else {
        return url.to_string();
    };

    let path = url.split('?').next().unwrap_or(url);

    let mut query = get_url_params(url);
    for (key, value) in params {
        query.insert(key.clone(), value.clone());
    }

    let pairs: Vec<String> = query
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| format!("{}={}", key, query_value(value)))
        .collect();

    if pairs.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, pairs.join("&"))
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(query_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Split `url` into hostname, pathname and search.
///
/// Matches `scheme://host/rest` where the scheme is one or more word
/// characters and the host runs up to the first `/`.
pub fn url_parser(url: &str) -> ParsedUrl {
    let Some((scheme, rest)) = url.split_once("://") else {
        return ParsedUrl::default();
    };

    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return ParsedUrl::default();
    }

    let host_end = rest.find('/').unwrap_or(rest.len());
    let (host, tail) = rest.split_at(host_end);
    if host.is_empty() {
        return ParsedUrl::default();
    }

    let (pathname, search) = match tail.find('?') {
        Some(idx) => tail.split_at(idx),
        None => (tail, ""),
    };

    ParsedUrl {
        hostname: Some(host.to_string()),
        pathname: Some(pathname.to_string()),
        search: Some(search.to_string()),
    }
}
