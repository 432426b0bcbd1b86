//! Cache key generation and invalidation scoping.
//!
//! Every cached response is addressed by a key derived from the request path
//! and its query parameters. Keys keep the path as their literal prefix, so
//! invalidating a whole resource family is a single prefix wildcard delete:
//!
//! ```text
//! GET /v1/product/123?sort=price&category=tv
//!     family  = "product"
//!     key     = "/v1/product/123?category=tv&sort=price"
//!     pattern = "/v1/product*"
//! ```

use std::collections::BTreeMap;

/// Decoded query parameters: name to values, in the order they appeared.
///
/// Names iterate in lexicographic byte order, which is the order used when
/// building cache keys.
pub type QueryParams = BTreeMap<String, Vec<String>>;

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim_matches('/').split('/').filter(|s| !s.is_empty())
}

/// Returns the resource family of a path: its second segment.
///
/// `/v1/product/123` yields `product`. Paths with fewer than two segments
/// yield an empty string.
pub fn resource_family(path: &str) -> &str {
    segments(path).nth(1).unwrap_or("")
}

/// Returns the API version segment of a path (its first segment), or an
/// empty string for the root path.
pub fn api_version(path: &str) -> &str {
    segments(path).next().unwrap_or("")
}

/// Parses a raw query string into [`QueryParams`].
///
/// Percent-escapes and `+` are decoded the same way axum's `Query` extractor
/// does. A pair without `=` becomes a parameter with an empty value.
pub fn parse_query(query: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();

    let Some(query) = query else {
        return params;
    };

    for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(name.into_owned())
            .or_default()
            .push(value.into_owned());
    }

    params
}

/// Builds the cache key for a path and its query parameters.
///
/// Without parameters the key is the path itself. Otherwise parameters are
/// rendered as `name=value` pairs sorted by name, one pair per value (values
/// of a repeated name keep their original order), joined with `&` and
/// appended after `?`.
///
/// Values are used verbatim; no escaping happens here.
pub fn cache_key(path: &str, params: &QueryParams) -> String {
    if params.values().all(Vec::is_empty) {
        return path.to_string();
    }

    let pairs: Vec<String> = params
        .iter()
        .flat_map(|(name, values)| values.iter().map(move |value| format!("{name}={value}")))
        .collect();

    format!("{}?{}", path, pairs.join("&"))
}

/// Wildcard pattern matching every key cached under `/<version>/<family>`.
pub fn invalidation_pattern(version: &str, family: &str) -> String {
    format!("/{}/{}*", version, family)
}
