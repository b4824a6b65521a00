//! Route parameters and query string helpers.
//!
//! [`RouteParams`] is the parameter map carried by every
//! [`State`](crate::State): url parameters extracted from `:param` and
//! `*splat` segments merged with query parameters. It is ordered so that two
//! states with the same parameters always compare and print the same way.
//!
//! # Example
//!
//! ```
//! use navigator_core::RouteParams;
//!
//! let params = RouteParams::new().with("id", "42").with("tab", "posts");
//! assert_eq!(params.get("id"), Some("42"));
//! assert_eq!(params.get_as::<u32>("id"), Some(42));
//! ```

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Characters escaped inside a path segment or a query component.
///
/// Everything outside the default parameter class is escaped, so an encoded
/// value always matches an unconstrained `:param`. `%`, `+` and `=` are in
/// that class but stay escaped to keep decoding and query splitting exact.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'\'')
    .remove(b':')
    .remove(b'|')
    .remove(b'*')
    .remove(b'@')
    .remove(b'$');

/// Route parameters: url and query parameters of a state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RouteParams {
    params: BTreeMap<String, String>,
}

impl RouteParams {
    /// Create empty route parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a parameter value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Get a parameter and parse it as a specific type
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.parse().ok()
    }

    /// Insert or overwrite a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Remove a parameter, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.remove(key)
    }

    /// Return `true` if the given key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Iterate over all `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Return `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Return the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Merge two parameter sets; `overrides` wins on collision.
    ///
    /// # Example
    ///
    /// ```
    /// use navigator_core::RouteParams;
    ///
    /// let defaults = RouteParams::new().with("page", "1").with("sort", "name");
    /// let given = RouteParams::new().with("page", "3");
    ///
    /// let merged = RouteParams::merge(&defaults, &given);
    /// assert_eq!(merged.get("page"), Some("3"));
    /// assert_eq!(merged.get("sort"), Some("name"));
    /// ```
    pub fn merge(base: &RouteParams, overrides: &RouteParams) -> RouteParams {
        let mut merged = base.clone();
        for (key, value) in overrides.iter() {
            merged.insert(key, value);
        }
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for RouteParams {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

// ============================================================================
// Query strings and percent-encoding
// ============================================================================

/// Split `path?query` into its two halves.
pub(crate) fn split_query(path: &str) -> (&str, &str) {
    path.split_once('?').unwrap_or((path, ""))
}

/// Parse a query string into ordered `(key, value)` pairs.
///
/// Keys without `=` get an empty value; `+` decodes to a space. Later
/// occurrences of the same key win when collected into [`RouteParams`].
pub(crate) fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_query_component(key), decode_query_component(value))
        })
        .collect()
}

/// Build a query string from ordered pairs (no leading `?`).
pub(crate) fn build_query<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(key, value)| {
            if value.is_empty() {
                encode_component(key).into_owned()
            } else {
                format!("{}={}", encode_component(key), encode_component(value))
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode a single path segment or query component.
pub(crate) fn encode_component(s: &str) -> Cow<'_, str> {
    utf8_percent_encode(s, COMPONENT).into()
}

/// Percent-decode a path segment. Invalid UTF-8 is replaced lossily.
pub(crate) fn decode_component(s: &str) -> Cow<'_, str> {
    percent_decode_str(s).decode_utf8_lossy()
}

fn decode_query_component(s: &str) -> String {
    decode_component(&s.replace('+', " ")).into_owned()
}

// ============================================================================
// Tests
// ============================================================================
