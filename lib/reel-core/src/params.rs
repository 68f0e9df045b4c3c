//! Request parameter shapes and normalization.
//!
//! API commands take parameters in two forms: a structured [`Params`] map or
//! a raw `key=value&key=value` query string. [`normalize`] folds either form,
//! together with the command name and auth token, into one canonical ordered
//! mapping that the transport then serializes (URL query, form body, or
//! multipart fields).
//!
//! # Example
//!
//! ```
//! use reel_core::{Params, normalize};
//!
//! let params = Params::new()
//!     .with("any", vec!["tag:foo", "tag:bar"])
//!     .with("all", "search_text:foo");
//!
//! let query = normalize("search_videos", "TOKEN", params).expect("normalize");
//! assert_eq!(query.get("command").and_then(|v| v.as_scalar()), Some("search_videos"));
//! ```

use crate::{Error, Result};

/// Query parameters whose values are always array-shaped: they express a
/// boolean combination of tag conditions on search endpoints.
const COMBINATOR_FIELDS: &[&str] = &["any", "all"];

/// A single parameter value: scalar, ordered list, or nested mapping.
///
/// Structured fields (like a video metadata object) use [`ParamValue::Nested`]
/// and pass through normalization unflattened.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A single string-convertible value.
    Scalar(String),
    /// An ordered list of scalar values, sent as repeated keys.
    List(Vec<String>),
    /// A nested mapping, sent as a JSON object.
    Nested(Params),
}

impl ParamValue {
    /// Scalar value, if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// List elements, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Nested mapping, if this is a nested value.
    #[must_use]
    pub const fn as_nested(&self) -> Option<&Params> {
        match self {
            Self::Nested(params) => Some(params),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Params> for ParamValue {
    fn from(params: Params) -> Self {
        Self::Nested(params)
    }
}

/// An insertion-ordered mapping from parameter names to [`ParamValue`]s.
///
/// Re-inserting an existing key replaces its value in place: the key keeps
/// its first-seen position, the last-applied value wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Create an empty parameter map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a value, replacing in place if the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(index) = self.entries.iter().position(|(k, _)| k == &key) {
            if let Some(entry) = self.entries.get_mut(index) {
                entry.1 = value;
            }
        } else {
            self.entries.push((key, value));
        }
    }

    /// Builder-style [`Params::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value for a key, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flatten into `(key, value)` string pairs for a query string or form
    /// body: lists become repeated keys in element order, nested mappings
    /// become compact JSON objects.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            match value {
                ParamValue::Scalar(v) => pairs.push((key.clone(), v.clone())),
                ParamValue::List(values) => {
                    for v in values {
                        pairs.push((key.clone(), v.clone()));
                    }
                }
                ParamValue::Nested(params) => {
                    pairs.push((key.clone(), params.to_json_value().to_string()));
                }
            }
        }
        pairs
    }

    /// Render as a JSON value (scalars as strings, lists as arrays, nested
    /// mappings as objects).
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut object = serde_json::Map::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let json = match value {
                ParamValue::Scalar(v) => serde_json::Value::String(v.clone()),
                ParamValue::List(values) => serde_json::Value::Array(
                    values
                        .iter()
                        .map(|v| serde_json::Value::String(v.clone()))
                        .collect(),
                ),
                ParamValue::Nested(params) => params.to_json_value(),
            };
            object.insert(key.clone(), json);
        }
        serde_json::Value::Object(object)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// The two accepted input forms for a request's parameters.
#[derive(Debug, Clone)]
pub enum RawParams {
    /// A structured parameter map, copied into the canonical query as-is.
    Map(Params),
    /// An ampersand-delimited `key=value` query string, parsed pair by pair.
    Query(String),
}

impl From<Params> for RawParams {
    fn from(params: Params) -> Self {
        Self::Map(params)
    }
}

impl From<&str> for RawParams {
    fn from(query: &str) -> Self {
        Self::Query(query.to_string())
    }
}

impl From<String> for RawParams {
    fn from(query: String) -> Self {
        Self::Query(query)
    }
}

/// Normalize a request's parameters into the canonical query.
///
/// `command` and `token` are injected as scalar entries; exactly one of each
/// survives regardless of input shape. Map input is copied as-is (element
/// order of list values preserved, nested mappings unflattened). Query-string
/// input is parsed by splitting on `&` then the first `=`; repeated keys
/// collapse into one list at the first-seen position.
///
/// Combinator fields (`any`, `all`) parsed from a query string always come
/// out list-valued, sorted ascending lexically. Map input is never sorted.
/// The asymmetry matches the wire contract the receiving endpoint grew
/// around; see DESIGN.md before relying on it.
///
/// # Errors
///
/// Returns [`Error::MalformedQuery`] for a query-string pair with no `=`.
/// No partial output is returned on failure.
pub fn normalize(command: &str, token: &str, raw: impl Into<RawParams>) -> Result<Params> {
    let mut params = match raw.into() {
        RawParams::Map(params) => params,
        RawParams::Query(query) => parse_delimited(&query)?,
    };
    params.insert("command", command);
    params.insert("token", token);
    Ok(params)
}

/// Parse an ampersand-delimited query string into an ordered parameter map.
fn parse_delimited(query: &str) -> Result<Params> {
    // Accumulate every value per key, preserving first-seen key order and
    // original pair order within a key.
    let mut entries: Vec<(String, Vec<String>)> = Vec::new();

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let Some((key, value)) = pair.split_once('=') else {
            return Err(Error::malformed_query(format!("pair without '=': {pair}")));
        };
        if let Some((_, values)) = entries.iter_mut().find(|(k, _)| k == key) {
            values.push(value.to_string());
        } else {
            entries.push((key.to_string(), vec![value.to_string()]));
        }
    }

    let mut params = Params::new();
    for (key, mut values) in entries {
        // Combinator fields are always list-shaped on the wire and arrive
        // sorted when parsed from a query string.
        let is_combinator = COMBINATOR_FIELDS.contains(&key.as_str());
        if is_combinator {
            values.sort_unstable();
        }
        let value = if is_combinator || values.len() > 1 {
            ParamValue::List(values)
        } else if let Some(single) = values.pop() {
            ParamValue::Scalar(single)
        } else {
            continue;
        };
        params.entries.push((key, value));
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_list_order_preserved() {
        let params = Params::new().with("any", vec!["tag:foo", "tag:bar"]);

        let query = normalize("search_videos", "T", params).expect("normalize");

        assert_eq!(
            query.get("any").and_then(ParamValue::as_list),
            Some(&["tag:foo".to_string(), "tag:bar".to_string()][..])
        );
    }

    #[test]
    fn delimited_combinator_sorted() {
        let query = normalize("search_videos", "T", "any=tag:foo&any=tag:bar").expect("normalize");

        // Repeated combinator keys collapse into one list, sorted lexically.
        assert_eq!(
            query.get("any").and_then(ParamValue::as_list),
            Some(&["tag:bar".to_string(), "tag:foo".to_string()][..])
        );
    }

    #[test]
    fn delimited_combinator_single_value_promoted() {
        let query = normalize("search_videos", "T", "any=tag:foo").expect("normalize");

        assert_eq!(
            query.get("any").and_then(ParamValue::as_list),
            Some(&["tag:foo".to_string()][..])
        );
    }

    #[test]
    fn delimited_plain_repeated_key_keeps_pair_order() {
        let query = normalize("find_all_videos", "T", "tag=zeta&tag=alpha").expect("normalize");

        assert_eq!(
            query.get("tag").and_then(ParamValue::as_list),
            Some(&["zeta".to_string(), "alpha".to_string()][..])
        );
    }

    #[test]
    fn delimited_single_plain_key_stays_scalar() {
        let query = normalize("find_all_videos", "T", "page_size=5").expect("normalize");

        assert_eq!(
            query.get("page_size").and_then(ParamValue::as_scalar),
            Some("5")
        );
    }

    #[test]
    fn delimited_key_order_is_first_occurrence() {
        let query = normalize("cmd", "T", "b=1&a=2&b=3").expect("normalize");

        let keys: Vec<&str> = query.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "command", "token"]);
    }

    #[test]
    fn delimited_malformed_pair_rejected() {
        let result = normalize("cmd", "T", "page_size");

        assert!(result.expect_err("must fail").is_malformed_query());
    }

    #[test]
    fn delimited_value_may_contain_equals() {
        let query = normalize("cmd", "T", "filter=a=b").expect("normalize");

        assert_eq!(
            query.get("filter").and_then(ParamValue::as_scalar),
            Some("a=b")
        );
    }

    #[test]
    fn command_and_token_injected_once() {
        let params = Params::new()
            .with("command", "spoofed")
            .with("token", "spoofed");

        let query = normalize("search_videos", "T", params).expect("normalize");

        assert_eq!(
            query.get("command").and_then(ParamValue::as_scalar),
            Some("search_videos")
        );
        assert_eq!(query.get("token").and_then(ParamValue::as_scalar), Some("T"));
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn search_videos_end_to_end() {
        let params = Params::new()
            .with("any", vec!["tag:foo", "tag:bar"])
            .with("all", "search_text:foo");

        let query = normalize("search_videos", "T", params).expect("normalize");

        assert_eq!(
            query.get("any").and_then(ParamValue::as_list),
            Some(&["tag:foo".to_string(), "tag:bar".to_string()][..])
        );
        assert_eq!(
            query.get("all").and_then(ParamValue::as_scalar),
            Some("search_text:foo")
        );
        assert_eq!(
            query.get("command").and_then(ParamValue::as_scalar),
            Some("search_videos")
        );
        assert_eq!(query.get("token").and_then(ParamValue::as_scalar), Some("T"));
    }

    #[test]
    fn nested_value_passes_through() {
        let video = Params::new()
            .with("name", "Video")
            .with("shortDescription", "Short Description");
        let params = Params::new().with("video", video.clone());

        let query = normalize("create_video", "T", params).expect("normalize");

        assert_eq!(query.get("video").and_then(ParamValue::as_nested), Some(&video));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut params = Params::new();
        params.insert("a", "1");
        params.insert("b", "2");
        params.insert("a", "3");

        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(params.get("a").and_then(ParamValue::as_scalar), Some("3"));
    }

    #[test]
    fn query_pairs_repeat_list_keys() {
        let params = Params::new()
            .with("any", vec!["tag:foo", "tag:bar"])
            .with("page_size", 5_i64);

        let pairs = params.to_query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("any".to_string(), "tag:foo".to_string()),
                ("any".to_string(), "tag:bar".to_string()),
                ("page_size".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn query_pairs_render_nested_as_json() {
        let params =
            Params::new().with("video", Params::new().with("name", "Video"));

        let pairs = params.to_query_pairs();

        assert_eq!(
            pairs,
            vec![("video".to_string(), r#"{"name":"Video"}"#.to_string())]
        );
    }

    #[test]
    fn from_iterator_collects_in_order() {
        let params: Params = [("a", "1"), ("b", "2")].into_iter().collect();

        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
