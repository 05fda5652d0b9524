//! Query-string parameters.
//!
//! Parameters keep their insertion order and may repeat, matching how a
//! browser's search string behaves. Encoding uses the
//! `application/x-www-form-urlencoded` rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;

/// Ordered query-string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a search string, with or without the leading `?`.
    #[must_use]
    pub fn parse(search: &str) -> Self {
        let search = search.strip_prefix('?').unwrap_or(search);
        Self {
            pairs: form_urlencoded::parse(search.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// Get the first value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get every value for a key, in order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Check if a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Set a key to a single value.
    ///
    /// The first occurrence keeps its position; later duplicates are removed.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| *k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut seen = 0usize;
                self.pairs.retain(|(k, _)| {
                    if *k == key {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.pairs.push((key, value)),
        }
    }

    /// Append a value, keeping existing values for the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Remove every value for a key.
    ///
    /// Returns `true` if anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|(k, _)| k != key);
        before != self.pairs.len()
    }

    /// Number of key/value pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over key/value pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(&self.pairs);
        f.write_str(&serializer.finish())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_prefix() {
        let a = QueryParams::parse("?day=today&tomorrow=123");
        let b = QueryParams::parse("day=today&tomorrow=123");
        assert_eq!(a, b);
        assert_eq!(a.get("day"), Some("today"));
        assert_eq!(a.get("tomorrow"), Some("123"));
        assert_eq!(a.get("missing"), None);
    }

    #[test]
    fn test_parse_decodes() {
        let params = QueryParams::parse("name=Grace+Hopper&city=New%20York");
        assert_eq!(params.get("name"), Some("Grace Hopper"));
        assert_eq!(params.get("city"), Some("New York"));
    }

    #[test]
    fn test_display_keeps_order() {
        let params: QueryParams = [("day", "today"), ("tomorrow", "123")].into_iter().collect();
        assert_eq!(params.to_string(), "day=today&tomorrow=123");
    }

    #[test]
    fn test_set_replaces_duplicates() {
        let mut params = QueryParams::parse("a=1&b=2&a=3");
        params.set("a", "9");
        assert_eq!(params.to_string(), "a=9&b=2");

        params.set("c", "x y");
        assert_eq!(params.to_string(), "a=9&b=2&c=x+y");
    }

    #[test]
    fn test_append_and_remove() {
        let mut params = QueryParams::new();
        params.append("tag", "a");
        params.append("tag", "b");
        assert_eq!(params.get_all("tag"), vec!["a", "b"]);
        assert!(params.contains("tag"));

        assert!(params.remove("tag"));
        assert!(!params.remove("tag"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_serde_as_pairs() {
        let params = QueryParams::parse("day=today");
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"[["day","today"]]"#);
    }
}
