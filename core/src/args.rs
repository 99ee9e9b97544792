//! Query arguments attached to every request.

use std::collections::BTreeMap;

use url::form_urlencoded;

/// String-to-string query parameters.
///
/// Backed by a `BTreeMap` so the encoded query string is sorted by key and
/// identical argument sets always produce identical URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments(BTreeMap<String, String>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a parameter, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode as `application/x-www-form-urlencoded`, keys in sorted order.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Arguments
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_is_sorted_by_key() {
        let args = Arguments::new().with("to", "2024-01-31").with("from", "2024-01-01").with("page", "1");
        assert_eq!(args.to_query_string(), "from=2024-01-01&page=1&to=2024-01-31");
    }

    #[test]
    fn query_string_escapes_reserved_characters() {
        let args = Arguments::new().with("notes", "a b&c=d");
        assert_eq!(args.to_query_string(), "notes=a+b%26c%3Dd");
    }

    #[test]
    fn empty_arguments_encode_to_empty_string() {
        assert_eq!(Arguments::new().to_query_string(), "");
    }

    #[test]
    fn insert_replaces_previous_value() {
        let mut args = Arguments::new();
        assert_eq!(args.insert("page", "1"), None);
        assert_eq!(args.insert("page", "2"), Some("1".to_string()));
        assert_eq!(args.get("page"), Some("2"));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn collects_from_pairs() {
        let mut args: Arguments = [("is_running", "true"), ("user_id", "42")].into_iter().collect();
        assert_eq!(args.get("user_id"), Some("42"));
        assert_eq!(args.remove("is_running"), Some("true".to_string()));
        assert_eq!(args.len(), 1);
        assert!(!args.is_empty());
    }
}
