//! Canonical parameter encoding.
//!
//! The signing input is the parameter set rendered as
//!
//! ```text
//! key1=value1&key2=value2&...
//! ```
//!
//! with keys in ascending byte order, values verbatim (no percent-encoding),
//! the `sign` field left out and empty values dropped. Rust strings are
//! UTF-8, so the rendered bytes do not depend on the host locale.

use std::collections::BTreeMap;

/// Name of the signature parameter.
pub const SIGN_FIELD: &str = "sign";

/// Render any key/value mapping as the canonical signing string.
///
/// Insertion order of `params` is irrelevant.
///
/// # Example
/// ```
/// use alipay_crypto::canonicalize;
///
/// let rendered = canonicalize([("b", "2"), ("sign", "xyz"), ("a", "1"), ("c", "")]);
/// assert_eq!(rendered, "a=1&b=2");
/// ```
pub fn canonicalize<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = params
        .into_iter()
        .filter(|(k, v)| k.as_ref() != SIGN_FIELD && !v.as_ref().is_empty())
        .collect();
    pairs.sort_by(|(a, _), (b, _)| a.as_ref().as_bytes().cmp(b.as_ref().as_bytes()));

    let mut out = String::new();
    for (i, (k, v)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(k.as_ref());
        out.push('=');
        out.push_str(v.as_ref());
    }
    out
}

/// An ordered set of request parameters.
///
/// Keys are kept in byte order. Values are stored as strings; anything
/// implementing `ToString` can be inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) -> Option<String> {
        self.0.insert(key.into(), value.to_string())
    }

    /// Insert a parameter only when a value is present.
    pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Look up a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Remove a parameter.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Whether the parameter is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of parameters, including any `sign` field.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge another parameter set into this one. Entries of `other` win.
    pub fn extend(&mut self, other: Params) {
        self.0.extend(other.0);
    }

    /// The canonical signing string for this set.
    pub fn canonical_string(&self) -> String {
        canonicalize(self.iter())
    }

    /// The canonical signing input as UTF-8 bytes.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.canonical_string().into_bytes()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl IntoIterator for Params {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_keys_sorted() {
        let params: Params = [("timestamp", "2024"), ("app_id", "1"), ("method", "m")]
            .into_iter()
            .collect();
        assert_eq!(params.canonical_string(), "app_id=1&method=m&timestamp=2024");
    }

    #[test]
    fn test_sign_field_excluded() {
        let mut params = Params::new();
        params.insert("a", "1");
        params.insert(SIGN_FIELD, "c2lnbmF0dXJl");
        assert_eq!(params.canonical_string(), "a=1");
        // The field itself stays in the set
        assert!(params.contains_key(SIGN_FIELD));
    }

    #[test]
    fn test_empty_values_dropped() {
        let params: Params = [("a", ""), ("b", "x")].into_iter().collect();
        assert_eq!(params.canonical_string(), "b=x");
    }

    #[test]
    fn test_values_not_escaped() {
        let params: Params = [("notify_url", "http://example.com/n?x=1&y=2"), ("subject", "中文 测试")]
            .into_iter()
            .collect();
        assert_eq!(
            params.canonical_string(),
            "notify_url=http://example.com/n?x=1&y=2&subject=中文 测试"
        );
    }

    #[test]
    fn test_byte_order_not_alphabetic() {
        // Uppercase sorts before lowercase, '_' (0x5f) before 'a' (0x61)
        let rendered = canonicalize([("b", "1"), ("B", "2"), ("_input_charset", "utf-8"), ("a", "3")]);
        assert_eq!(rendered, "B=2&_input_charset=utf-8&a=3&b=1");
    }

    #[test]
    fn test_canonicalize_hashmap() {
        let mut map = HashMap::new();
        map.insert("z".to_string(), "26".to_string());
        map.insert("sign".to_string(), "abc".to_string());
        map.insert("a".to_string(), "1".to_string());
        assert_eq!(canonicalize(&map), "a=1&z=26");
    }

    #[test]
    fn test_non_ascii_is_utf8() {
        let params: Params = [("refund_reason", "中文测试")].into_iter().collect();
        let bytes = params.canonical_bytes();
        assert_eq!(bytes, "refund_reason=中文测试".as_bytes());
    }

    #[test]
    fn test_numeric_values() {
        let mut params = Params::new();
        params.insert("refund_amount", 0.01);
        params.insert("count", 3);
        assert_eq!(params.canonical_string(), "count=3&refund_amount=0.01");
    }

    #[test]
    fn test_insert_opt() {
        let mut params = Params::new();
        params.insert_opt("present", Some("yes"));
        params.insert_opt("absent", None::<&str>);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("present"), Some("yes"));
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(Params::new().canonical_string(), "");
    }
}
