use std::collections::hash_map::{self, HashMap};
use std::iter::FromIterator;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::de::SectionDeserializer;
use crate::error::{Error, Result};

/// All sections of a configuration, by name.
pub type Sections = HashMap<String, Section>;

/// The keys and raw string values of one `[section]`.
///
/// Values are stored as written (trimmed) and converted by the
/// typed accessors when asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    values: HashMap<String, String>,
}

impl Section {
    pub fn new() -> Section {
        Section::default()
    }

    // Returns the previous value, if the key was already present.
    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Raw value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|v| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn raw_iter(&self) -> hash_map::Iter<'_, String, String> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.values
    }

    /// Get the value of `key` as a string.
    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
            .map(|v| v.to_string())
            .ok_or_else(|| Error::not_found(key))
    }

    /// Parse the value of `key` with `FromStr`.
    ///
    /// Fails if the key is absent or the value does not parse. The
    /// error kind tells the two apart; `what` names the expected type
    /// in the error message.
    pub fn get_parsed<T: FromStr>(&self, key: &str, what: &str) -> Result<T> {
        let value = self.get(key).ok_or_else(|| Error::not_found(key))?;
        value
            .parse()
            .map_err(|_| Error::invalid_value(key, what, value))
    }

    /// Get the value of `key` as a base-10 integer.
    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get_parsed(key, "integer")
    }

    /// Get the value of `key` as a 64-bit float.
    pub fn get_float(&self, key: &str) -> Result<f64> {
        self.get_parsed(key, "float")
    }

    /// Get the value of `key` as a boolean. See [`parse_bool`] for the
    /// accepted spellings.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get(key).ok_or_else(|| Error::not_found(key))?;
        debug!("get_bool: {} = {:?}", key, value);
        parse_bool(value).ok_or_else(|| Error::invalid_value(key, "boolean", value))
    }

    /// Deserialize this section into `T`. Keys become struct fields.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(SectionDeserializer::new(self))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Section {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut section = Section::new();
        for (k, v) in iter {
            section.insert(k, v);
        }
        section
    }
}

impl From<HashMap<String, String>> for Section {
    fn from(values: HashMap<String, String>) -> Self {
        Section { values }
    }
}

/// Parse a boolean, ignoring case.
///
/// `1`, `t`, `true`, `y`, `yes` and `on` are true;
/// `0`, `f`, `false`, `n`, `no` and `off` are false.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn section() -> Section {
        vec![
            ("timeout", "30"),
            ("ratio", "1.5"),
            ("enabled", "true"),
            ("disabled", "false"),
            ("name", "web server"),
            ("negative", "-12"),
            ("junk", "12abc"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn typed_accessors() {
        init();
        let s = section();
        assert_eq!(s.get_int("timeout").unwrap(), 30);
        assert_eq!(s.get_int("negative").unwrap(), -12);
        assert_eq!(s.get_float("ratio").unwrap(), 1.5);
        assert_eq!(s.get_float("timeout").unwrap(), 30.0);
        assert_eq!(s.get_bool("enabled").unwrap(), true);
        assert_eq!(s.get_bool("disabled").unwrap(), false);
        assert_eq!(s.get_string("name").unwrap(), "web server");
    }

    #[test]
    fn missing_key_fails_everywhere() {
        init();
        let s = section();
        assert!(s.get_string("nope").unwrap_err().is_not_found());
        assert!(s.get_int("nope").unwrap_err().is_not_found());
        assert!(s.get_float("nope").unwrap_err().is_not_found());
        assert!(s.get_bool("nope").unwrap_err().is_not_found());

        // The zero value is still one call away.
        assert_eq!(s.get_int("nope").unwrap_or_default(), 0);
        assert_eq!(s.get_float("nope").unwrap_or_default(), 0.0);
        assert_eq!(s.get_bool("nope").unwrap_or_default(), false);
        assert_eq!(s.get_string("nope").unwrap_or_default(), "");
    }

    #[test]
    fn malformed_value_fails() {
        init();
        let s = section();
        assert_eq!(s.get_int("junk").unwrap_err().kind(), ErrorKind::InvalidValue);
        assert_eq!(s.get_int("ratio").unwrap_err().kind(), ErrorKind::InvalidValue);
        assert_eq!(s.get_float("name").unwrap_err().kind(), ErrorKind::InvalidValue);
        assert_eq!(s.get_bool("timeout").unwrap_err().kind(), ErrorKind::InvalidValue);
        // but a malformed value is still a plain string.
        assert_eq!(s.get_string("junk").unwrap(), "12abc");
    }

    #[test]
    fn bool_spellings() {
        for t in &["1", "t", "T", "true", "TRUE", "True", "yes", "Y", "on"] {
            assert_eq!(parse_bool(t), Some(true), "{}", t);
        }
        for f in &["0", "f", "F", "false", "FALSE", "False", "no", "N", "off"] {
            assert_eq!(parse_bool(f), Some(false), "{}", f);
        }
        for x in &["", "2", "tru", "enabled", " true"] {
            assert_eq!(parse_bool(x), None, "{}", x);
        }
    }

    #[test]
    fn generic_accessor() {
        let s = section();
        let port: u16 = s.get_parsed("timeout", "port").unwrap();
        assert_eq!(port, 30);
        let err = s.get_parsed::<u8>("negative", "u8").unwrap_err();
        assert_eq!(err.to_string(), "negative: expected u8 value, got \"-12\"");
    }

    #[test]
    fn map_like_access() {
        let s = section();
        assert_eq!(s.len(), 7);
        assert!(!s.is_empty());
        assert!(s.contains_key("ratio"));
        assert_eq!(s.get("ratio"), Some("1.5"));
        assert_eq!(s.get("missing"), None);
        let mut keys: Vec<_> = s.keys().collect();
        keys.sort();
        assert_eq!(keys[0], "disabled");
        assert!(Section::new().is_empty());
    }
}
