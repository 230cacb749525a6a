use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::OptionRecord;

/// Fallback values for the sub-keys of one composite option.
///
/// For bounded stores the key set is the whole schema; for open stores it is
/// advisory and only used to top up what was read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultSet(OptionRecord);

impl DefaultSet {
    pub fn new() -> Self { Self::default() }

    /// Builder-style insert.
    ///
    /// ```
    /// use models::DefaultSet;
    /// use serde_json::json;
    /// let d = DefaultSet::new().with("color", json!("blue")).with("count", json!(3));
    /// assert_eq!(d.len(), 2);
    /// assert_eq!(d.get("color"), Some(&json!("blue")));
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }

    pub fn contains_key(&self, key: &str) -> bool { self.0.contains_key(key) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn keys(&self) -> impl Iterator<Item = &str> { self.0.keys() }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> { self.0.iter() }

    /// True when `key` has a default and `value` is identical to it.
    pub fn is_default(&self, key: &str, value: &Value) -> bool {
        self.0.get(key).is_some_and(|d| d == value)
    }

    pub fn to_record(&self) -> OptionRecord { self.0.clone() }
}

impl From<OptionRecord> for DefaultSet {
    fn from(record: OptionRecord) -> Self { Self(record) }
}

impl<K: Into<String>> FromIterator<(K, Value)> for DefaultSet {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DefaultSet {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;
    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn is_default_compares_values() {
        let d = DefaultSet::new().with("foo", json!("bar"));
        assert!(d.is_default("foo", &json!("bar")));
        assert!(!d.is_default("foo", &json!("baz")));
        assert!(!d.is_default("extra", &json!("bar")));
    }

    #[test]
    fn to_record_is_a_copy() {
        let d = DefaultSet::new().with("a", json!(1));
        let mut r = d.to_record();
        r.insert("b", json!(2));
        assert_eq!(d.len(), 1);
        assert_eq!(r.len(), 2);
    }
}
