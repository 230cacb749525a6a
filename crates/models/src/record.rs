use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One composite option as persisted: sub-key -> value, iterated in key order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionRecord {
    entries: BTreeMap<String, Value>,
}

impl OptionRecord {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, key: &str) -> Option<&Value> { self.entries.get(key) }

    /// Insert or replace, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> { self.entries.remove(key) }

    pub fn contains_key(&self, key: &str) -> bool { self.entries.contains_key(key) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> { self.entries.iter() }

    pub fn keys(&self) -> impl Iterator<Item = &str> { self.entries.keys().map(String::as_str) }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Value) -> bool) {
        self.entries.retain(|k, v| keep(k, v));
    }

    /// Copy every entry of `other` whose key is missing here; existing values win.
    pub fn fill_missing_from<'a, I>(&mut self, other: I)
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        for (k, v) in other {
            if !self.entries.contains_key(k) {
                self.entries.insert(k.clone(), v.clone());
            }
        }
    }

    /// `self` layered over `base`: keys from `self` win, keys only in `base` survive.
    pub fn merged_over(mut self, base: &OptionRecord) -> OptionRecord {
        self.fill_missing_from(base);
        self
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> { self.entries }
}

impl From<BTreeMap<String, Value>> for OptionRecord {
    fn from(entries: BTreeMap<String, Value>) -> Self { Self { entries } }
}

impl<K: Into<String>> FromIterator<(K, Value)> for OptionRecord {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

impl<K: Into<String>> Extend<(K, Value)> for OptionRecord {
    fn extend<T: IntoIterator<Item = (K, Value)>>(&mut self, iter: T) {
        self.entries.extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

impl IntoIterator for OptionRecord {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;
    fn into_iter(self) -> Self::IntoIter { self.entries.into_iter() }
}

impl<'a> IntoIterator for &'a OptionRecord {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;
    fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}
