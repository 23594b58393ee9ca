use serde_json::Value;
use std::collections::{BTreeMap, btree_map};

use crate::errors::QueryError;

/// Named values bound out-of-band to a compiled statement.
///
/// An array value is a collection bound as a single parameter (`col IN (:name)`).
/// Keys are ordered so that compiling the same filter twice yields the same map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterMap(BTreeMap<String, Value>);

impl ParameterMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Move every entry of `other` into `self`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::ParameterConflict`] if a name is already bound; `self` is
    /// left unchanged in that case.
    pub fn merge(&mut self, other: Self) -> Result<(), QueryError> {
        if let Some(name) = other.0.keys().find(|name| self.0.contains_key(*name)) {
            return Err(QueryError::ParameterConflict { name: name.clone() });
        }
        self.0.extend(other.0);
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a ParameterMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Generates `{prefix}__{n}` names for one predicate
pub(crate) struct ParamNamer<'a> {
    prefix: &'a str,
    next: usize,
}

impl<'a> ParamNamer<'a> {
    pub(crate) const fn new(prefix: &'a str) -> Self {
        Self { prefix, next: 0 }
    }

    pub(crate) fn next_name(&mut self) -> String {
        let name = format!("{}__{}", self.prefix, self.next);
        self.next += 1;
        name
    }
}

/// Prefix of the `index`-th child of the node at `prefix`
pub(crate) fn child_prefix(prefix: &str, index: usize) -> String {
    format!("{prefix}_{index}")
}
