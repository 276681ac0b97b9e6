//! Named dataset containers exchanged between pipeline stages.

use crate::error::{EtlError, Result};
use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::collections::hash_map;

/// A mapping from dataset name to dataset value.
///
/// The registry never inspects its values; `T` defaults to a Polars
/// [`DataFrame`] but any table representation works. Writing a name that is
/// already present replaces the previous value.
#[derive(Debug, Clone)]
pub struct DatasetRegistry<T = DataFrame> {
    datasets: HashMap<String, T>,
}

impl<T> Default for DatasetRegistry<T> {
    fn default() -> Self {
        Self {
            datasets: HashMap::new(),
        }
    }
}

impl<T> DatasetRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `table` under `name`, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, table: T) -> Option<T> {
        self.datasets.insert(name.into(), table)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.datasets.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.datasets.get_mut(name)
    }

    /// Like [`get`](Self::get), but a missing dataset is an error.
    pub fn require(&self, name: &str) -> Result<&T> {
        self.datasets
            .get(name)
            .ok_or_else(|| EtlError::DatasetNotFound(name.to_string()))
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.datasets.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    /// Dataset names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.datasets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Iterate over `(name, dataset)` pairs in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, T> {
        self.datasets.iter()
    }

    pub fn iter_mut(&mut self) -> hash_map::IterMut<'_, String, T> {
        self.datasets.iter_mut()
    }
}

impl<T: PartialEq> PartialEq for DatasetRegistry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.datasets == other.datasets
    }
}

impl<T, K: Into<String>> FromIterator<(K, T)> for DatasetRegistry<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self {
            datasets: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<T, K: Into<String>> Extend<(K, T)> for DatasetRegistry<T> {
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, iter: I) {
        self.datasets
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

impl<T> IntoIterator for DatasetRegistry<T> {
    type Item = (String, T);
    type IntoIter = hash_map::IntoIter<String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.datasets.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a DatasetRegistry<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = hash_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.datasets.iter()
    }
}
