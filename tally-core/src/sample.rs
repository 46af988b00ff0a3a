use std::collections::hash_map;

use derive_more::Deref;
use fxhash::FxHashMap;
use serde::Serialize;

use crate::value::Value;

/// Actual values of all metrics of a store, see
/// [`Store::sample_all`](crate::Store::sample_all).
///
/// Values of different metrics can be observed at different instants, except
/// metrics of the same group.
#[derive(Debug, Clone, Default, PartialEq, Deref, Serialize)]
#[serde(transparent)]
pub struct Sample(FxHashMap<String, Value>);

impl Sample {
    pub(crate) fn new(values: FxHashMap<String, Value>) -> Self {
        Self(values)
    }

    /// Iterates over metrics ordered by name.
    pub fn sorted(&self) -> impl Iterator<Item = (&str, &Value)> {
        let mut values = self
            .0
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect::<Vec<_>>();
        values.sort_unstable_by_key(|(name, _)| *name);
        values.into_iter()
    }

    /// Converts the sample into the inner map.
    pub fn into_inner(self) -> FxHashMap<String, Value> {
        self.0
    }
}

impl IntoIterator for Sample {
    type IntoIter = hash_map::IntoIter<String, Value>;
    type Item = (String, Value);

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sample {
    type IntoIter = hash_map::Iter<'a, String, Value>;
    type Item = (&'a String, &'a Value);

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
