//! Groups of metrics sampled together from a shared value.

use derive_more::Display;
use fxhash::FxHashMap;
use serde::Serialize;

use tally_utils::time::SystemTime;

use crate::{
    distribution::Summary,
    value::{Kind, Value},
};

/// An identifier of a group registered in a [`Store`](crate::Store).
///
/// Identifiers are assigned sequentially starting from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
#[display("group#{_0}")]
pub struct GroupId(u64);

impl GroupId {
    pub(crate) fn new(no: u64) -> Self {
        Self(no)
    }

    /// Returns the sequential number of the group.
    pub fn to_u64(self) -> u64 {
        self.0
    }
}

type Extractor<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;

/// Named functions projecting metrics out of a group's shared value.
///
/// ```
/// # use tally_core::Extractors;
/// struct Stats {
///     hits: u64,
///     misses: u64,
/// }
///
/// let extractors = Extractors::new()
///     .counter("cache.hits", |s: &Stats| s.hits)
///     .counter("cache.misses", |s: &Stats| s.misses)
///     .gauge("cache.balance", |s: &Stats| s.hits as i64 - s.misses as i64);
/// assert_eq!(extractors.len(), 3);
/// ```
pub struct Extractors<T> {
    list: Vec<(String, Kind, Extractor<T>)>,
}

impl<T> Default for Extractors<T> {
    fn default() -> Self {
        Self { list: Vec::new() }
    }
}

impl<T> Extractors<T> {
    /// Creates an empty set of extractors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an extractor producing a value of the given kind.
    ///
    /// An extractor with the same name is replaced. If `f` returns a value of
    /// another kind, [`Store::sample_all`](crate::Store::sample_all) panics.
    pub fn metric(
        mut self,
        name: impl Into<String>,
        kind: Kind,
        f: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        self.list.retain(|(n, _, _)| *n != name);
        self.list.push((name, kind, Box::new(f)));
        self
    }

    /// Adds a counter extractor.
    pub fn counter(
        self,
        name: impl Into<String>,
        f: impl Fn(&T) -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.metric(name, Kind::Counter, move |v| Value::Counter(f(v)))
    }

    /// Adds a gauge extractor.
    pub fn gauge(
        self,
        name: impl Into<String>,
        f: impl Fn(&T) -> i64 + Send + Sync + 'static,
    ) -> Self {
        self.metric(name, Kind::Gauge, move |v| Value::Gauge(f(v)))
    }

    /// Adds a label extractor.
    pub fn label(
        self,
        name: impl Into<String>,
        f: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        self.metric(name, Kind::Label, move |v| Value::Label(f(v)))
    }

    /// Adds a bool extractor.
    pub fn bool(
        self,
        name: impl Into<String>,
        f: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.metric(name, Kind::Bool, move |v| Value::Bool(f(v)))
    }

    /// Adds a timestamp extractor.
    pub fn timestamp(
        self,
        name: impl Into<String>,
        f: impl Fn(&T) -> SystemTime + Send + Sync + 'static,
    ) -> Self {
        self.metric(name, Kind::Timestamp, move |v| Value::Timestamp(f(v)))
    }

    /// Adds a distribution extractor.
    pub fn distribution(
        self,
        name: impl Into<String>,
        f: impl Fn(&T) -> Summary + Send + Sync + 'static,
    ) -> Self {
        self.metric(name, Kind::Distribution, move |v| Value::Distribution(f(v)))
    }

    /// Returns the number of extractors.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if there are no extractors.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub(crate) fn rename(mut self, f: impl Fn(String) -> String) -> Self {
        self.list = self
            .list
            .into_iter()
            .map(|(name, kind, extractor)| (f(name), kind, extractor))
            .collect();
        self
    }
}

/// Panics if a sampled value doesn't match the kind the metric is registered
/// with.
#[track_caller]
pub(crate) fn check_kind(name: &str, kind: Kind, value: &Value) {
    assert!(
        value.kind() == kind,
        "metric {name:?} is registered as {kind}, but sampled as {}",
        value.kind()
    );
}

/// A type-erased group, stored by the registry.
pub(crate) trait Sampler: Send + Sync {
    /// Calls the producer once and puts all extracted values to `out`.
    fn sample(&self, out: &mut FxHashMap<String, Value>);

    fn contains(&self, name: &str) -> bool;
}

pub(crate) struct Group<T, P> {
    producer: P,
    extractors: Extractors<T>,
}

impl<T, P> Group<T, P> {
    pub(crate) fn new(extractors: Extractors<T>, producer: P) -> Self {
        Self {
            producer,
            extractors,
        }
    }
}

impl<T, P> Sampler for Group<T, P>
where
    P: Fn() -> T + Send + Sync,
{
    fn sample(&self, out: &mut FxHashMap<String, Value>) {
        let shared = (self.producer)();

        for (name, kind, extract) in &self.extractors.list {
            let value = extract(&shared);
            check_kind(name, *kind, &value);
            out.insert(name.clone(), value);
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.extractors.list.iter().any(|(n, _, _)| n == name)
    }
}
