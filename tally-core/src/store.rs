use std::{collections::BTreeMap, sync::Arc};

use fxhash::FxHashMap;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use tally_utils::time::{Instant, SystemTime};

use crate::{
    boolean::Bool,
    config::StoreConfig,
    counter::Counter,
    distribution::{Distribution, Summary},
    errors::ConfigError,
    gauge::Gauge,
    group::{self, Extractors, Group, GroupId, Sampler},
    label::Label,
    sample::Sample,
    timestamp::Timestamp,
    value::{Kind, Value},
};

type Accessor = Arc<dyn Fn() -> Value + Send + Sync>;

/// A mutable metric store.
///
/// The store keeps track of all registered metrics and groups and provides a
/// snapshot of their values on demand, see [`Store::sample_all`].
///
/// Registration and sampling are serialized by the store, while values of
/// already registered metrics are updated without involving the store.
pub struct Store {
    config: StoreConfig,
    registry: Mutex<Registry>,
}

#[derive(Default)]
struct Registry {
    metrics: FxHashMap<String, Entry>,
    groups: BTreeMap<GroupId, Arc<dyn Sampler>>,
    next_group_no: u64,
}

struct Entry {
    kind: Kind,
    accessor: Accessor,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Creates a new, empty store with the default config.
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            registry: Mutex::new(Registry::default()),
        }
    }

    /// Creates a new, empty store with the provided config.
    pub fn with_config(config: StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            config,
            registry: Mutex::new(Registry::default()),
        })
    }

    /// Returns the config of the store.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // === Creation ===

    /// Creates and registers a zero-initialized counter.
    pub fn create_counter(&self, name: impl Into<String>) -> Arc<Counter> {
        let counter = Arc::new(Counter::new());
        let reader = counter.clone();
        self.register_counter(name, move || reader.read());
        counter
    }

    /// Creates and registers a zero-initialized gauge.
    pub fn create_gauge(&self, name: impl Into<String>) -> Arc<Gauge> {
        let gauge = Arc::new(Gauge::new());
        let reader = gauge.clone();
        self.register_gauge(name, move || reader.read());
        gauge
    }

    /// Creates and registers an empty label.
    pub fn create_label(&self, name: impl Into<String>) -> Arc<Label> {
        let label = Arc::new(Label::new());
        let reader = label.clone();
        self.register_label(name, move || reader.read());
        label
    }

    /// Creates and registers a false-initialized flag.
    pub fn create_bool(&self, name: impl Into<String>) -> Arc<Bool> {
        let flag = Arc::new(Bool::new());
        let reader = flag.clone();
        self.register_bool(name, move || reader.read());
        flag
    }

    /// Creates and registers a timestamp stamped with the current time.
    pub fn create_timestamp(&self, name: impl Into<String>) -> Arc<Timestamp> {
        let timestamp = Arc::new(Timestamp::new());
        let reader = timestamp.clone();
        self.register_timestamp(name, move || reader.read());
        timestamp
    }

    /// Creates and registers an event tracker.
    pub fn create_distribution(&self, name: impl Into<String>) -> Arc<Distribution> {
        let distrib = Arc::new(Distribution::new());
        let reader = distrib.clone();
        self.register_distribution(name, move || reader.read());
        distrib
    }

    // === Registration ===

    /// Registers a metric with a custom accessor.
    ///
    /// It allows to expose any value owned outside of the store. The accessor
    /// must return values of the provided kind, otherwise [`Store::sample_all`]
    /// panics. Prefer typed helpers like [`Store::register_counter`].
    ///
    /// If the name is already registered, the previous metric is replaced.
    pub fn register(
        &self,
        name: impl Into<String>,
        kind: Kind,
        accessor: impl Fn() -> Value + Send + Sync + 'static,
    ) {
        let name = self.qualify(name.into());
        let entry = Entry {
            kind,
            accessor: Arc::new(accessor),
        };

        let previous = self.registry.lock().metrics.insert(name.clone(), entry);

        match previous {
            Some(previous) if self.config.warn_on_overwrite => warn!(
                name = %name,
                kind = %kind,
                previous = %previous.kind,
                "metric is registered again, the previous one is replaced"
            ),
            _ => debug!(name = %name, kind = %kind, "metric registered"),
        }
    }

    /// Registers a counter read by the provided function.
    pub fn register_counter(
        &self,
        name: impl Into<String>,
        f: impl Fn() -> u64 + Send + Sync + 'static,
    ) {
        self.register(name, Kind::Counter, move || Value::Counter(f()));
    }

    /// Registers a gauge read by the provided function.
    pub fn register_gauge(
        &self,
        name: impl Into<String>,
        f: impl Fn() -> i64 + Send + Sync + 'static,
    ) {
        self.register(name, Kind::Gauge, move || Value::Gauge(f()));
    }

    /// Registers a label read by the provided function.
    pub fn register_label(
        &self,
        name: impl Into<String>,
        f: impl Fn() -> String + Send + Sync + 'static,
    ) {
        self.register(name, Kind::Label, move || Value::Label(f()));
    }

    /// Registers a flag read by the provided function.
    pub fn register_bool(
        &self,
        name: impl Into<String>,
        f: impl Fn() -> bool + Send + Sync + 'static,
    ) {
        self.register(name, Kind::Bool, move || Value::Bool(f()));
    }

    /// Registers a timestamp read by the provided function.
    pub fn register_timestamp(
        &self,
        name: impl Into<String>,
        f: impl Fn() -> SystemTime + Send + Sync + 'static,
    ) {
        self.register(name, Kind::Timestamp, move || Value::Timestamp(f()));
    }

    /// Registers a distribution read by the provided function.
    pub fn register_distribution(
        &self,
        name: impl Into<String>,
        f: impl Fn() -> Summary + Send + Sync + 'static,
    ) {
        self.register(name, Kind::Distribution, move || Value::Distribution(f()));
    }

    /// Registers a group of metrics sampled together.
    ///
    /// On every [`Store::sample_all`] call the producer is called exactly
    /// once and all extractors are applied to its result, so metrics of one
    /// group are always consistent with each other.
    ///
    /// Values of the group replace values of directly registered metrics with
    /// the same names. If several groups share a name, the group registered
    /// later wins.
    pub fn register_group<T: 'static>(
        &self,
        extractors: Extractors<T>,
        producer: impl Fn() -> T + Send + Sync + 'static,
    ) -> GroupId {
        let extractors = extractors.rename(|name| self.qualify(name));
        let metrics = extractors.len();
        let group = Arc::new(Group::new(extractors, producer));

        let id = {
            let mut registry = self.registry.lock();
            let id = GroupId::new(registry.next_group_no);
            registry.next_group_no += 1;
            registry.groups.insert(id, group);
            id
        };

        debug!(group = %id, metrics, "group registered");
        id
    }

    // === Sampling ===

    /// Samples all metrics registered in the store.
    ///
    /// There is no atomicity across metrics: they are read one by one while
    /// other threads keep updating them. Metrics of one group are sampled
    /// from the same producer's result.
    pub fn sample_all(&self) -> Sample {
        let started_at = Instant::now();

        // Copy handles to unlock the registry before calling accessors and
        // producers, which can be arbitrarily expensive.
        let (metrics, groups) = {
            let registry = self.registry.lock();
            let metrics = registry
                .metrics
                .iter()
                .map(|(name, entry)| (name.clone(), entry.kind, entry.accessor.clone()))
                .collect::<Vec<_>>();
            let groups = registry.groups.values().cloned().collect::<Vec<_>>();
            (metrics, groups)
        };

        let mut values = FxHashMap::default();
        values.reserve(metrics.len());

        for (name, kind, accessor) in metrics {
            let value = accessor();
            group::check_kind(&name, kind, &value);
            values.insert(name, value);
        }

        // Groups are ordered by id, so a later group overrides earlier ones.
        for group in &groups {
            group.sample(&mut values);
        }

        trace!(
            metrics = values.len(),
            groups = groups.len(),
            elapsed = ?started_at.elapsed(),
            "all metrics sampled"
        );

        Sample::new(values)
    }

    // === Introspection ===

    /// Returns the number of directly registered metrics.
    pub fn metric_count(&self) -> usize {
        self.registry.lock().metrics.len()
    }

    /// Returns the number of registered groups.
    pub fn group_count(&self) -> usize {
        self.registry.lock().groups.len()
    }

    /// Returns `true` if nothing is registered in the store.
    pub fn is_empty(&self) -> bool {
        let registry = self.registry.lock();
        registry.metrics.is_empty() && registry.groups.is_empty()
    }

    /// Returns `true` if the fully qualified name is registered either
    /// directly or in a group.
    pub fn contains(&self, name: &str) -> bool {
        let registry = self.registry.lock();
        registry.metrics.contains_key(name) || registry.groups.values().any(|g| g.contains(name))
    }

    fn qualify(&self, name: String) -> String {
        match &self.config.namespace {
            Some(namespace) => format!("{namespace}.{name}"),
            None => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicU64, Ordering},
        thread,
    };

    use super::*;

    #[test]
    fn snapshot_completeness() {
        let store = Store::new();
        store.create_counter("a").add(5);
        store.create_gauge("b").set(-3);

        let sample = store.sample_all().into_inner();

        let expected = [
            ("a".to_string(), Value::Counter(5)),
            ("b".to_string(), Value::Gauge(-3)),
        ]
        .into_iter()
        .collect::<FxHashMap<_, _>>();
        assert_eq!(sample, expected);
    }

    #[test]
    fn all_kinds() {
        let store = Store::new();
        store.create_counter("counter").increment();
        store.create_gauge("gauge").decrement();
        store.create_label("label").set("Hello.");
        store.create_bool("bool").toggle();
        store.create_distribution("distribution").add(2.);
        let timestamp = store.create_timestamp("timestamp");

        let sample = store.sample_all();
        assert_eq!(sample.len(), 6);
        assert_eq!(sample["counter"], Value::Counter(1));
        assert_eq!(sample["gauge"], Value::Gauge(-1));
        assert_eq!(sample["label"], Value::Label("Hello.".into()));
        assert_eq!(sample["bool"], Value::Bool(true));
        assert_eq!(sample["timestamp"], Value::Timestamp(timestamp.read()));

        let Value::Distribution(summary) = &sample["distribution"] else {
            panic!("unexpected value: {:?}", sample["distribution"]);
        };
        assert_eq!(summary.count, 1);
        assert_eq!(summary.sum, 2.);
    }

    #[test]
    fn reads_current_values() {
        let store = Store::new();
        let counter = store.create_counter("requests");

        assert_eq!(store.sample_all()["requests"], Value::Counter(0));
        counter.add(3);
        assert_eq!(store.sample_all()["requests"], Value::Counter(3));
    }

    #[test]
    fn custom_accessor() {
        let store = Store::new();
        let external = Arc::new(AtomicU64::new(7));

        let cloned = external.clone();
        store.register("external", Kind::Gauge, move || {
            Value::Gauge(cloned.load(Ordering::Relaxed) as i64)
        });
        store.register_label("version", || "1.2.3".into());

        external.store(8, Ordering::Relaxed);
        let sample = store.sample_all();
        assert_eq!(sample["external"], Value::Gauge(8));
        assert_eq!(sample["version"], Value::Label("1.2.3".into()));
    }

    #[test]
    #[should_panic(expected = "metric \"x\" is registered as counter, but sampled as label")]
    fn wrong_kind_panics() {
        let store = Store::new();
        store.register("x", Kind::Counter, || Value::Label("oops".into()));
        store.sample_all();
    }

    #[test]
    fn wrong_kind_doesnt_poison_store() {
        let store = Arc::new(Store::new());
        store.register("x", Kind::Gauge, || Value::Bool(true));

        let cloned = store.clone();
        assert!(thread::spawn(move || cloned.sample_all()).join().is_err());

        store.register_gauge("x", || 1);
        assert_eq!(store.sample_all()["x"], Value::Gauge(1));
    }

    // The collision policy is "last registration wins, silently".
    #[test]
    fn reregistration_overwrites() {
        let store = Store::new();
        let first = store.create_counter("x");
        let second = store.create_gauge("x");
        first.add(1);
        second.set(-10);

        assert_eq!(store.metric_count(), 1);
        assert_eq!(store.sample_all()["x"], Value::Gauge(-10));

        // The replaced metric is still usable by its owner.
        first.add(1);
        assert_eq!(first.read(), 2);
    }

    #[test]
    fn group_overrides_direct_metric() {
        let store = Store::new();
        store.create_counter("shared").add(1);
        store.register_group(Extractors::new().counter("shared", |v: &u64| *v), || 100);

        assert_eq!(store.sample_all()["shared"], Value::Counter(100));

        // Even if the direct metric is registered after the group.
        store.create_counter("shared").add(2);
        assert_eq!(store.sample_all()["shared"], Value::Counter(100));
    }

    #[test]
    fn later_group_overrides_earlier() {
        let store = Store::new();
        let first = store.register_group(Extractors::new().gauge("x", |_: &()| 1), || ());
        let second = store.register_group(Extractors::new().gauge("x", |_: &()| 2), || ());
        assert!(first < second);

        assert_eq!(store.sample_all()["x"], Value::Gauge(2));
    }

    #[test]
    fn group_ids_are_sequential() {
        let store = Store::new();
        let ids = (0..5)
            .map(|i| {
                let name = format!("g{i}");
                store.register_group(Extractors::new().counter(name, |_: &()| 0), || ())
            })
            .map(GroupId::to_u64)
            .collect::<Vec<_>>();

        assert_eq!(ids, [0, 1, 2, 3, 4]);
        assert_eq!(store.group_count(), 5);
        assert_eq!(GroupId::new(3).to_string(), "group#3");
    }

    #[test]
    fn producer_called_once_per_sample() {
        let store = Store::new();
        let calls = Arc::new(AtomicU64::new(0));

        let cloned = calls.clone();
        store.register_group(
            Extractors::new()
                .counter("a", |v: &u64| *v)
                .counter("b", |v: &u64| *v)
                .counter("c", |v: &u64| *v),
            move || cloned.fetch_add(1, Ordering::Relaxed),
        );

        store.sample_all();
        store.sample_all();
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn group_atomicity_under_concurrent_sampling() {
        let store = Arc::new(Store::new());
        let source = Arc::new(AtomicU64::new(0));

        let cloned = source.clone();
        store.register_group(
            Extractors::new()
                .counter("value", |v: &u64| *v)
                .counter("doubled", |v: &u64| *v * 2),
            move || cloned.fetch_add(1, Ordering::SeqCst),
        );

        let handles = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        let sample = store.sample_all();
                        let (Value::Counter(value), Value::Counter(doubled)) =
                            (&sample["value"], &sample["doubled"])
                        else {
                            panic!("unexpected kinds: {sample:?}");
                        };
                        assert_eq!(*doubled, 2 * *value);
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(source.load(Ordering::SeqCst), 8 * 500);
    }

    #[test]
    fn producer_can_use_store() {
        let store = Arc::new(Store::new());
        store.create_counter("direct");

        let cloned = Arc::downgrade(&store);
        store.register_group(Extractors::new().counter("nested", |v: &u64| *v), move || {
            cloned.upgrade().map_or(0, |store| store.metric_count() as u64)
        });

        assert_eq!(store.sample_all()["nested"], Value::Counter(1));
    }

    #[test]
    fn namespace() {
        let config = StoreConfig {
            namespace: Some("myapp".into()),
            ..Default::default()
        };
        let store = Store::with_config(config).unwrap();
        store.create_counter("requests").increment();
        store.register_group(Extractors::new().bool("ready", |_: &()| true), || ());

        let sample = store.sample_all();
        assert_eq!(sample["myapp.requests"], Value::Counter(1));
        assert_eq!(sample["myapp.ready"], Value::Bool(true));
        assert!(store.contains("myapp.requests"));
        assert!(store.contains("myapp.ready"));
        assert!(!store.contains("requests"));
    }

    #[test]
    fn invalid_config() {
        let config = StoreConfig {
            namespace: Some("".into()),
            ..Default::default()
        };
        assert!(Store::with_config(config).is_err());
    }

    #[test]
    fn introspection() {
        let store = Store::default();
        assert!(store.is_empty());
        assert!(store.sample_all().is_empty());

        store.register_group(Extractors::<()>::new(), || ());
        assert!(!store.is_empty());
        assert_eq!(store.metric_count(), 0);
        assert!(store.sample_all().is_empty());
    }
}
