//! Interaction with the `metrics` crate.

use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use metrics::{GaugeValue, Key, Unit};
use tracing::error;

use crate::{counter::Counter, distribution::Distribution, gauge::Gauge, store::Store};

/// A [`metrics::Recorder`] registering metrics in a [`Store`].
///
/// Metrics are created in the store on first use. Labels of a key are
/// rendered into the name, e.g. `requests{method=GET}`.
///
/// Gauges are integer-valued in the store, so fractional parts of gauge
/// updates are truncated. Histograms are recorded into distributions.
pub struct Recorder {
    store: Arc<Store>,
    counters: DashMap<Key, Arc<Counter>>,
    gauges: DashMap<Key, Arc<Gauge>>,
    histograms: DashMap<Key, Arc<Distribution>>,
}

impl Recorder {
    /// Creates a new recorder writing to the provided store.
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            counters: DashMap::new(),
            gauges: DashMap::new(),
            histograms: DashMap::new(),
        }
    }

    fn counter(&self, key: &Key) -> Arc<Counter> {
        get_or_create(&self.counters, key, |name, counter| {
            self.store.register_counter(name, move || counter.read());
        })
    }

    fn gauge(&self, key: &Key) -> Arc<Gauge> {
        get_or_create(&self.gauges, key, |name, gauge| {
            self.store.register_gauge(name, move || gauge.read());
        })
    }

    fn histogram(&self, key: &Key) -> Arc<Distribution> {
        get_or_create(&self.histograms, key, |name, distrib| {
            self.store.register_distribution(name, move || distrib.read());
        })
    }
}

// Registration logs, and a subscriber can report through the `metrics` crate
// back to this recorder, so it's done after the shard lock is released.
fn get_or_create<M: Default>(
    map: &DashMap<Key, Arc<M>>,
    key: &Key,
    register: impl FnOnce(String, Arc<M>),
) -> Arc<M> {
    if let Some(metric) = map.get(key) {
        return metric.value().clone();
    }

    let (metric, is_new) = match map.entry(key.clone()) {
        Entry::Occupied(entry) => (entry.get().clone(), false),
        Entry::Vacant(entry) => (entry.insert(Arc::default()).value().clone(), true),
    };

    if is_new {
        register(metric_name(key), metric.clone());
    }

    metric
}

impl metrics::Recorder for Recorder {
    fn register_counter(&self, key: &Key, _unit: Option<Unit>, _description: Option<&'static str>) {
        self.counter(key);
    }

    fn register_gauge(&self, key: &Key, _unit: Option<Unit>, _description: Option<&'static str>) {
        self.gauge(key);
    }

    fn register_histogram(&self, key: &Key, _unit: Option<Unit>, _description: Option<&'static str>) {
        self.histogram(key);
    }

    fn increment_counter(&self, key: &Key, value: u64) {
        self.counter(key).add_unsigned(value);
    }

    fn update_gauge(&self, key: &Key, value: GaugeValue) {
        let gauge = self.gauge(key);
        match value {
            GaugeValue::Absolute(value) => gauge.set(value as i64),
            GaugeValue::Increment(delta) => gauge.add(delta as i64),
            GaugeValue::Decrement(delta) => gauge.subtract(delta as i64),
        }
    }

    fn record_histogram(&self, key: &Key, value: f64) {
        self.histogram(key).add(value);
    }
}

/// Installs a global metric recorder writing to the provided store.
pub fn install_recorder(store: Arc<Store>) {
    let recorder = Recorder::new(store);

    if let Err(err) = metrics::set_boxed_recorder(Box::new(recorder)) {
        error!(error = %err, "failed to set a metric recorder");
    }
}

fn metric_name(key: &Key) -> String {
    let labels = key
        .labels()
        .map(|l| format!("{}={}", l.key(), l.value()))
        .collect::<Vec<_>>();

    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}
