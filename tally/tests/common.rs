#![allow(dead_code)]

use tally::Value;

pub(crate) fn counter(value: &Value) -> u64 {
    match value {
        Value::Counter(value) => *value,
        other => panic!("expected a counter, got {other:?}"),
    }
}

pub(crate) fn gauge(value: &Value) -> i64 {
    match value {
        Value::Gauge(value) => *value,
        other => panic!("expected a gauge, got {other:?}"),
    }
}

pub(crate) fn setup_logger() {
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
