use std::sync::Arc;

use metrics::{counter, decrement_gauge, gauge, histogram, increment_counter, increment_gauge};

use tally::{install_recorder, prelude::*};

mod common;

// The recorder is global, so the whole flow lives in one test.
#[test]
fn metrics_facade() {
    common::setup_logger();

    let store = Arc::new(Store::new());
    install_recorder(store.clone());

    increment_counter!("requests_total");
    counter!("requests_total", 4);
    counter!("errors_total", 1, "kind" => "timeout");

    gauge!("connections", 10.);
    increment_gauge!("connections", 2.);
    decrement_gauge!("connections", 5.);

    histogram!("latency_seconds", 0.5);
    histogram!("latency_seconds", 1.5);

    let sample = store.sample_all();
    assert_eq!(common::counter(&sample["requests_total"]), 5);
    assert_eq!(common::counter(&sample["errors_total{kind=timeout}"]), 1);
    assert_eq!(common::gauge(&sample["connections"]), 7);

    let Value::Distribution(summary) = &sample["latency_seconds"] else {
        panic!("unexpected value: {:?}", sample["latency_seconds"]);
    };
    assert_eq!(summary.count, 2);
    assert_eq!(summary.mean, 1.);
    assert_eq!(summary.min, 0.5);
    assert_eq!(summary.max, 1.5);

    // Installing another recorder fails, but it's only logged.
    install_recorder(Arc::new(Store::new()));
    increment_counter!("requests_total");
    assert_eq!(common::counter(&store.sample_all()["requests_total"]), 6);
}
