use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tally::{Extractors, Store};

fn fill(store: &Store, count: usize) {
    for i in 0..count {
        match i % 6 {
            0 => store.create_counter(format!("counter_{i}")).add(i as i64),
            1 => store.create_gauge(format!("gauge_{i}")).set(-(i as i64)),
            2 => store.create_label(format!("label_{i}")).set(format!("value_{i}")),
            3 => store.create_bool(format!("bool_{i}")).set(i % 4 == 3),
            4 => store.create_timestamp(format!("timestamp_{i}")).stamp(),
            _ => store.create_distribution(format!("distribution_{i}")).add(i as f64),
        }
    }
}

fn sample_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_all");

    for count in [10, 100, 1000] {
        let store = Store::new();
        fill(&store, count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("metrics", count), &store, |b, store| {
            b.iter(|| black_box(store.sample_all()))
        });
    }

    group.finish();
}

fn groups(c: &mut Criterion) {
    let mut group = c.benchmark_group("groups");

    let store = Store::new();
    store.register_runtime_metrics();
    group.bench_function("runtime", |b| b.iter(|| black_box(store.sample_all())));

    let store = Store::new();
    for i in 0..10 {
        store.register_group(
            Extractors::new()
                .counter(format!("g{i}.a"), |v: &u64| *v)
                .counter(format!("g{i}.b"), |v: &u64| *v + 1)
                .gauge(format!("g{i}.c"), |v: &u64| *v as i64),
            move || i,
        );
    }
    group.bench_function("ten_groups", |b| b.iter(|| black_box(store.sample_all())));

    group.finish();
}

criterion_group!(benches, sample_all, groups);
criterion_main!(benches);
