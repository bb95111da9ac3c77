//! Throughput Benchmark for duokv
//!
//! This benchmark measures the performance of the string store under
//! various workloads.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use duokv::storage::StringStore;

/// Benchmark PUT operations
fn bench_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("put");
    group.throughput(Throughput::Elements(1));

    group.bench_function("put_new_keys", |b| {
        let mut store = StringStore::new();
        let mut i = 0u64;
        b.iter(|| {
            store.put(&format!("key:{}", i), "small_value").unwrap();
            i += 1;
        });
    });

    group.bench_function("put_replace_same_key", |b| {
        let mut store = StringStore::new();
        store.put("key", "initial").unwrap();
        b.iter(|| {
            store.put("key", "replacement").unwrap();
        });
    });

    group.bench_function("put_medium_value", |b| {
        let mut store = StringStore::new();
        let value = "x".repeat(1024); // 1KB value
        let mut i = 0u64;
        b.iter(|| {
            store.put(&format!("key:{}", i), &value).unwrap();
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let mut store = StringStore::new();

    // Pre-populate with data
    for i in 0..1_000 {
        store
            .put(&format!("key:{}", i), &format!("value:{}", i))
            .unwrap();
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_first_key", |b| {
        b.iter(|| {
            black_box(store.get("key:0"));
        });
    });

    group.bench_function("get_last_key", |b| {
        b.iter(|| {
            black_box(store.get("key:999"));
        });
    });

    group.bench_function("get_missing", |b| {
        b.iter(|| {
            black_box(store.get("missing"));
        });
    });

    group.finish();
}

/// Benchmark DELETE plus tombstone reuse
fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");
    group.throughput(Throughput::Elements(1));

    group.bench_function("delete_and_refill", |b| {
        let mut store = StringStore::new();
        store.put("churn", "value").unwrap();
        b.iter(|| {
            store.delete("churn");
            store.put("churn", "value").unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_put, bench_get, bench_delete);
criterion_main!(benches);
