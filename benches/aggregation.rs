use std::hint::black_box;

use batch_aggregation::config::{ReportConfig, TransactionConfig};
use batch_aggregation::domains::{compute_metrics, compute_metrics_parallel, Transaction};
use batch_aggregation::execution::{ExecutionEngine, ExecutionOptions};
use batch_aggregation::processing::{aggregate, Materialized};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn synthetic_batch(n: usize) -> Vec<Transaction> {
    (0..n)
        .map(|i| {
            let amount = ((i * 7_919) % 3_000) as f64 + 0.5;
            Transaction::new(format!("user-{}", i % 97), amount, i % 5 != 0)
        })
        .collect()
}

fn engine() -> ExecutionEngine {
    ExecutionEngine::new(ExecutionOptions::default()).unwrap()
}

fn benchmark_aggregate(c: &mut Criterion) {
    let cfg = ReportConfig::default();
    let engine = engine();
    let mut group = c.benchmark_group("aggregate");

    for n in [1_000usize, 100_000] {
        let values: Materialized = (0..n).map(|i| ((i * 31) % 2_500) as f64).collect();
        group.bench_with_input(BenchmarkId::new("sequential", n), &values, |b, v| {
            b.iter(|| aggregate(black_box(v), &cfg))
        });
        group.bench_with_input(BenchmarkId::new("parallel", n), &values, |b, v| {
            b.iter(|| engine.aggregate(black_box(v), &cfg))
        });
    }
    group.finish();
}

fn benchmark_transaction_metrics(c: &mut Criterion) {
    let cfg = TransactionConfig::default();
    let engine = engine();
    let batch = synthetic_batch(50_000);

    c.bench_function("compute_metrics_sequential", |b| {
        b.iter(|| compute_metrics(black_box(&batch), &cfg).unwrap())
    });
    c.bench_function("compute_metrics_parallel", |b| {
        b.iter(|| compute_metrics_parallel(&engine, black_box(&batch), &cfg).unwrap())
    });
}

criterion_group!(benches, benchmark_aggregate, benchmark_transaction_metrics);
criterion_main!(benches);
