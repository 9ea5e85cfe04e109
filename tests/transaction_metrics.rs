use batch_aggregation::config::{ReportConfig, TransactionConfig};
use batch_aggregation::domains::{compute_metrics, compute_metrics_parallel, Transaction};
use batch_aggregation::execution::{ExecutionEngine, ExecutionOptions};
use batch_aggregation::types::{BandCounts, Quantifiers};

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn daily_batch() -> Vec<Transaction> {
    vec![
        Transaction::new("Alice", 1_200.0, true),
        Transaction::new("Bob", 5.0, true),
        Transaction::new("Charlie", 300.0, false),
        Transaction::new("Diana", 80.0, true),
        Transaction::new("Eve", 2_500.0, true),
        Transaction::new("Frank", 15.0, true),
        Transaction::new("George", 1_800.0, true),
    ]
}

fn engine() -> ExecutionEngine {
    ExecutionEngine::new(ExecutionOptions {
        num_threads: Some(4),
        chunk_size: 2,
        max_in_flight_chunks: 4,
    })
    .unwrap()
}

#[test]
fn fee_and_minimum_value_keep_only_qualifying_amounts() {
    let batch = vec![
        Transaction::new("a", 100.0, true),
        Transaction::new("b", 500.0, false),
        Transaction::new("c", 10.0, true),
    ];
    let r = compute_metrics(&batch, &TransactionConfig::default()).unwrap();

    assert_eq!(r.count, 1);
    assert_eq!(r.total, 98.0);
    assert_eq!(r.average, 98.0);
    assert_eq!(r.max, 98.0);
    assert_eq!(r.min, 98.0);
    assert_eq!(r.median, Some(98.0));
    assert_eq!(r.running_sum, vec![98.0]);
    assert_eq!(r.sorted_desc, vec![98.0]);
}

#[test]
fn empty_batch_yields_defined_defaults() {
    let r = compute_metrics(&[], &TransactionConfig::default()).unwrap();

    assert_eq!(r.count, 0);
    assert_eq!(r.total, 0.0);
    assert_eq!(r.average, 0.0);
    assert!(!r.average.is_nan());
    assert_eq!(r.max, f64::NEG_INFINITY);
    assert_eq!(r.min, f64::INFINITY);
    assert_eq!(r.median, None);
    assert_eq!(r.high_value, 0);
    assert_eq!(r.bands, BandCounts::default());
    assert_eq!(r.quantifiers, Quantifiers::default());
    assert!(r.running_sum.is_empty());
    assert!(r.sorted_desc.is_empty());
}

#[test]
fn batch_where_every_amount_is_filtered_is_empty() {
    let batch = vec![
        Transaction::new("a", 9.0, true),
        Transaction::new("b", 9_000.0, false),
    ];
    let r = compute_metrics(&batch, &TransactionConfig::default()).unwrap();
    assert!(r.is_empty());
}

#[test]
fn daily_batch_metrics() {
    let r = compute_metrics(&daily_batch(), &TransactionConfig::default()).unwrap();

    assert_eq!(r.count, 5);
    assert!(approx_eq(r.total, 5_483.1));
    assert!(approx_eq(r.average, 5_483.1 / 5.0));
    assert_eq!(r.max, 2_450.0);
    assert!(approx_eq(r.min, 14.7));
    assert_eq!(r.median, Some(1_176.0));
    assert_eq!(r.high_value, 3);
    assert_eq!(
        r.bands,
        BandCounts {
            small: 2,
            medium: 0,
            large: 3
        }
    );
    assert!(r.quantifiers.all_positive);
    assert!(r.quantifiers.any_very_large);
    assert!(r.quantifiers.none_negative);

    let expected_running = [1_176.0, 1_254.4, 3_704.4, 3_719.1, 5_483.1];
    assert_eq!(r.running_sum.len(), expected_running.len());
    for (got, want) in r.running_sum.iter().zip(expected_running) {
        assert!(approx_eq(*got, want), "{got} vs {want}");
    }
    assert_eq!(r.sorted_desc[0], 2_450.0);
    assert_eq!(r.sorted_desc[1], 1_764.0);
    assert_eq!(r.sorted_desc[2], 1_176.0);
    assert!(r.sorted_desc.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn custom_thresholds_change_bands_and_flags() {
    let cfg = TransactionConfig {
        fee_rate: 1.0,
        min_value: 0.0,
        report: ReportConfig {
            high_threshold: 50.0,
            huge_threshold: 100.0,
            ..Default::default()
        },
    };
    let batch = vec![
        Transaction::new("a", 40.0, true),
        Transaction::new("b", 60.0, true),
        Transaction::new("c", 150.0, true),
    ];
    let r = compute_metrics(&batch, &cfg).unwrap();
    assert_eq!(r.high_value, 2);
    assert!(r.quantifiers.any_very_large);
    assert_eq!(r.bands.small, 2);
    assert_eq!(r.bands.medium, 1);
}

#[test]
fn parallel_metrics_match_sequential() {
    let cfg = TransactionConfig::default();
    let batch = daily_batch();
    let seq = compute_metrics(&batch, &cfg).unwrap();
    let par = compute_metrics_parallel(&engine(), &batch, &cfg).unwrap();

    assert_eq!(par.count, seq.count);
    assert!(approx_eq(par.total, seq.total));
    assert_eq!(par.max, seq.max);
    assert_eq!(par.min, seq.min);
    assert_eq!(par.median, seq.median);
    assert_eq!(par.bands, seq.bands);
    assert_eq!(par.quantifiers, seq.quantifiers);
    assert_eq!(par.sorted_desc, seq.sorted_desc);
}

#[test]
fn repeated_runs_produce_identical_reports() {
    let cfg = TransactionConfig::default();
    let batch = daily_batch();
    let first = compute_metrics(&batch, &cfg).unwrap();
    let second = compute_metrics(&batch, &cfg).unwrap();
    assert_eq!(first, second);

    let eng = engine();
    let p1 = compute_metrics_parallel(&eng, &batch, &cfg).unwrap();
    let p2 = compute_metrics_parallel(&eng, &batch, &cfg).unwrap();
    assert_eq!(p1, p2);
}

#[test]
fn invalid_config_is_rejected_by_both_entry_points() {
    let cfg = TransactionConfig {
        fee_rate: -0.5,
        ..Default::default()
    };
    assert!(compute_metrics(&daily_batch(), &cfg).is_err());
    assert!(compute_metrics_parallel(&engine(), &daily_batch(), &cfg).is_err());
}

#[test]
fn report_serializes_to_json() {
    let r = compute_metrics(&daily_batch(), &TransactionConfig::default()).unwrap();
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["count"], 5);
    assert_eq!(json["median"], 1_176.0);
    assert_eq!(json["bands"]["large"], 3);
    assert_eq!(json["sorted_desc"].as_array().map(|a| a.len()), Some(5));
}
