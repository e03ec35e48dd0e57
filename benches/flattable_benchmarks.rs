use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flattable::{flatten, reconcile, search, ColumnConfig};
use serde_json::{json, Value};

/// Build a synthetic dataset of nested records with array fan-out.
fn make_records(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "ident": format!("WPT{:04}", i),
                "position": {"lat": 48.0 + i as f64 * 0.01, "lon": 11.0},
                "frequencies": [
                    {"mhz": 118.1, "service": "TWR"},
                    {"mhz": 121.7, "service": "GND"}
                ],
                "remarks": ["day only", "ppr"]
            })
        })
        .collect()
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");

    for size in [10, 100, 1000].iter() {
        let records = make_records(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| flatten(black_box(&records)));
        });
    }
    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [10, 50, 200].iter() {
        let fields: Vec<String> = (0..*size).map(|i| format!("field_{}", i)).collect();
        let mut saved = ColumnConfig::default();
        for (i, f) in fields.iter().enumerate().step_by(2) {
            saved.widths.insert(f.clone(), 150 + i as u32);
            saved.order.push(f.clone());
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| reconcile(black_box(&fields), Some(black_box(&saved))));
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [10, 100, 1000].iter() {
        let raw = json!({"results": make_records(*size)});
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| search(black_box(&raw), black_box("twr")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_flatten, bench_reconcile, bench_search);
criterion_main!(benches);
