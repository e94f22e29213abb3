//! Search and binding throughput
//!
//! Every search re-walks the document from the start, so a table load costs
//! one walk per parameter. These benchmarks track that cost at the document
//! sizes a configuration table actually sees.

use codec::{load_all, Binding, Document, ScanLimits};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use types::{JsonType, SlotRef, Value, MAX_CFG_ITEMS};

fn config_document(params: usize) -> String {
    let members: Vec<String> = (0..params)
        .map(|i| {
            if i % 2 == 0 {
                format!("\"config.Param{i}\": {}", i * 100)
            } else {
                format!("\"config.Param{i}\": \"value-{i}\"")
            }
        })
        .collect();
    format!("{{ \"app\": {{ {} }} }}", members.join(", "))
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for params in [4, 16, MAX_CFG_ITEMS] {
        let text = config_document(params);
        group.bench_with_input(BenchmarkId::from_parameter(params), &text, |b, text| {
            b.iter(|| Document::parse(black_box(text.as_bytes()), ScanLimits::default()));
        });
    }

    group.finish();
}

fn bench_search_last_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_last_key");

    for params in [4, 16, MAX_CFG_ITEMS] {
        let text = config_document(params);
        let doc = Document::parse(text.as_bytes(), ScanLimits::default()).unwrap();
        let key = format!("config.Param{}", params - 1);
        group.bench_with_input(BenchmarkId::from_parameter(params), &key, |b, key| {
            b.iter(|| doc.search(black_box(key)));
        });
    }

    group.finish();
}

fn bench_full_table_load(c: &mut Criterion) {
    let text = config_document(MAX_CFG_ITEMS);
    let doc = Document::parse(text.as_bytes(), ScanLimits::default()).unwrap();

    let mut bindings: Vec<Binding> = (0..MAX_CFG_ITEMS)
        .map(|i| {
            let expected = if i % 2 == 0 {
                JsonType::Number
            } else {
                JsonType::String
            };
            Binding::new(&format!("config.Param{i}"), expected, SlotRef(i), 64).unwrap()
        })
        .collect();
    let mut slots = vec![Value::Empty; MAX_CFG_ITEMS];

    c.bench_function("load_all_max_table", |b| {
        b.iter(|| load_all(black_box(&mut bindings), &doc, &mut slots));
    });
}

criterion_group!(
    benches,
    bench_validate,
    bench_search_last_key,
    bench_full_table_load
);
criterion_main!(benches);
