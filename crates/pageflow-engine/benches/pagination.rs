use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pageflow_engine::{
    CanonicalOffset, Document, PageCapacity, TextMetrics, flatten, from_canonical, paginate,
    to_canonical,
};
mod common;

fn bench_paginate(c: &mut Criterion) {
    let mut group = c.benchmark_group("paginate");
    let capacity = PageCapacity::default();
    let metrics = TextMetrics::for_capacity(&capacity);

    for sections in [10, 100, 500] {
        let doc = Document::from_markup(&common::generate_report_markup(sections));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &doc, |b, doc| {
            b.iter(|| std::hint::black_box(paginate(doc, &capacity, &metrics)));
        });
    }

    group.finish();
}

fn bench_parse_and_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync");
    let markup = common::generate_report_markup(100);
    let capacity = PageCapacity::default();
    let pages = paginate(
        &Document::from_markup(&markup),
        &capacity,
        &TextMetrics::for_capacity(&capacity),
    );

    group.bench_function("parse_markup", |b| {
        b.iter(|| std::hint::black_box(Document::from_markup(&markup)));
    });
    group.bench_function("flatten", |b| {
        b.iter(|| std::hint::black_box(flatten(&pages)));
    });

    group.finish();
}

fn bench_cursor(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor");
    let capacity = PageCapacity::default();
    let doc = Document::from_markup(&common::generate_report_markup(100));
    let pages = paginate(&doc, &capacity, &TextMetrics::for_capacity(&capacity));
    let middle = CanonicalOffset(doc.text_len() / 2);

    group.bench_function("canonical_round_trip", |b| {
        b.iter(|| {
            let address = from_canonical(middle, &pages);
            std::hint::black_box(address.and_then(|a| to_canonical(&a, &pages)))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_paginate, bench_parse_and_flatten, bench_cursor);
criterion_main!(benches);
