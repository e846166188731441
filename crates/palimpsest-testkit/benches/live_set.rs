//! Compaction throughput over generated histories.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use palimpsest_testkit::generators::{build_history, random_steps, Note, Notice};
use palimpsest_view::{build_live_set, Classifier};

fn bench_build_live_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_live_set");
    for size in [100usize, 1_000, 10_000] {
        let log = build_history(&random_steps(size, 7));
        group.throughput(Throughput::Elements(log.len() as u64));
        group.bench_with_input(BenchmarkId::new("tip_only", size), &log, |b, log| {
            b.iter(|| build_live_set::<Note>(black_box(log)))
        });
        group.bench_with_input(BenchmarkId::new("whole_chain", size), &log, |b, log| {
            b.iter(|| build_live_set::<Notice>(black_box(log)))
        });
    }
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let log = build_history(&random_steps(1_000, 11));
    let classifier = Classifier::for_types(["note", "notice"]);
    c.bench_function("classify_1000", |b| {
        b.iter(|| classifier.classify_all(black_box(&log)))
    });
}

criterion_group!(benches, bench_build_live_set, bench_classify);
criterion_main!(benches);
