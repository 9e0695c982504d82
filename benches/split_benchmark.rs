use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use strsplit_rs::split::{Direction, SplitConfig, tokenize};
use strsplit_rs::{StringColumn, StringScalar, split};

fn generate_column(rows: usize, fields: usize, sep: &str) -> StringColumn {
    let lines: Vec<String> = (0..rows)
        .map(|i| {
            (0..fields)
                .map(|j| format!("f{}x{}", i % 97, j))
                .collect::<Vec<_>>()
                .join(sep)
        })
        .collect();
    StringColumn::from_strs(&lines)
}

fn bench_delimiter(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_delimiter");
    for rows in [10_000, 200_000] {
        let col = generate_column(rows, 6, "::");
        let delim = StringScalar::from("::");
        group.bench_with_input(BenchmarkId::new("split", rows), &col, |b, col| {
            b.iter(|| split(black_box(col), &delim, -1).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("split_max2", rows), &col, |b, col| {
            b.iter(|| split(black_box(col), &delim, 2).unwrap())
        });
    }
    group.finish();
}

fn bench_whitespace(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_whitespace");
    for rows in [10_000, 200_000] {
        let col = generate_column(rows, 6, "  \t");
        group.bench_with_input(BenchmarkId::new("split", rows), &col, |b, col| {
            b.iter(|| split(black_box(col), &StringScalar::from(""), -1).unwrap())
        });
    }
    group.finish();
}

fn bench_sequential_vs_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_threshold");
    let col = generate_column(200_000, 6, "_");
    for (name, threshold) in [("sequential", usize::MAX), ("parallel", 0)] {
        let cfg = SplitConfig {
            parallel_threshold: threshold,
            ..SplitConfig::new(Direction::Reverse, b"_", 3)
        };
        group.bench_function(name, |b| {
            b.iter(|| tokenize(black_box(&col.view()), &cfg).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_delimiter,
    bench_whitespace,
    bench_sequential_vs_parallel,
);
criterion_main!(benches);
