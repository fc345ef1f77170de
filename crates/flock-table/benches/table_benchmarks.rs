#![forbid(unsafe_code)]

//! Benchmarks for the table pipeline.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use flock_table::prelude::*;

/// Simple member row for benchmarking.
#[derive(Clone)]
struct BenchMember {
    name: String,
    status: &'static str,
    group: String,
    giving: f64,
}

fn build_rows(count: usize) -> Vec<BenchMember> {
    (0..count)
        .map(|i| BenchMember {
            name: format!("Member {i}"),
            status: if i % 3 == 0 { "inactive" } else { "active" },
            group: {
                let zone = i % 12;
                format!("Small Group {zone}")
            },
            giving: (i * 37 % 1000) as f64,
        })
        .collect()
}

fn build_columns() -> Vec<Column<BenchMember>> {
    vec![
        Column::new("name", "Name", |m: &BenchMember| m.name.as_str().into()),
        Column::new("status", "Status", |m: &BenchMember| m.status.into())
            .filter_kind(FilterKind::Exact),
        Column::new("group", "Group", |m: &BenchMember| m.group.as_str().into()),
        Column::new("giving", "Giving", |m: &BenchMember| m.giving.into()),
    ]
}

fn build_table(count: usize) -> Table<BenchMember> {
    let options = TableOptions::new()
        .page_size(50)
        .strictness(Strictness::Lenient);
    match Table::configure(build_columns(), build_rows(count), options) {
        Ok(table) => table,
        Err(err) => panic!("bench table: {err}"),
    }
}

fn bench_global_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("table/global_filter");
    for count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut table = build_table(count);
            b.iter(|| {
                table.set_global_filter(black_box("group 7"));
                black_box(table.row_count());
            });
        });
    }
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("table/sort");
    for count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut table = build_table(count);
            b.iter(|| {
                let _ = table.toggle_sort(black_box("giving"));
                black_box(table.rows().len());
            });
        });
    }
    group.finish();
}

fn bench_page_walk(c: &mut Criterion) {
    let mut table = build_table(10_000);
    let _ = table.set_column_filter("status", "active");
    c.bench_function("table/page_walk", |b| {
        b.iter(|| {
            table.set_page(0);
            while !table.on_last_page() {
                table.next_page();
                black_box(table.rows());
            }
        });
    });
}

criterion_group!(benches, bench_global_filter, bench_sort, bench_page_walk);
criterion_main!(benches);
