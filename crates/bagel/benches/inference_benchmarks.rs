//! Inference and row-building benchmarks.
//!
//! Measures parsing, type inference and full per-dataset row building on
//! synthetic participants tables of increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use bagel::inference::TypeInference;
use bagel::input::Parser;
use bagel::{DataDictionary, DatasetRowBuilder};

/// Generate a synthetic participants table with the given number of rows.
///
/// Columns cover the shapes the heuristics distinguish: identifiers, native
/// numbers, yes/no, ranges, open bounds, euro decimals and categories.
fn generate_participants_tsv(rows: usize) -> String {
    let mut data = String::from(
        "participant_id\tage\tsmoker\tage_group\tscore\tweight_kg\tgroup\tsex\n",
    );

    for row in 0..rows {
        let bound = if row % 7 == 0 {
            "90+".to_string()
        } else {
            format!("{}", 20 + row % 60)
        };
        data.push_str(&format!(
            "sub-{:05}\t{}\t{}\t{}-{}\t{}\t{},{}\t{}\t{}\n",
            row,
            18 + row % 70,
            if row % 2 == 0 { "yes" } else { "No" },
            (row % 8) * 10,
            (row % 8) * 10 + 9,
            bound,
            50 + row % 50,
            row % 10,
            ["PD", "HC", "MCI"][row % 3],
            if row % 2 == 0 { "F" } else { "M" },
        ));
    }

    data
}

/// Benchmark parsing participants tables of various sizes.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_participants");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_participants_tsv(*rows);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            let parser = Parser::new();
            b.iter(|| black_box(parser.parse_bytes(data.as_bytes()).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark the heuristic chain over every column of a table.
fn bench_infer_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("infer_types");

    for rows in [100, 1_000, 10_000].iter() {
        let table = Parser::new()
            .parse_bytes(generate_participants_tsv(*rows).as_bytes())
            .unwrap();

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            let inference = TypeInference::new();
            b.iter(|| {
                for column in &table.columns {
                    black_box(inference.infer(column));
                }
            })
        });
    }

    group.finish();
}

/// Benchmark building all levels-table rows for one dataset.
fn bench_build_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_rows");
    let dictionary = DataDictionary::new();

    for rows in [100, 1_000, 10_000].iter() {
        let table = Parser::new()
            .parse_bytes(generate_participants_tsv(*rows).as_bytes())
            .unwrap();

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            let builder = DatasetRowBuilder::new();
            b.iter(|| black_box(builder.build("ds000001", table, &dictionary)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_infer_types, bench_build_rows);
criterion_main!(benches);
