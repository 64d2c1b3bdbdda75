//! Benchmarks for the Plugin Scout introspection pipeline.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use plugin_scout::application::Introspector;
use plugin_scout::domain::parser::build_tree;
use plugin_scout::infrastructure::diagnostics::MemorySink;
use plugin_scout::infrastructure::fs_reader::FsSourceReader;
use plugin_scout::infrastructure::jsdoc::doclets_for_source;
use plugin_scout::infrastructure::NoDocExtractor;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

// ═══════════════════════════════════════════════════════════════════════════
// Synthetic Data Generators
// ═══════════════════════════════════════════════════════════════════════════

/// A CommonJS plugin with `helpers` documented helper functions and a
/// factory returning `capabilities` properties.
fn synthetic_plugin(helpers: usize, capabilities: usize) -> String {
    let mut src = String::from("'use strict';\n\n");
    for i in 0..helpers {
        let _ = write!(
            src,
            "/**\n * Helper {i}.\n * @param {{number}} x - input\n * @returns {{number}}\n */\nfunction helper{i}(x) {{\n  const re = /h{i}+/g;\n  return re.test(`${{x}}`) ? x / {d} : x * 2;\n}}\n\n",
            i = i,
            d = i + 1
        );
    }
    src.push_str("function build(options) {\n  return {\n");
    for i in 0..capabilities {
        match i % 3 {
            0 => { let _ = writeln!(src, "    cap{i}: (a) => helper{h}(a),", i = i, h = i % helpers.max(1)); }
            1 => { let _ = writeln!(src, "    cap{i}: function () {{ return options; }},", i = i); }
            _ => { let _ = writeln!(src, "    cap{i}() {{ return {i}; }},", i = i); }
        }
    }
    src.push_str("  };\n}\n\nmodule.exports = build;\n");
    src
}

fn introspector() -> Introspector {
    Introspector::new(Arc::new(FsSourceReader), Arc::new(NoDocExtractor), Arc::new(MemorySink::default()))
}

// ═══════════════════════════════════════════════════════════════════════════
// Benchmarks
// ═══════════════════════════════════════════════════════════════════════════

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse/build_tree");
    for &helpers in &[10usize, 100, 1000] {
        let src = synthetic_plugin(helpers, 20);
        group.throughput(Throughput::Bytes(src.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(helpers), &src, |b, src| {
            b.iter(|| build_tree(black_box(src)).unwrap())
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("introspect/pipeline");
    let introspector = introspector();
    for &capabilities in &[10usize, 100, 1000] {
        let src = synthetic_plugin(50, capabilities);
        group.throughput(Throughput::Elements(capabilities as u64));
        group.bench_with_input(BenchmarkId::from_parameter(capabilities), &src, |b, src| {
            b.iter(|| introspector.introspect_source(Path::new("bench.js"), black_box(src)))
        });
    }
    group.finish();
}

fn bench_doclets(c: &mut Criterion) {
    let src = synthetic_plugin(200, 20);
    c.bench_function("jsdoc/doclets_200_helpers", |b| {
        b.iter(|| doclets_for_source(Path::new("bench.js"), black_box(&src)).unwrap())
    });
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("introspect/batch");
    group.sample_size(20);
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = (0..64)
        .map(|i| {
            let path = dir.path().join(format!("plugin_{}.js", i));
            std::fs::write(&path, synthetic_plugin(20, 20)).unwrap();
            path
        })
        .collect();
    let introspector = introspector();

    group.throughput(Throughput::Elements(paths.len() as u64));
    group.bench_function("parallel_64_files", |b| b.iter(|| introspector.introspect_many(black_box(&paths))));
    group.bench_function("sequential_64_files", |b| {
        b.iter(|| paths.iter().map(|p| introspector.introspect(p)).collect::<Vec<_>>())
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_pipeline, bench_doclets, bench_batch);
criterion_main!(benches);
