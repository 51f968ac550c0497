//! URL building and parsing benchmarks
//!
//! Run with: cargo bench --bench url_benchmarks

use basenet::{QueryParams, build_url_params, get_url_params, url_parser};
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;

const URL: &str = "https://api.example.com/v2/orders/search?status=open&page=3&size=50";

fn params() -> QueryParams {
    json!({
        "page": 4,
        "sort": "created",
        "tags": ["a", "b", "c"],
        "cursor": null,
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

fn build_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_url_params");
    let params = params();

    group.bench_function("no_params", |b| {
        b.iter(|| black_box(build_url_params(black_box(URL), None)))
    });

    group.bench_function("merge_into_query", |b| {
        b.iter(|| black_box(build_url_params(black_box(URL), Some(&params))))
    });

    group.bench_function("bare_path", |b| {
        b.iter(|| black_box(build_url_params(black_box("/v2/orders"), Some(&params))))
    });

    group.finish();
}

fn parse_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("url_parser", |b| b.iter(|| black_box(url_parser(black_box(URL)))));

    group.bench_function("url_parser_relative", |b| {
        b.iter(|| black_box(url_parser(black_box("/v2/orders?x=1"))))
    });

    group.bench_function("get_url_params", |b| {
        b.iter(|| black_box(get_url_params(black_box(URL))))
    });

    group.finish();
}

criterion_group!(benches, build_benchmark, parse_benchmark);
criterion_main!(benches);
