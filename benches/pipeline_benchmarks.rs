//! Request pipeline benchmarks
//!
//! Measures facade overhead over an in-memory adapter.
//!
//! Run with: cargo bench --bench pipeline_benchmarks

use basenet::prelude::*;
use basenet::{AdapterRequest, async_trait};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

struct Echo;

#[async_trait]
impl Adapter for Echo {
    async fn send(&self, _request: AdapterRequest) -> std::result::Result<Response, TransportFailure> {
        Ok(Response::new(200, json!({"code": 0, "data": {"id": 1}})))
    }
}

fn facade_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("facade");

    let plain = BaseNetwork::with_adapter(
        BaseNetworkConfig::builder()
            .base_url("https://api.example.com")
            .build(),
        Arc::new(Echo),
    );

    let classified = BaseNetwork::with_adapter(
        BaseNetworkConfig::builder()
            .base_url("https://api.example.com")
            .biz(BizConfig::new("code", CodeNormal::any_of([0, 200])).msg_key("msg"))
            .retry(RetryConfig::new().count("api.example.com", 2))
            .build(),
        Arc::new(Echo),
    );

    let plain = &plain;
    let classified = &classified;

    group.bench_function("get_plain", |b| {
        b.to_async(&rt).iter(|| async move {
            black_box(
                plain
                    .get("/users", json!({"page": 1}), RequestOptions::default())
                    .await,
            )
        })
    });

    group.bench_function("get_classified", |b| {
        b.to_async(&rt).iter(|| async move {
            black_box(
                classified
                    .get("/users", json!({"page": 1}), RequestOptions::default())
                    .await,
            )
        })
    });

    group.bench_function("post_classified", |b| {
        b.to_async(&rt).iter(|| async move {
            black_box(
                classified
                    .post("/orders", json!({"sku": 7, "qty": 2}), RequestOptions::default())
                    .await,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, facade_benchmark);
criterion_main!(benches);
