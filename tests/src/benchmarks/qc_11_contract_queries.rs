//! # QC-11 Contract Queries Brutal Benchmarks
//!
//! Performance claims to validate:
//! - Metadata reads stay in the microsecond range
//! - Raw store lookups do not depend on store size
//! - Contract query overhead is dominated by the contract, not the router
//! - Slot allocation scales across threads
//!
//! Brutal Conditions:
//! - Thousands of keys per contract
//! - Nested query chains
//! - Gas exhaustion on every iteration
//! - Concurrent slot allocation

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use qc_11_contract_queries::prelude::*;
use qc_11_contract_queries::testing::TestHarness;
use serde_json::json;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn router(harness: &TestHarness, config: &QueryConfig) -> QueryRouter<InMemoryKeeper, NativeVm> {
    harness.router(config)
}

pub fn brutal_metadata_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-11/brutal/metadata_reads");
    group.measurement_time(Duration::from_secs(5));

    let harness = TestHarness::new();
    let addr = harness.deploy_verifier();
    let router = router(&harness, &QueryConfig::default());

    let requests = [
        ("params", QueryRequest::from_query(&Query::Params).unwrap()),
        (
            "contract_info",
            QueryRequest::from_query(&Query::ContractInfo {
                contract_address: addr,
            })
            .unwrap(),
        ),
        (
            "code_info",
            QueryRequest::from_query(&Query::CodeInfo { code_id: CodeId(1) }).unwrap(),
        ),
    ];

    for (name, request) in &requests {
        group.bench_function(*name, |b| b.iter(|| black_box(router.handle(request))));
    }

    group.finish();
}

pub fn brutal_raw_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-11/brutal/raw_store");

    for size in [10usize, 1_000, 10_000] {
        let harness = TestHarness::new();
        let addr = harness.deploy_verifier();
        let models: Vec<_> = (0..size)
            .map(|i| Model::new(format!("key_{i}"), format!("value_{i}")))
            .collect();
        harness.keeper.set_contract_store(&addr, &models).unwrap();
        let router = router(&harness, &QueryConfig::default());
        let query = Query::raw_store(addr, format!("key_{}", size / 2));

        group.bench_with_input(BenchmarkId::new("lookup_store_size", size), &query, |b, q| {
            b.iter(|| black_box(router.route(None, q)))
        });
    }

    group.finish();
}

pub fn brutal_contract_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-11/brutal/contract_queries");
    group.measurement_time(Duration::from_secs(5));

    let harness = TestHarness::new();
    let verifier = harness.deploy_verifier();
    let burner = harness.deploy_gas_burner();
    let proxy = harness.deploy_proxy();
    let router = router(&harness, &QueryConfig::default());

    let verifier_query = Query::contract_store(verifier, json!({ "verifier": {} }));
    group.bench_function("verifier", |b| {
        b.iter(|| black_box(router.route(None, &verifier_query)))
    });

    let nested = Query::contract_store(
        proxy,
        json!({ "forward": { "contract": verifier, "msg": { "verifier": {} } } }),
    );
    group.bench_function("nested_verifier", |b| {
        b.iter(|| black_box(router.route(None, &nested)))
    });

    // Every iteration burns the full budget
    for limit in [10_000u64, 100_000] {
        let router = harness.router(&QueryConfig::default().with_gas_limit(limit));
        let query = Query::contract_store(burner, json!({}));
        group.throughput(Throughput::Elements(limit));
        group.bench_with_input(BenchmarkId::new("out_of_gas", limit), &query, |b, q| {
            b.iter(|| black_box(router.route(None, q)))
        });
    }

    group.finish();
}

pub fn brutal_slot_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-11/brutal/slot_allocation");

    let tracker = ReentrancyTracker::default();
    group.bench_function("single_thread", |b| {
        b.iter(|| black_box(tracker.prepare(None, 0).vm_slot()))
    });

    for threads in [2usize, 4, 8] {
        let tracker = Arc::new(ReentrancyTracker::default());
        group.throughput(Throughput::Elements((threads * 1_000) as u64));
        group.bench_with_input(BenchmarkId::new("threads", threads), &threads, |b, &n| {
            b.iter(|| {
                let handles: Vec<_> = (0..n)
                    .map(|_| {
                        let tracker = Arc::clone(&tracker);
                        thread::spawn(move || {
                            for _ in 0..1_000 {
                                black_box(tracker.prepare(None, 0).vm_slot());
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            })
        });
    }

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    brutal_metadata_reads(c);
    brutal_raw_store(c);
    brutal_contract_queries(c);
    brutal_slot_allocation(c);
}
