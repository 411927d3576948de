//! # Contract Query Benchmarks
//!
//! | Area | Target |
//! |------|--------|
//! | Metadata read | < 50μs |
//! | Raw store lookup | O(log n) in store size |
//! | Verifier contract query | < 100μs |
//! | Slot allocation | lock-free, scales with threads |

use criterion::{criterion_group, criterion_main, Criterion};
use qc_tests::benchmarks::qc_11_contract_queries;

fn bench_contract_queries(c: &mut Criterion) {
    qc_11_contract_queries::register_benchmarks(c);
}

criterion_group!(benches, bench_contract_queries);
criterion_main!(benches);
