//! # Contract Query Metrics
//!
//! Prometheus metrics for the query service.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-11-contract-queries = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `contract_queries_total` - Counter of queries served, by endpoint
//! - `contract_query_failures_total` - Counter of failed queries, by error kind
//! - `contract_query_gas_used_total` - Counter of gas consumed by contract queries
//! - `contract_query_internal_faults_total` - Counter of recovered VM faults

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Queries served, labeled by endpoint
    pub static ref QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "contract_queries_total",
        "Total number of contract queries served",
        &["endpoint"]
    )
    .expect("Failed to create QUERIES_TOTAL metric");

    /// Failed queries, labeled by error kind
    pub static ref QUERY_FAILURES: IntCounterVec = register_int_counter_vec!(
        "contract_query_failures_total",
        "Total number of failed contract queries",
        &["kind"]
    )
    .expect("Failed to create QUERY_FAILURES metric");

    /// Gas consumed by contract-code queries
    pub static ref GAS_USED: IntCounter = register_int_counter!(
        "contract_query_gas_used_total",
        "Total gas consumed by contract queries"
    )
    .expect("Failed to create GAS_USED metric");

    /// Faults recovered at the invoker boundary
    pub static ref INTERNAL_FAULTS: IntCounter = register_int_counter!(
        "contract_query_internal_faults_total",
        "Total number of internal faults recovered during contract queries"
    )
    .expect("Failed to create INTERNAL_FAULTS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a query served on `endpoint`
#[cfg(feature = "metrics")]
pub fn record_query(endpoint: &str) {
    QUERIES_TOTAL.with_label_values(&[endpoint]).inc();
}

/// Record a failed query by error kind
#[cfg(feature = "metrics")]
pub fn record_failure(kind: &str) {
    QUERY_FAILURES.with_label_values(&[kind]).inc();
    if kind == "internal_fault" {
        INTERNAL_FAULTS.inc();
    }
}

/// Record gas consumed by a contract query
#[cfg(feature = "metrics")]
pub fn record_gas_used(gas: u64) {
    GAS_USED.inc_by(gas);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

/// Record a query served on `endpoint`
#[cfg(not(feature = "metrics"))]
pub fn record_query(_endpoint: &str) {}

/// Record a failed query by error kind
#[cfg(not(feature = "metrics"))]
pub fn record_failure(_kind: &str) {}

/// Record gas consumed by a contract query
#[cfg(not(feature = "metrics"))]
pub fn record_gas_used(_gas: u64) {}
