//! Query layer configuration from environment variables.

use crate::domain::context::DEFAULT_VM_POOL_SIZE;
use std::env;

/// Gas granted to every top-level contract query.
pub const DEFAULT_CONTRACT_QUERY_GAS_LIMIT: u64 = 3_000_000;

/// Contract frames one call tree may stack.
pub const DEFAULT_MAX_QUERY_DEPTH: u32 = 10;

/// Configuration for the contract query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Gas limit of the meter built for each top-level contract query
    pub contract_query_gas_limit: u64,

    /// Number of VM slots queries rotate through
    pub vm_pool_size: usize,

    /// Maximum nesting of contract frames in one call tree
    pub max_query_depth: u32,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            contract_query_gas_limit: DEFAULT_CONTRACT_QUERY_GAS_LIMIT,
            vm_pool_size: DEFAULT_VM_POOL_SIZE,
            max_query_depth: DEFAULT_MAX_QUERY_DEPTH,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl QueryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_CONTRACT_QUERY_GAS_LIMIT`: Gas per top-level query (default: 3000000)
    /// - `QC_VM_POOL_SIZE`: VM slot pool size (default: 128, zero is ignored)
    /// - `QC_MAX_QUERY_DEPTH`: Nested contract frame limit (default: 10)
    /// - `QC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `QC_JSON_LOGS`: Enable JSON logs (default: false)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Unparseable
    /// values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            contract_query_gas_limit: lookup("QC_CONTRACT_QUERY_GAS_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.contract_query_gas_limit),

            vm_pool_size: lookup("QC_VM_POOL_SIZE")
                .and_then(|v| v.parse().ok())
                .filter(|&size: &usize| size > 0)
                .unwrap_or(defaults.vm_pool_size),

            max_query_depth: lookup("QC_MAX_QUERY_DEPTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_query_depth),

            log_level: lookup("QC_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: lookup("QC_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }

    /// Sets the per-query gas limit.
    #[must_use]
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.contract_query_gas_limit = gas_limit;
        self
    }

    /// Sets the VM slot pool size. Zero keeps the current value.
    #[must_use]
    pub fn with_vm_pool_size(mut self, pool_size: usize) -> Self {
        if pool_size > 0 {
            self.vm_pool_size = pool_size;
        }
        self
    }

    /// Sets the nested frame limit.
    #[must_use]
    pub fn with_max_query_depth(mut self, depth: u32) -> Self {
        self.max_query_depth = depth;
        self
    }
}
