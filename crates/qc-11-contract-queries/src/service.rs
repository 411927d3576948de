//! # Contract Query Service
//!
//! Async driving adapter over the [`QueryRouter`]. Each top-level query runs
//! on its own blocking worker so concurrent queries never share an
//! execution context; the service keeps statistics and logs every outcome.

use crate::adapters::{InMemoryKeeper, NativeVm};
use crate::config::QueryConfig;
use crate::domain::query::QueryRequest;
use crate::domain::value_objects::Bytes;
use crate::errors::QueryError;
use crate::invoker::capture_trace;
use crate::metrics;
use crate::ports::inbound::ContractQueryApi;
use crate::ports::outbound::{ContractKeeper, ContractVm};
use crate::router::{QueryOutcome, QueryRouter};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Statistics for the Contract Query Service.
#[derive(Debug, Default, Clone)]
pub struct QueryStats {
    /// Total top-level queries served.
    pub queries_served: u64,
    /// Queries that returned a response.
    pub successful_queries: u64,
    /// Queries that returned an error.
    pub failed_queries: u64,
    /// Contract queries stopped by their gas limit.
    pub out_of_gas: u64,
    /// Faults recovered at the invoker boundary.
    pub internal_faults: u64,
    /// Total gas consumed by contract queries.
    pub total_gas_used: u64,
    /// Average query time in microseconds.
    pub avg_query_time_us: u64,
}

/// The main Contract Query Service.
pub struct ContractQueryService<K, V> {
    /// Service configuration.
    config: QueryConfig,
    /// Shared router; cloned into every worker.
    router: Arc<QueryRouter<K, V>>,
    /// Service statistics.
    stats: Arc<RwLock<QueryStats>>,
}

impl<K, V> ContractQueryService<K, V>
where
    K: ContractKeeper + 'static,
    V: ContractVm + 'static,
{
    /// Create a new Contract Query Service.
    pub fn new(keeper: Arc<K>, vm: Arc<V>, config: QueryConfig) -> Self {
        info!(
            gas_limit = config.contract_query_gas_limit,
            vm_pool_size = config.vm_pool_size,
            max_query_depth = config.max_query_depth,
            "Contract query service created"
        );
        Self {
            router: Arc::new(QueryRouter::new(keeper, vm, &config)),
            config,
            stats: Arc::new(RwLock::new(QueryStats::default())),
        }
    }

    /// Service configuration.
    #[must_use]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Underlying synchronous router.
    #[must_use]
    pub fn router(&self) -> &QueryRouter<K, V> {
        &self.router
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> QueryStats {
        self.stats.read().await.clone()
    }

    /// Serve one top-level query on a blocking worker.
    #[instrument(
        skip(self, request),
        fields(correlation_id = %Uuid::new_v4(), endpoint = %request.path)
    )]
    pub async fn serve(&self, request: QueryRequest) -> Result<Bytes, QueryError> {
        let start = Instant::now();
        let endpoint = request.path.clone();

        let router = Arc::clone(&self.router);
        let outcome = tokio::task::spawn_blocking(move || router.execute(&request))
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Query worker terminated abnormally");
                QueryOutcome {
                    result: Err(QueryError::InternalFault {
                        message: format!("query worker failed: {e}"),
                        trace: capture_trace(),
                    }),
                    gas: None,
                }
            });

        let elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.record(&endpoint, &outcome, elapsed_us).await;

        match &outcome.result {
            Ok(bytes) => debug!(
                response_len = bytes.len(),
                gas_used = outcome.gas.map(|g| g.consumed),
                elapsed_us,
                "Query completed"
            ),
            Err(e @ QueryError::OutOfGas { .. }) => warn!(error = %e, "Query ran out of gas"),
            Err(e @ QueryError::InternalFault { .. }) => {
                error!(error = %e, "Query failed with internal fault");
            }
            Err(e) => debug!(error = %e, kind = e.kind(), "Query rejected"),
        }

        outcome.result
    }

    async fn record(&self, endpoint: &str, outcome: &QueryOutcome, elapsed_us: u64) {
        metrics::record_query(endpoint);
        if let Some(gas) = outcome.gas {
            metrics::record_gas_used(gas.consumed);
        }

        let mut stats = self.stats.write().await;
        stats.queries_served += 1;
        match &outcome.result {
            Ok(_) => stats.successful_queries += 1,
            Err(e) => {
                metrics::record_failure(e.kind());
                stats.failed_queries += 1;
                match e {
                    QueryError::OutOfGas { .. } => stats.out_of_gas += 1,
                    QueryError::InternalFault { .. } => stats.internal_faults += 1,
                    _ => {}
                }
            }
        }
        if let Some(gas) = outcome.gas {
            stats.total_gas_used = stats.total_gas_used.saturating_add(gas.consumed);
        }
        let total = stats.queries_served;
        stats.avg_query_time_us = (stats.avg_query_time_us * (total - 1) + elapsed_us) / total;
    }
}

/// Create a default service with in-memory adapters (for testing).
#[must_use]
pub fn create_test_service() -> ContractQueryService<InMemoryKeeper, NativeVm> {
    ContractQueryService::new(
        Arc::new(InMemoryKeeper::new()),
        Arc::new(NativeVm::default()),
        QueryConfig::default(),
    )
}

// =============================================================================
// ContractQueryApi Implementation
// =============================================================================

#[async_trait]
impl<K, V> ContractQueryApi for ContractQueryService<K, V>
where
    K: ContractKeeper + 'static,
    V: ContractVm + 'static,
{
    async fn handle_query(&self, request: QueryRequest) -> Result<Bytes, QueryError> {
        self.serve(request).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
