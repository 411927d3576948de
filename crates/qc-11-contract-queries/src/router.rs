//! # Query Router
//!
//! Dispatches decoded queries by kind. Metadata reads go straight to the
//! keeper; contract-code queries get an execution context from the
//! [`ReentrancyTracker`] and run through the [`ContractInvoker`].
//!
//! The router is also the [`ContractQuerier`] handed to running contracts,
//! so nested queries re-enter here with the caller's context.

use crate::codec;
use crate::config::QueryConfig;
use crate::domain::context::{ExecutionContext, ReentrancyTracker};
use crate::domain::query::{Query, QueryRequest};
use crate::domain::value_objects::{Address, Bytes, VmSlot};
use crate::errors::{KeeperError, QueryError};
use crate::invoker::ContractInvoker;
use crate::ports::inbound::ContractQuerier;
use crate::ports::outbound::{ContractKeeper, ContractVm};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Gas accounting of one contract-code query call tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasReport {
    /// Slot the call tree ran on.
    pub vm_slot: VmSlot,
    /// Gas consumed, including work done before a failure.
    pub consumed: u64,
    /// Meter limit.
    pub limit: u64,
}

impl GasReport {
    fn of(ctx: &ExecutionContext) -> Self {
        Self {
            vm_slot: ctx.vm_slot(),
            consumed: ctx.gas_meter().consumed(),
            limit: ctx.gas_meter().limit(),
        }
    }
}

/// Result of a top-level query plus its gas accounting.
#[derive(Debug)]
pub struct QueryOutcome {
    /// Response bytes or the typed failure.
    pub result: Result<Bytes, QueryError>,
    /// Present when contract code ran.
    pub gas: Option<GasReport>,
}

/// Routes queries to the keeper or the contract invoker.
pub struct QueryRouter<K, V> {
    keeper: Arc<K>,
    invoker: ContractInvoker<K, V>,
    tracker: ReentrancyTracker,
    gas_limit: u64,
}

impl<K, V> QueryRouter<K, V>
where
    K: ContractKeeper,
    V: ContractVm,
{
    /// Creates a router using `config` for gas, slot pool and depth limits.
    pub fn new(keeper: Arc<K>, vm: Arc<V>, config: &QueryConfig) -> Self {
        Self {
            invoker: ContractInvoker::new(Arc::clone(&keeper), vm, config.max_query_depth),
            keeper,
            tracker: ReentrancyTracker::new(config.vm_pool_size),
            gas_limit: config.contract_query_gas_limit,
        }
    }

    /// The slot tracker shared by all top-level queries.
    #[must_use]
    pub const fn tracker(&self) -> &ReentrancyTracker {
        &self.tracker
    }

    /// Gas limit given to each top-level contract query.
    #[must_use]
    pub const fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Decodes and serves one top-level query.
    ///
    /// # Errors
    ///
    /// Any [`QueryError`].
    pub fn handle(&self, request: &QueryRequest) -> Result<Bytes, QueryError> {
        self.execute(request).result
    }

    /// Like [`QueryRouter::handle`], also reporting gas for contract queries.
    pub fn execute(&self, request: &QueryRequest) -> QueryOutcome {
        match codec::decode_request(request) {
            Ok(query) => self.dispatch(None, &query),
            Err(err) => QueryOutcome {
                result: Err(err),
                gas: None,
            },
        }
    }

    /// Serves an already typed query. `ambient` is the caller's context
    /// for a nested query, `None` for a top-level one.
    ///
    /// # Errors
    ///
    /// Any [`QueryError`].
    pub fn route(
        &self,
        ambient: Option<&mut ExecutionContext>,
        query: &Query,
    ) -> Result<Bytes, QueryError> {
        self.dispatch(ambient, query).result
    }

    fn dispatch(&self, ambient: Option<&mut ExecutionContext>, query: &Query) -> QueryOutcome {
        debug!(
            endpoint = query.endpoint(),
            nested = ambient.is_some(),
            "Routing contract query"
        );

        let result = match query {
            Query::ContractStore {
                contract_address,
                msg,
            } => return self.contract_store(ambient, contract_address, msg),
            Query::ByteCode { code_id } => encode_record(self.keeper.get_byte_code(*code_id)),
            Query::CodeInfo { code_id } => encode_record(self.keeper.get_code_info(*code_id)),
            Query::ContractInfo { contract_address } => {
                encode_record(self.keeper.get_contract_info(contract_address))
            }
            Query::Params => codec::encode_response(&self.keeper.get_params()).map(Bytes::from),
            Query::RawStore {
                contract_address,
                key,
            } => self.raw_store(contract_address, key.as_slice()),
        };
        QueryOutcome { result, gas: None }
    }

    /// Unmetered single key lookup; only the contract's existence is checked.
    fn raw_store(&self, contract: &Address, key: &[u8]) -> Result<Bytes, QueryError> {
        self.keeper.get_contract_info(contract)?;
        Ok(self.keeper.query_raw_store(contract, key))
    }

    fn contract_store(
        &self,
        ambient: Option<&mut ExecutionContext>,
        contract: &Address,
        msg: &serde_json::Value,
    ) -> QueryOutcome {
        let msg = match codec::encode_contract_msg(msg) {
            Ok(msg) => msg,
            Err(err) => {
                return QueryOutcome {
                    result: Err(err),
                    gas: None,
                }
            }
        };

        let mut ctx = self.tracker.prepare(ambient, self.gas_limit);
        let result = self.invoker.invoke(&mut ctx, contract, &msg, self);
        QueryOutcome {
            result,
            gas: Some(GasReport::of(&ctx)),
        }
    }
}

fn encode_record<T: Serialize>(record: Result<T, KeeperError>) -> Result<Bytes, QueryError> {
    Ok(Bytes::from(codec::encode_response(&record?)?))
}

impl<K, V> ContractQuerier for QueryRouter<K, V>
where
    K: ContractKeeper,
    V: ContractVm,
{
    fn query(&self, ctx: &mut ExecutionContext, query: &Query) -> Result<Bytes, QueryError> {
        self.route(Some(ctx), query)
    }
}

// =============================================================================
// TESTS
// =============================================================================
