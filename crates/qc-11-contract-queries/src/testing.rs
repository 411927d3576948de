//! # Test Fixtures
//!
//! Sample native contracts and a harness that deploys them into an
//! [`InMemoryKeeper`] / [`NativeVm`] pair. Available to unit tests and, with
//! the `test-utils` feature, to the workspace integration tests.

use crate::adapters::{ContractEnv, InMemoryKeeper, NativeContract, NativeVm};
use crate::config::QueryConfig;
use crate::domain::entities::Model;
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::VmError;
use crate::router::QueryRouter;
use crate::service::ContractQueryService;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Bytecode the [`VerifierContract`] is registered under.
pub const VERIFIER_CODE: &[u8] = b"native:verifier";
/// Bytecode the [`GasBurner`] is registered under.
pub const GAS_BURNER_CODE: &[u8] = b"native:gas-burner";
/// Bytecode the [`Panicker`] is registered under.
pub const PANICKER_CODE: &[u8] = b"native:panicker";
/// Bytecode the [`Probe`] is registered under.
pub const PROBE_CODE: &[u8] = b"native:probe";
/// Bytecode the [`Proxy`] is registered under.
pub const PROXY_CODE: &[u8] = b"native:proxy";

/// Storage key the deploy helpers write the instantiation message to.
pub const CONFIG_KEY: &[u8] = b"config";

/// Gas charged per [`GasBurner`] iteration.
pub const BURN_STEP: u64 = 1_000;

/// Verifier used by [`TestHarness::deploy_verifier`].
#[must_use]
pub fn verifier_address() -> Address {
    Address::new([0x11; 20])
}

/// Beneficiary used by [`TestHarness::deploy_verifier`].
#[must_use]
pub fn beneficiary_address() -> Address {
    Address::new([0x22; 20])
}

fn parse_msg<'a, T: Deserialize<'a>>(msg: &'a [u8]) -> Result<T, VmError> {
    serde_json::from_slice(msg).map_err(|e| VmError::Contract(e.to_string()))
}

fn to_output<T: Serialize>(value: &T) -> Result<Bytes, VmError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| VmError::Internal(e.to_string()))
}

// =============================================================================
// VERIFIER
// =============================================================================

/// Instantiation message of the [`VerifierContract`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Account allowed to release funds.
    pub verifier: Address,
    /// Account receiving released funds.
    pub beneficiary: Address,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum VerifierQuery {
    Verifier {},
    Beneficiary {},
}

/// Escrow-style contract answering who its verifier and beneficiary are.
pub struct VerifierContract;

impl NativeContract for VerifierContract {
    fn query(&self, env: &mut ContractEnv<'_>, msg: &[u8]) -> Result<Bytes, VmError> {
        let query: VerifierQuery = parse_msg(msg)?;
        let raw = env
            .storage_get(CONFIG_KEY)?
            .ok_or_else(|| VmError::Contract("config not initialized".to_string()))?;
        let config: VerifierConfig = serde_json::from_slice(raw.as_slice())
            .map_err(|e| VmError::Internal(format!("corrupt config: {e}")))?;

        match query {
            VerifierQuery::Verifier {} => to_output(&json!({ "verifier": config.verifier })),
            VerifierQuery::Beneficiary {} => {
                to_output(&json!({ "beneficiary": config.beneficiary }))
            }
        }
    }
}

// =============================================================================
// MISBEHAVING CONTRACTS
// =============================================================================

/// Spins until the meter gives out.
pub struct GasBurner;

impl NativeContract for GasBurner {
    fn query(&self, env: &mut ContractEnv<'_>, _msg: &[u8]) -> Result<Bytes, VmError> {
        loop {
            env.consume_gas(BURN_STEP, "burn loop")?;
        }
    }
}

/// Panics on every query.
pub struct Panicker;

impl NativeContract for Panicker {
    fn query(&self, env: &mut ContractEnv<'_>, _msg: &[u8]) -> Result<Bytes, VmError> {
        env.consume_gas(10, "pre-panic work")?;
        panic!("index out of bounds: the len is 0 but the index is 3");
    }
}

// =============================================================================
// REENTRANCY HELPERS
// =============================================================================

/// Reports the context it runs under.
pub struct Probe;

impl NativeContract for Probe {
    fn query(&self, env: &mut ContractEnv<'_>, _msg: &[u8]) -> Result<Bytes, VmError> {
        to_output(&json!({
            "vm_slot": env.vm_slot().index(),
            "reentrant": env.is_reentrant(),
        }))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum ProxyQuery {
    Forward {
        contract: Address,
        msg: serde_json::Value,
    },
}

/// Forwards a query to another contract and wraps the answer with its own
/// context.
pub struct Proxy;

impl NativeContract for Proxy {
    fn query(&self, env: &mut ContractEnv<'_>, msg: &[u8]) -> Result<Bytes, VmError> {
        let ProxyQuery::Forward { contract, msg }: ProxyQuery = parse_msg(msg)?;
        let vm_slot = env.vm_slot().index();
        let reentrant = env.is_reentrant();

        let inner = env.query_contract(contract, msg)?;
        let inner: serde_json::Value = serde_json::from_slice(inner.as_slice())
            .map_err(|e| VmError::Contract(format!("nested output is not JSON: {e}")))?;

        to_output(&json!({
            "vm_slot": vm_slot,
            "reentrant": reentrant,
            "inner": inner,
        }))
    }
}

// =============================================================================
// HARNESS
// =============================================================================

/// Keeper + VM pair with deploy helpers.
pub struct TestHarness {
    /// Code and contract store.
    pub keeper: Arc<InMemoryKeeper>,
    /// VM running the sample contracts.
    pub vm: Arc<NativeVm>,
    /// Uploader and owner of every deployed contract.
    pub creator: Address,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Empty harness with a default-sized VM pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keeper: Arc::new(InMemoryKeeper::new()),
            vm: Arc::new(NativeVm::default()),
            creator: Address::new([0x01; 20]),
        }
    }

    /// Registers `contract` under `code`, stores the code and instantiates
    /// it. `init_msg` is also written to the contract's [`CONFIG_KEY`].
    ///
    /// # Panics
    ///
    /// If the keeper rejects the code.
    pub fn deploy(
        &self,
        code: &[u8],
        contract: Arc<dyn NativeContract>,
        init_msg: &serde_json::Value,
    ) -> Address {
        self.vm.register(code, contract);
        let init = init_msg.to_string();
        let code_id = self
            .keeper
            .store_code(self.creator, code)
            .expect("store code");
        let address = self
            .keeper
            .instantiate_contract(code_id, self.creator, init.as_bytes(), false)
            .expect("instantiate");
        self.keeper
            .set_contract_store(&address, &[Model::new(CONFIG_KEY, init.as_bytes())])
            .expect("seed config");
        address
    }

    /// Deploys a [`VerifierContract`] with the fixed verifier and beneficiary.
    pub fn deploy_verifier(&self) -> Address {
        let config = VerifierConfig {
            verifier: verifier_address(),
            beneficiary: beneficiary_address(),
        };
        self.deploy(VERIFIER_CODE, Arc::new(VerifierContract), &json!(config))
    }

    /// Deploys a [`GasBurner`].
    pub fn deploy_gas_burner(&self) -> Address {
        self.deploy(GAS_BURNER_CODE, Arc::new(GasBurner), &json!({}))
    }

    /// Deploys a [`Panicker`].
    pub fn deploy_panicker(&self) -> Address {
        self.deploy(PANICKER_CODE, Arc::new(Panicker), &json!({}))
    }

    /// Deploys a [`Probe`].
    pub fn deploy_probe(&self) -> Address {
        self.deploy(PROBE_CODE, Arc::new(Probe), &json!({}))
    }

    /// Deploys a [`Proxy`].
    pub fn deploy_proxy(&self) -> Address {
        self.deploy(PROXY_CODE, Arc::new(Proxy), &json!({}))
    }

    /// Synchronous router over this harness.
    #[must_use]
    pub fn router(&self, config: &QueryConfig) -> QueryRouter<InMemoryKeeper, NativeVm> {
        QueryRouter::new(Arc::clone(&self.keeper), Arc::clone(&self.vm), config)
    }

    /// Async service over this harness.
    #[must_use]
    pub fn service(&self, config: QueryConfig) -> ContractQueryService<InMemoryKeeper, NativeVm> {
        ContractQueryService::new(Arc::clone(&self.keeper), Arc::clone(&self.vm), config)
    }
}
