//! # Contract Invoker
//!
//! Fault boundary around the VM port. Whatever happens inside the
//! interpreter, the caller gets back either the contract's output bytes or
//! a typed [`QueryError`]:
//!
//! | VM outcome | Result |
//! |------------|--------|
//! | `Ok(bytes)` with meter within limit | `Ok(bytes)` unmodified |
//! | `Ok(_)` with meter past limit | `OutOfGas` (a swallowed nested exhaustion) |
//! | `VmError::OutOfGas` with meter at limit | `OutOfGas { consumed, limit }` |
//! | `VmError::OutOfGas` with gas remaining | `InternalFault` |
//! | `VmError::Contract` | `ContractFailed` |
//! | `VmError::Internal` or panic | `InternalFault { message, trace }` |
//!
//! Partial output is never returned alongside a fault. The gas meter keeps
//! the real consumption either way.
//!
//! Panic traces are taken by a process-wide panic hook while the panic is
//! in flight, so they include the faulting frame. The hook only acts on
//! threads currently inside [`ContractInvoker::invoke`] and defers to the
//! previously installed hook everywhere else.

use crate::domain::context::ExecutionContext;
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::{QueryError, VmError};
use crate::ports::inbound::ContractQuerier;
use crate::ports::outbound::{ContractCall, ContractKeeper, ContractVm};
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};
use tracing::{debug, error, warn};

/// Placeholder stored when the trace itself could not be captured.
pub const TRACE_UNAVAILABLE: &str = "<trace unavailable>";

thread_local! {
    /// Number of active `invoke` frames on this thread.
    static GUARDED_FRAMES: Cell<u32> = const { Cell::new(0) };
    /// Trace of the last panic raised under a guarded frame.
    static PANIC_TRACE: Cell<Option<String>> = const { Cell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARDED_FRAMES.try_with(Cell::get).unwrap_or(0) > 0 {
                let trace = Backtrace::force_capture().to_string();
                let _ = PANIC_TRACE.try_with(|slot| slot.set(Some(trace)));
            } else {
                previous(info);
            }
        }));
    });
}

/// Marks the current thread as running contract code until dropped.
struct PanicTraceGuard;

impl PanicTraceGuard {
    fn arm() -> Self {
        install_panic_hook();
        PANIC_TRACE.with(|slot| slot.set(None));
        GUARDED_FRAMES.with(|frames| frames.set(frames.get() + 1));
        Self
    }

    /// Trace recorded by the hook for the panic just caught.
    fn take_trace() -> String {
        PANIC_TRACE
            .with(Cell::take)
            .unwrap_or_else(|| TRACE_UNAVAILABLE.to_string())
    }
}

impl Drop for PanicTraceGuard {
    fn drop(&mut self) {
        GUARDED_FRAMES.with(|frames| frames.set(frames.get().saturating_sub(1)));
    }
}

/// Invokes contract code through the VM port and classifies every outcome.
pub struct ContractInvoker<K, V> {
    keeper: Arc<K>,
    vm: Arc<V>,
    max_depth: u32,
}

impl<K, V> ContractInvoker<K, V>
where
    K: ContractKeeper,
    V: ContractVm,
{
    /// Creates an invoker allowing `max_depth` nested contract frames.
    pub fn new(keeper: Arc<K>, vm: Arc<V>, max_depth: u32) -> Self {
        Self {
            keeper,
            vm,
            max_depth,
        }
    }

    /// Runs `msg` against `contract` under `ctx`.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotFound`] for an unknown contract or code,
    /// [`QueryError::QueryDepthExceeded`] past the frame limit, and the
    /// classifications in the module table.
    pub fn invoke(
        &self,
        ctx: &mut ExecutionContext,
        contract: &Address,
        msg: &[u8],
        querier: &dyn ContractQuerier,
    ) -> Result<Bytes, QueryError> {
        let contract_info = self.keeper.get_contract_info(contract)?;
        let code_info = self.keeper.get_code_info(contract_info.code_id)?;

        if ctx.depth() >= self.max_depth {
            return Err(QueryError::QueryDepthExceeded {
                depth: ctx.depth() + 1,
                max: self.max_depth,
            });
        }

        debug!(
            contract = %contract,
            code_id = %code_info.code_id,
            vm_slot = %ctx.vm_slot(),
            depth = ctx.depth() + 1,
            gas_remaining = ctx.gas_meter().remaining(),
            "Invoking contract query"
        );

        ctx.enter_frame();
        let guard = PanicTraceGuard::arm();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.vm.query(ContractCall {
                contract: *contract,
                code_hash: code_info.code_hash,
                msg,
                ctx: &mut *ctx,
                storage: &*self.keeper,
                querier,
            })
        }));
        drop(guard);
        ctx.exit_frame();

        match outcome {
            Ok(result) => classify(ctx, contract, result),
            Err(payload) => {
                let message = format!("recovered: {}", panic_message(payload.as_ref()));
                Err(internal_fault(contract, message, PanicTraceGuard::take_trace()))
            }
        }
    }
}

fn classify(
    ctx: &ExecutionContext,
    contract: &Address,
    result: Result<Bytes, VmError>,
) -> Result<Bytes, QueryError> {
    let meter = ctx.gas_meter();
    match result {
        Ok(_) if meter.is_past_limit() => {
            let err = meter.out_of_gas("contract query");
            warn!(
                contract = %contract,
                consumed = err.consumed,
                limit = err.limit,
                "Contract returned output after exhausting gas, discarding"
            );
            Err(err.into())
        }
        Ok(output) => Ok(output),
        Err(VmError::OutOfGas(oog)) if meter.is_out_of_gas() => {
            warn!(
                contract = %contract,
                location = %oog.descriptor,
                consumed = meter.consumed(),
                limit = meter.limit(),
                "Contract query ran out of gas"
            );
            Err(QueryError::OutOfGas {
                descriptor: oog.descriptor,
                // The meter is authoritative; the signal may predate later charges.
                consumed: meter.consumed().max(oog.consumed),
                limit: meter.limit(),
            })
        }
        Err(VmError::OutOfGas(oog)) => {
            let message = format!(
                "vm reported out of gas with gas remaining: {} at {}/{}",
                oog.descriptor,
                meter.consumed(),
                meter.limit()
            );
            Err(internal_fault(contract, message, capture_trace()))
        }
        Err(VmError::Contract(msg)) => {
            debug!(contract = %contract, error = %msg, "Contract rejected query");
            Err(QueryError::ContractFailed(msg))
        }
        Err(VmError::Internal(msg)) => Err(internal_fault(contract, msg, capture_trace())),
    }
}

fn internal_fault(contract: &Address, message: String, trace: String) -> QueryError {
    error!(
        contract = %contract,
        error = %message,
        trace = %trace,
        "Internal fault during contract query"
    );
    QueryError::InternalFault { message, trace }
}

/// Best-effort stack capture. Never fails: a capture that itself panics
/// yields [`TRACE_UNAVAILABLE`].
#[must_use]
pub fn capture_trace() -> String {
    panic::catch_unwind(|| Backtrace::force_capture().to_string())
        .unwrap_or_else(|_| TRACE_UNAVAILABLE.to_string())
}

/// Extracts a readable message from a panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================
