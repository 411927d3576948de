//! # Execution Context & Reentrancy Tracking
//!
//! One [`ExecutionContext`] exists per top-level query call tree. Contract
//! code that issues a nested query hands its `&mut ExecutionContext` back to
//! the router, which reuses it: same VM slot, same gas meter. Only a query
//! arriving without a context gets a fresh one and a new slot.

use crate::domain::gas::GasMeter;
use crate::domain::value_objects::VmSlot;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Interpreter pool size used when none is configured.
pub const DEFAULT_VM_POOL_SIZE: usize = 128;

// =============================================================================
// EXECUTION CONTEXT
// =============================================================================

/// Ambient state of one query call tree.
#[derive(Debug)]
pub struct ExecutionContext {
    vm_slot: VmSlot,
    gas_meter: GasMeter,
    /// Contract frames currently running under this context.
    depth: u32,
}

impl ExecutionContext {
    fn new(vm_slot: VmSlot, gas_meter: GasMeter) -> Self {
        Self {
            vm_slot,
            gas_meter,
            depth: 0,
        }
    }

    /// Interpreter slot assigned to this call tree.
    #[must_use]
    pub const fn vm_slot(&self) -> VmSlot {
        self.vm_slot
    }

    /// Shared gas meter of the call tree.
    #[must_use]
    pub const fn gas_meter(&self) -> &GasMeter {
        &self.gas_meter
    }

    /// Mutable access to the gas meter, for charging.
    pub fn gas_meter_mut(&mut self) -> &mut GasMeter {
        &mut self.gas_meter
    }

    /// Number of contract frames currently executing.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// True while the innermost running frame was entered through a nested
    /// query, i.e. another contract frame is active beneath it.
    #[must_use]
    pub const fn reentrant(&self) -> bool {
        self.depth > 1
    }

    /// True while any contract frame is executing.
    #[must_use]
    pub const fn in_execution(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn enter_frame(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn exit_frame(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

// =============================================================================
// PREPARED CONTEXT
// =============================================================================

/// Context handed to the invoker: either freshly built for a top-level
/// query, or the caller's own context for a nested one.
#[derive(Debug)]
pub enum PreparedContext<'a> {
    /// New call tree.
    Fresh(ExecutionContext),
    /// Nested query; borrows the parent's context unchanged.
    Reentrant(&'a mut ExecutionContext),
}

impl PreparedContext<'_> {
    /// True if this context was allocated by the current `prepare` call.
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

impl Deref for PreparedContext<'_> {
    type Target = ExecutionContext;

    fn deref(&self) -> &ExecutionContext {
        match self {
            Self::Fresh(ctx) => ctx,
            Self::Reentrant(ctx) => &**ctx,
        }
    }
}

impl DerefMut for PreparedContext<'_> {
    fn deref_mut(&mut self) -> &mut ExecutionContext {
        match self {
            Self::Fresh(ctx) => ctx,
            Self::Reentrant(ctx) => &mut **ctx,
        }
    }
}

// =============================================================================
// REENTRANCY TRACKER
// =============================================================================

/// Establishes the execution context exactly once per top-level query and
/// owns the process-wide rotating VM slot counter.
#[derive(Debug)]
pub struct ReentrancyTracker {
    next_slot: AtomicUsize,
    pool_size: usize,
}

impl ReentrancyTracker {
    /// Creates a tracker rotating over `pool_size` slots. Zero falls back to
    /// [`DEFAULT_VM_POOL_SIZE`].
    #[must_use]
    pub fn new(pool_size: usize) -> Self {
        let pool_size = if pool_size == 0 {
            DEFAULT_VM_POOL_SIZE
        } else {
            pool_size
        };
        Self {
            next_slot: AtomicUsize::new(0),
            pool_size,
        }
    }

    /// Number of slots rotated over.
    #[must_use]
    pub const fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Returns the caller's context when one is present, otherwise tags a
    /// new call tree: assigns the next slot and a meter of `gas_limit`.
    pub fn prepare<'a>(
        &self,
        ambient: Option<&'a mut ExecutionContext>,
        gas_limit: u64,
    ) -> PreparedContext<'a> {
        match ambient {
            Some(ctx) => PreparedContext::Reentrant(ctx),
            None => PreparedContext::Fresh(ExecutionContext::new(
                self.allocate_slot(),
                GasMeter::new(gas_limit),
            )),
        }
    }

    /// Hands out the current slot and advances `counter = (counter + 1) % pool`.
    fn allocate_slot(&self) -> VmSlot {
        let pool = self.pool_size;
        // The closure never returns None, so both results carry the previous value.
        let previous = self
            .next_slot
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some((current + 1) % pool)
            })
            .unwrap_or_else(|prev| prev);
        VmSlot(previous)
    }
}

impl Default for ReentrancyTracker {
    fn default() -> Self {
        Self::new(DEFAULT_VM_POOL_SIZE)
    }
}

// =============================================================================
// TESTS
// =============================================================================
