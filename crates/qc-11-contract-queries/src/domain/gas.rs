//! # Gas Metering
//!
//! Consumption counter checked against a fixed limit. The meter raises
//! [`OutOfGas`] at the exact call that pushes consumption past the limit,
//! so callers never have to poll for exhaustion after the fact.

use crate::errors::GasError;

// =============================================================================
// BASE GAS COSTS
// =============================================================================

/// Gas costs charged by the query layer and the bundled VM adapter.
pub mod costs {
    /// Flat cost of entering contract code for a query.
    pub const QUERY_BASE: u64 = 1_000;
    /// Cost per byte of the inbound query message.
    pub const QUERY_MSG_BYTE: u64 = 3;
    /// Flat cost of a storage read.
    pub const STORAGE_READ_FLAT: u64 = 1_000;
    /// Cost per byte of key and value on a storage read.
    pub const STORAGE_READ_BYTE: u64 = 3;
    /// Flat cost of a nested query issued by contract code.
    pub const NESTED_QUERY: u64 = 1_000;
}

// =============================================================================
// OUT OF GAS SIGNAL
// =============================================================================

/// Raised by [`GasMeter::consume`] when the limit is exceeded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("out of gas in location: {descriptor}; gasWanted: {limit}, gasUsed: {consumed}")]
pub struct OutOfGas {
    /// What was being paid for when the limit was crossed.
    pub descriptor: String,
    /// Consumption recorded at the moment of overflow (always `> limit`).
    pub consumed: u64,
    /// The meter's limit.
    pub limit: u64,
}

// =============================================================================
// GAS METER
// =============================================================================

/// Gas meter owned by one query call tree.
///
/// Not shared between threads: each top-level query builds its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasMeter {
    limit: u64,
    consumed: u64,
}

impl GasMeter {
    /// Creates a meter with nothing consumed.
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self { limit, consumed: 0 }
    }

    /// Gas limit.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Gas consumed so far. May exceed the limit after an [`OutOfGas`].
    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Consumption capped at the limit.
    #[must_use]
    pub fn consumed_to_limit(&self) -> u64 {
        self.consumed.min(self.limit)
    }

    /// Gas left before the limit. Diagnostics only.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.consumed)
    }

    /// True once consumption went strictly over the limit.
    #[must_use]
    pub const fn is_past_limit(&self) -> bool {
        self.consumed > self.limit
    }

    /// True once consumption reached the limit.
    #[must_use]
    pub const fn is_out_of_gas(&self) -> bool {
        self.consumed >= self.limit
    }

    /// Charges `amount`.
    ///
    /// The charge is recorded even when it overflows the limit, so the
    /// consumed counter reflects the work attempted. Arithmetic overflow
    /// saturates at `u64::MAX`, which is always past any limit.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfGas`] when `consumed + amount > limit`.
    pub fn consume(&mut self, amount: u64, descriptor: &str) -> Result<(), OutOfGas> {
        self.consumed = self.consumed.saturating_add(amount);
        if self.is_past_limit() {
            return Err(self.out_of_gas(descriptor));
        }
        Ok(())
    }

    /// Gives back previously charged gas.
    ///
    /// # Errors
    ///
    /// Returns [`GasError::RefundUnderflow`] if `amount` exceeds what was consumed.
    pub fn refund(&mut self, amount: u64, descriptor: &str) -> Result<(), GasError> {
        if amount > self.consumed {
            return Err(GasError::RefundUnderflow {
                descriptor: descriptor.to_string(),
                amount,
                consumed: self.consumed,
            });
        }
        self.consumed -= amount;
        Ok(())
    }

    /// Builds the exhaustion signal from the meter's current state.
    #[must_use]
    pub fn out_of_gas(&self, descriptor: &str) -> OutOfGas {
        OutOfGas {
            descriptor: descriptor.to_string(),
            consumed: self.consumed,
            limit: self.limit,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
