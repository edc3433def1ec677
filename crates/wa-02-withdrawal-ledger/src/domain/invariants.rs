//! # Domain Invariants
//!
//! Rules the ledger must hold at all times.

use shared_types::Address;

use super::entities::AddressLedger;
use super::errors::LedgerError;

/// Default blocks per chunk.
pub const DEFAULT_CHUNK_SIZE: u64 = 100;

/// Invariant: `sum == Σ details[i].amount`.
pub fn invariant_sum_matches(address: &Address, ledger: &AddressLedger) -> Result<(), LedgerError> {
    let computed = ledger
        .recomputed_sum()
        .ok_or(LedgerError::SumOverflow {
            address: *address,
            block: ledger.details.last().map(|d| d.block).unwrap_or_default(),
        })?;
    if computed != ledger.sum {
        return Err(LedgerError::SumMismatch {
            address: *address,
            stored: ledger.sum,
            computed,
        });
    }
    Ok(())
}

/// Invariant: the `lastBlock` cursor never decreases.
pub fn invariant_cursor_monotonic(current: i64, requested: i64) -> Result<(), LedgerError> {
    if requested < current {
        return Err(LedgerError::CursorRegression { current, requested });
    }
    Ok(())
}
