//! # Error Types

use shared_types::{Address, U256};
use thiserror::Error;
use wa_01_cache_store::CacheError;

/// Reconciliation errors.
///
/// A claim that disagrees with its window is not an error; it is a
/// `ClaimInterval` with `match: false`.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// A claimant has no entry in the withdrawal ledger. Fatal for that
    /// address only.
    #[error("Address {address} not found in withdrawal ledger")]
    AddressNotFound {
        /// Claim recipient.
        address: Address,
    },

    /// Scale with a zero denominator.
    #[error("Invalid scale {numerator}/{denominator}: denominator must be non-zero")]
    InvalidScale {
        /// Numerator given.
        numerator: U256,
        /// Denominator given.
        denominator: U256,
    },

    /// Reconciliation log could not be persisted.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl ReconciliationError {
    /// Address concerned, if any.
    pub fn address(&self) -> Option<Address> {
        match self {
            ReconciliationError::AddressNotFound { address } => Some(*address),
            _ => None,
        }
    }
}
