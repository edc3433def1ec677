//! # Domain Errors
//!
//! Error types for the withdrawal ledger.

use shared_types::{Address, BlockNumber, SourceError, U256};
use thiserror::Error;
use wa_01_cache_store::CacheError;

/// Withdrawal ledger errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The event source failed; the in-flight chunk was discarded.
    #[error("Event source failed: {0}")]
    Source(#[from] SourceError),

    /// Persisting the cache failed.
    #[error("Cache persistence failed: {0}")]
    Cache(#[from] CacheError),

    /// The source reported a head but returned no block below it.
    #[error("Block {number} missing from source (head {head})")]
    MissingBlock {
        /// Requested block.
        number: BlockNumber,
        /// Head the run is syncing to.
        head: BlockNumber,
    },

    /// Chunk size must be at least one block.
    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(u64),

    /// Cursor would move backwards.
    #[error("Cursor regression: lastBlock {current} -> {requested}")]
    CursorRegression {
        /// Current cursor.
        current: i64,
        /// Requested cursor.
        requested: i64,
    },

    /// The cursor cannot represent `block`.
    #[error("Cursor overflow: block {block} exceeds the lastBlock range")]
    CursorOverflow {
        /// Requested block.
        block: BlockNumber,
    },

    /// An address's running sum would exceed `U256::MAX`.
    #[error("Sum overflow for {address} at block {block}")]
    SumOverflow {
        /// Offending address.
        address: Address,
        /// Block whose withdrawal would overflow the sum.
        block: BlockNumber,
    },

    /// An address ledger's `sum` disagrees with its details.
    #[error("Sum mismatch for {address}: stored {stored}, details add up to {computed}")]
    SumMismatch {
        /// Offending address.
        address: Address,
        /// Stored running sum.
        stored: U256,
        /// Σ details.
        computed: U256,
    },
}
