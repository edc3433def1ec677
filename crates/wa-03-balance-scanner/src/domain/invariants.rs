//! # Invariants and Constants

use shared_types::BlockNumber;

/// Blocks per batch.
pub const DEFAULT_BATCH_SIZE: u64 = 1000;

/// Worker tasks per batch.
pub const DEFAULT_WORKER_COUNT: usize = 3;

/// Approximate block at which withdrawals were activated.
pub const DEFAULT_ACTIVATION_BLOCK: BlockNumber = 4_100_000;

/// Attempts per batch before the scan gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Backoff unit; attempt `n` waits `n` times this.
pub const DEFAULT_BASE_DELAY_SECS: u64 = 10;

/// The checkpoint only moves forward.
pub fn invariant_checkpoint_advances(
    previous: Option<BlockNumber>,
    next: BlockNumber,
) -> bool {
    previous.map_or(true, |prev| next > prev)
}
