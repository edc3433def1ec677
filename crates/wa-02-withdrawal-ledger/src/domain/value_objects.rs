//! # Value Objects
//!
//! Chunk ranges and sync reports.

use serde::{Deserialize, Serialize};
use shared_types::BlockNumber;

/// Inclusive block range processed as one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRange {
    /// First block.
    pub from: BlockNumber,
    /// Last block (inclusive).
    pub to: BlockNumber,
}

impl ChunkRange {
    /// Create a range. `from <= to` is expected.
    pub fn new(from: BlockNumber, to: BlockNumber) -> Self {
        Self { from, to }
    }

    /// Number of blocks in the range.
    pub fn len(&self) -> u64 {
        self.to - self.from + 1
    }

    /// Always false: a chunk holds at least one block.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Block numbers in ascending order.
    pub fn blocks(&self) -> impl Iterator<Item = BlockNumber> {
        self.from..=self.to
    }
}

/// Outcome of one sync run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Head the run synced to.
    pub head: BlockNumber,
    /// First block processed, `None` if already up to date.
    pub from_block: Option<BlockNumber>,
    /// Cursor after the run.
    pub last_block: i64,
    /// Chunks processed and persisted.
    pub chunks: u64,
    /// Blocks fetched from the source.
    pub blocks_fetched: u64,
    /// Withdrawal details recorded.
    pub withdrawals_recorded: u64,
}

impl SyncReport {
    /// True when nothing needed to be fetched.
    pub fn was_up_to_date(&self) -> bool {
        self.chunks == 0
    }
}
