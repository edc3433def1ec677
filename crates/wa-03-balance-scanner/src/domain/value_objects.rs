//! # Value Objects
//!
//! Block ranges, run phases and run reports.

use serde::{Deserialize, Serialize};
use shared_types::BlockNumber;
use std::fmt;

/// Half-open block range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRange {
    /// First block.
    pub start: BlockNumber,
    /// One past the last block.
    pub end: BlockNumber,
}

impl BlockRange {
    /// Create a range. An `end` below `start` yields an empty range.
    pub fn new(start: BlockNumber, end: BlockNumber) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Number of blocks.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// True if the range holds no block.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Last block of a non-empty range.
    pub fn last(&self) -> Option<BlockNumber> {
        (!self.is_empty()).then(|| self.end - 1)
    }

    /// Blocks in ascending order.
    pub fn blocks(&self) -> impl Iterator<Item = BlockNumber> {
        self.start..self.end
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Phase of a scan run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanPhase {
    /// Nothing done yet.
    #[default]
    Init,
    /// Resuming from a persisted snapshot.
    LoadCheckpoint,
    /// No snapshot; seeding and starting at the activation block.
    ColdStart,
    /// Workers scanning the current batch.
    RunWorkers,
    /// Folding worker results into the accumulated map.
    Merge,
    /// Writing the snapshot.
    Persist,
    /// Range fully scanned.
    Done,
    /// A batch exhausted its retries.
    Failed,
}

impl ScanPhase {
    /// True once the run can make no further progress.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanPhase::Done | ScanPhase::Failed)
    }
}

/// Outcome of a successful scan run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Batches completed and persisted in this run.
    pub batches: u64,
    /// First block scanned by this run.
    pub start_block: BlockNumber,
    /// Checkpoint after the run, `None` if nothing was ever persisted.
    pub last_block_synced: Option<BlockNumber>,
    /// Holders known after the run.
    pub holders: usize,
}
