//! # Error Types

use shared_types::{BlockNumber, SourceError};
use thiserror::Error;
use wa_01_cache_store::CacheError;

/// Why one attempt at a batch failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchFailure {
    /// A source call failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The source has no block at a height at or below the scan head.
    #[error("Block {number} missing from source")]
    MissingBlock {
        /// Requested block.
        number: BlockNumber,
    },

    /// A worker task panicked or was cancelled.
    #[error("Worker {worker} aborted: {reason}")]
    WorkerAborted {
        /// Worker index.
        worker: usize,
        /// Join failure.
        reason: String,
    },
}

/// Balance scanner errors.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A batch failed on every attempt. The on-disk snapshot is unchanged.
    #[error(
        "Batch [{batch_start}, {batch_end}) failed after {attempts} attempts; last checkpoint: {}",
        checkpoint_label(.checkpoint)
    )]
    RetriesExhausted {
        /// First block of the failed batch.
        batch_start: BlockNumber,
        /// One past the last block of the failed batch.
        batch_end: BlockNumber,
        /// Attempts made.
        attempts: u32,
        /// Last persisted `lastBlockSynced`, if any.
        checkpoint: Option<BlockNumber>,
        /// Failure of the final attempt.
        #[source]
        source: BatchFailure,
    },

    /// Head lookup or holder seeding failed (not retried).
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Snapshot could not be written.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Configuration cannot drive a scan.
    #[error("Invalid scanner config: {field} {reason}")]
    InvalidConfig {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

fn checkpoint_label(checkpoint: &Option<BlockNumber>) -> String {
    match checkpoint {
        Some(block) => block.to_string(),
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_display() {
        let err = ScanError::RetriesExhausted {
            batch_start: 4_101_000,
            batch_end: 4_102_000,
            attempts: 6,
            checkpoint: Some(4_100_999),
            source: BatchFailure::Source(SourceError::Unavailable("timeout".into())),
        };
        assert_eq!(
            err.to_string(),
            "Batch [4101000, 4102000) failed after 6 attempts; last checkpoint: 4100999"
        );
    }

    #[test]
    fn test_retries_exhausted_without_checkpoint() {
        let err = ScanError::RetriesExhausted {
            batch_start: 0,
            batch_end: 10,
            attempts: 6,
            checkpoint: None,
            source: BatchFailure::MissingBlock { number: 3 },
        };
        assert!(err.to_string().ends_with("last checkpoint: none"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_config_display() {
        let err = ScanError::InvalidConfig {
            field: "batch_size",
            reason: "must be positive",
        };
        assert_eq!(err.to_string(), "Invalid scanner config: batch_size must be positive");
    }
}
