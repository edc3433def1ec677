//! # Scanner Configuration

use serde::{Deserialize, Serialize};
use shared_types::BlockNumber;
use std::time::Duration;

use crate::algorithms::RetryPolicy;
use crate::domain::{DEFAULT_ACTIVATION_BLOCK, DEFAULT_BATCH_SIZE, DEFAULT_WORKER_COUNT};

/// Balance scanner configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Blocks per batch. A batch is the unit of retry and checkpointing.
    pub batch_size: u64,

    /// Worker tasks per batch.
    pub worker_count: usize,

    /// First block scanned on a cold start (roughly when withdrawals began).
    pub activation_block: BlockNumber,

    /// Retry policy applied to each batch.
    pub retry: RetryPolicy,

    /// Seed the holder set from historical transfer events on a cold start.
    pub seed_from_transfers: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            worker_count: DEFAULT_WORKER_COUNT,
            activation_block: DEFAULT_ACTIVATION_BLOCK,
            retry: RetryPolicy::default(),
            seed_from_transfers: true,
        }
    }
}

impl ScannerConfig {
    /// Create a config for testing (small batches, no backoff).
    pub fn for_testing() -> Self {
        Self {
            batch_size: 10,
            worker_count: 3,
            activation_block: 0,
            retry: RetryPolicy::new(6, Duration::ZERO),
            seed_from_transfers: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScannerConfig::default();
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.worker_count, 3);
        assert_eq!(config.activation_block, 4_100_000);
        assert_eq!(config.retry.max_attempts, 6);
        assert_eq!(config.retry.base_delay, Duration::from_secs(10));
    }

    #[test]
    fn test_testing_config_has_no_backoff() {
        let config = ScannerConfig::for_testing();
        assert_eq!(config.retry.backoff(3), Duration::ZERO);
    }
}
