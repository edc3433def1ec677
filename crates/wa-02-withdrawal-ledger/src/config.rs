//! # Ledger Configuration

use serde::{Deserialize, Serialize};

use crate::domain::DEFAULT_CHUNK_SIZE;

/// Withdrawal ledger configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Blocks fetched concurrently and persisted as one unit.
    pub chunk_size: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl LedgerConfig {
    /// Create a config for testing (small chunks).
    pub fn for_testing() -> Self {
        Self { chunk_size: 10 }
    }

    /// Same config with another chunk size.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(LedgerConfig::default().chunk_size, 100);
    }

    #[test]
    fn test_testing_config() {
        let config = LedgerConfig::for_testing().with_chunk_size(3);
        assert_eq!(config.chunk_size, 3);
    }
}
