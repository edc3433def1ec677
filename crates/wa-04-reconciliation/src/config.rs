//! # Reconciliation Configuration

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use shared_types::{Address, BlockNumber, DecimalU256, U256};

use crate::domain::{Scale, DEFAULT_TYPICAL_WITHDRAWAL};

/// Reconciliation configuration.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Source-unit to token-unit conversion.
    pub scale: Scale,

    /// Sender of claim transfers (the deposit contract).
    pub claim_source: Address,

    /// Ignore claims before this block (e.g. the deposit contract upgrade).
    pub claims_start_block: Option<BlockNumber>,

    /// Typical withdrawal in source units, for the missing-withdrawal
    /// estimate.
    #[serde_as(as = "DecimalU256")]
    pub typical_withdrawal: U256,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            scale: Scale::default(),
            claim_source: Address::ZERO,
            claims_start_block: None,
            typical_withdrawal: U256::from(DEFAULT_TYPICAL_WITHDRAWAL),
        }
    }
}

impl ReconciliationConfig {
    /// Create a config for testing: identity scale, claims from `claim_source`.
    pub fn for_testing(claim_source: Address) -> Self {
        Self {
            scale: Scale::identity(),
            claim_source,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReconciliationConfig::default();
        assert_eq!(config.scale, Scale::default());
        assert_eq!(config.claims_start_block, None);
        assert_eq!(config.typical_withdrawal, U256::from(1525u64));
    }
}
