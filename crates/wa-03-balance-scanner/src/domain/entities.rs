//! # Domain Entities
//!
//! The persisted holder snapshot and per-worker partial results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use shared_types::{Address, BlockNumber, DecimalU256, U256};
use std::collections::BTreeMap;
use wa_01_cache_store::CacheDocument;

/// Persisted holder index (`balances.json`).
///
/// Replaced wholesale after each successful batch.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    /// When the snapshot was written.
    pub execution_time: DateTime<Utc>,
    /// Last block covered by the snapshot (inclusive).
    pub last_block_synced: BlockNumber,
    /// Token balance per holder, as decimal strings on disk.
    #[serde_as(as = "BTreeMap<_, DecimalU256>")]
    pub balances: BTreeMap<Address, U256>,
}

impl CacheDocument for BalanceSnapshot {
    const FILE_NAME: &'static str = "balances.json";

    fn empty() -> Self {
        Self::default()
    }
}

impl BalanceSnapshot {
    /// Snapshot stamped with the current time.
    pub fn now(last_block_synced: BlockNumber, balances: BTreeMap<Address, U256>) -> Self {
        Self {
            execution_time: Utc::now(),
            last_block_synced,
            balances,
        }
    }

    /// Number of holders.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }
}

/// Holders discovered by one worker in one batch attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartialBalances {
    /// Index of the worker inside its batch. Lower wins on merge.
    pub worker: usize,
    /// Newly seen holders and the balance queried for them.
    pub balances: BTreeMap<Address, U256>,
}

impl PartialBalances {
    /// Empty result for `worker`.
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            balances: BTreeMap::new(),
        }
    }

    /// True if this worker already recorded `address`.
    pub fn contains(&self, address: &Address) -> bool {
        self.balances.contains_key(address)
    }

    /// Number of holders found.
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// True if nothing was found.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}
