//! # Domain Entities
//!
//! The per-address withdrawal ledger and the persisted sync cache.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use shared_types::{Address, BlockNumber, BlockWithdrawals, DecimalU256, WithdrawalDetail, U256};
use std::collections::BTreeMap;
use wa_01_cache_store::CacheDocument;

use super::errors::LedgerError;
use super::invariants::invariant_cursor_monotonic;

/// Withdrawals of one address.
///
/// `sum` is the running total of `details`; both only ever grow together.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressLedger {
    /// Σ `details[i].amount`.
    #[serde_as(as = "DecimalU256")]
    pub sum: U256,
    /// Recorded withdrawals, in the order they were recorded.
    pub details: Vec<WithdrawalDetail>,
}

impl AddressLedger {
    /// Append a detail and add its amount to `sum`.
    ///
    /// Returns the new sum, or `None` if it would overflow; the ledger is
    /// left untouched in that case.
    #[must_use]
    pub fn record(&mut self, detail: WithdrawalDetail) -> Option<U256> {
        let sum = self.sum.checked_add(detail.amount)?;
        self.sum = sum;
        self.details.push(detail);
        Some(sum)
    }

    /// Σ `details[i].amount`, recomputed. `None` on overflow.
    pub fn recomputed_sum(&self) -> Option<U256> {
        self.details
            .iter()
            .try_fold(U256::zero(), |acc, d| acc.checked_add(d.amount))
    }

    /// Details ordered by block. Stable, so same-block details keep their
    /// recorded order.
    pub fn sorted_details(&self) -> Vec<WithdrawalDetail> {
        let mut details = self.details.clone();
        details.sort_by_key(|d| d.block);
        details
    }
}

/// Persisted withdrawal cache (`withdrawals.json`).
///
/// `last_block` is `-1` until the first chunk has been synced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCache {
    /// Highest block fully processed and persisted.
    pub last_block: i64,
    /// Ledger per lowercase address.
    pub withdrawals: BTreeMap<Address, AddressLedger>,
}

impl Default for SyncCache {
    fn default() -> Self {
        Self {
            last_block: -1,
            withdrawals: BTreeMap::new(),
        }
    }
}

impl CacheDocument for SyncCache {
    const FILE_NAME: &'static str = "withdrawals.json";

    fn empty() -> Self {
        Self::default()
    }
}

impl SyncCache {
    /// Fresh cache, nothing synced.
    pub fn new() -> Self {
        Self::default()
    }

    /// First block not yet processed.
    pub fn next_block(&self) -> BlockNumber {
        u64::try_from(self.last_block.saturating_add(1)).unwrap_or(0)
    }

    /// True once `head` has been processed.
    pub fn is_synced_to(&self, head: BlockNumber) -> bool {
        self.next_block() > head
    }

    /// Record every withdrawal of `block`. Returns how many were recorded.
    ///
    /// Blocks without withdrawals leave the cache untouched.
    pub fn apply_block(&mut self, block: &BlockWithdrawals) -> Result<usize, LedgerError> {
        self.apply_blocks(std::slice::from_ref(block))
    }

    /// Record every withdrawal of `blocks`, in order.
    ///
    /// All or nothing: if any address sum would overflow, nothing is
    /// recorded.
    ///
    /// # Errors
    /// - `SumOverflow` naming the first address whose sum would overflow
    pub fn apply_blocks(&mut self, blocks: &[BlockWithdrawals]) -> Result<usize, LedgerError> {
        let mut pending: BTreeMap<Address, U256> = BTreeMap::new();
        for block in blocks {
            for withdrawal in &block.withdrawals {
                let address = withdrawal.address;
                let current = match pending.get(&address) {
                    Some(sum) => *sum,
                    None => self.withdrawals.get(&address).map(|l| l.sum).unwrap_or_default(),
                };
                let next = current
                    .checked_add(withdrawal.amount)
                    .ok_or(LedgerError::SumOverflow {
                        address,
                        block: block.number,
                    })?;
                pending.insert(address, next);
            }
        }

        let mut recorded = 0;
        for block in blocks {
            for withdrawal in &block.withdrawals {
                let detail = WithdrawalDetail::from_withdrawal(block.number, withdrawal);
                self.withdrawals
                    .entry(withdrawal.address)
                    .or_default()
                    .record(detail)
                    .ok_or(LedgerError::SumOverflow {
                        address: withdrawal.address,
                        block: block.number,
                    })?;
                recorded += 1;
            }
        }
        Ok(recorded)
    }

    /// Move the cursor to `block`.
    ///
    /// # Errors
    /// - `CursorOverflow` if `block` does not fit the signed cursor
    /// - `CursorRegression` if `block` is below the current cursor
    pub fn advance_to(&mut self, block: BlockNumber) -> Result<(), LedgerError> {
        let requested =
            i64::try_from(block).map_err(|_| LedgerError::CursorOverflow { block })?;
        invariant_cursor_monotonic(self.last_block, requested)?;
        self.last_block = requested;
        Ok(())
    }

    /// Ledger of `address`.
    pub fn ledger(&self, address: &Address) -> Option<&AddressLedger> {
        self.withdrawals.get(address)
    }

    /// Number of addresses with at least one withdrawal.
    pub fn address_count(&self) -> usize {
        self.withdrawals.len()
    }

    /// Number of recorded withdrawal details across all addresses.
    pub fn detail_count(&self) -> usize {
        self.withdrawals.values().map(|l| l.details.len()).sum()
    }

    /// Check `sum == Σ amount` for every address.
    pub fn verify_sums(&self) -> Result<(), LedgerError> {
        for (address, ledger) in &self.withdrawals {
            super::invariants::invariant_sum_matches(address, ledger)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Withdrawal;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    fn withdrawal(address: Address, amount: u64, index: u64) -> Withdrawal {
        Withdrawal {
            address,
            amount: U256::from(amount),
            index: U256::from(index),
        }
    }

    #[test]
    fn test_new_cache_starts_before_genesis() {
        let cache = SyncCache::new();
        assert_eq!(cache.last_block, -1);
        assert_eq!(cache.next_block(), 0);
        assert!(!cache.is_synced_to(0));
    }

    #[test]
    fn test_apply_block_updates_sum_and_details() {
        let mut cache = SyncCache::new();
        let block = BlockWithdrawals::new(
            12,
            vec![
                withdrawal(addr(1), 100, 0),
                withdrawal(addr(2), 5, 1),
                withdrawal(addr(1), 50, 2),
            ],
        );

        assert_eq!(cache.apply_block(&block).unwrap(), 3);

        let ledger = cache.ledger(&addr(1)).unwrap();
        assert_eq!(ledger.sum, U256::from(150u64));
        assert_eq!(ledger.details.len(), 2);
        assert_eq!(ledger.details[1].index, U256::from(2u64));
        assert!(cache.verify_sums().is_ok());
    }

    #[test]
    fn test_empty_block_has_no_side_effects() {
        let mut cache = SyncCache::new();
        let before = cache.clone();
        assert_eq!(cache.apply_block(&BlockWithdrawals::new(3, vec![])).unwrap(), 0);
        assert_eq!(cache, before);
    }

    #[test]
    fn test_advance_rejects_regression() {
        let mut cache = SyncCache::new();
        cache.advance_to(99).unwrap();
        cache.advance_to(99).unwrap();
        assert!(matches!(
            cache.advance_to(50),
            Err(LedgerError::CursorRegression { current: 99, requested: 50 })
        ));
        assert_eq!(cache.last_block, 99);
    }

    #[test]
    fn test_verify_sums_detects_tampering() {
        let mut cache = SyncCache::new();
        cache
            .apply_block(&BlockWithdrawals::new(1, vec![withdrawal(addr(7), 10, 0)]))
            .unwrap();
        cache.withdrawals.get_mut(&addr(7)).unwrap().sum = U256::from(11u64);

        assert!(matches!(
            cache.verify_sums(),
            Err(LedgerError::SumMismatch { .. })
        ));
    }

    #[test]
    fn test_sorted_details_is_stable() {
        let mut ledger = AddressLedger::default();
        for (block, index) in [(30, 0), (10, 1), (30, 2), (20, 3)] {
            ledger.record(WithdrawalDetail {
                block,
                index: U256::from(index as u64),
                amount: U256::one(),
            })
            .unwrap();
        }

        let order: Vec<(u64, u64)> = ledger
            .sorted_details()
            .iter()
            .map(|d| (d.block, d.index.as_u64()))
            .collect();
        assert_eq!(order, vec![(10, 1), (20, 3), (30, 0), (30, 2)]);
    }

    #[test]
    fn test_record_refuses_to_overflow_sum() {
        let mut ledger = AddressLedger::default();
        let big = WithdrawalDetail {
            block: 1,
            index: U256::zero(),
            amount: U256::MAX,
        };
        assert_eq!(ledger.record(big.clone()), Some(U256::MAX));

        let one_more = WithdrawalDetail {
            block: 2,
            index: U256::one(),
            amount: U256::one(),
        };
        assert_eq!(ledger.record(one_more), None);
        assert_eq!(ledger.details, vec![big]);
        assert_eq!(ledger.sum, U256::MAX);
    }

    #[test]
    fn test_overflowing_blocks_leave_cache_untouched() {
        let mut cache = SyncCache::new();
        cache
            .apply_block(&BlockWithdrawals::new(1, vec![withdrawal(addr(7), 10, 0)]))
            .unwrap();
        let before = cache.clone();

        let huge = Withdrawal {
            address: addr(7),
            amount: U256::MAX,
            index: U256::from(2u64),
        };
        let blocks = vec![
            BlockWithdrawals::new(2, vec![withdrawal(addr(8), 1, 1)]),
            BlockWithdrawals::new(3, vec![huge]),
        ];

        assert!(matches!(
            cache.apply_blocks(&blocks),
            Err(LedgerError::SumOverflow { block: 3, .. })
        ));
        assert_eq!(cache, before);
        assert!(cache.verify_sums().is_ok());
    }

    #[test]
    fn test_advance_beyond_signed_range_is_overflow() {
        let mut cache = SyncCache::new();
        cache.advance_to(7).unwrap();
        assert!(matches!(
            cache.advance_to(u64::MAX),
            Err(LedgerError::CursorOverflow { block: u64::MAX })
        ));
        assert_eq!(cache.last_block, 7);
    }

    #[test]
    fn test_wire_format() {
        let mut cache = SyncCache::new();
        cache
            .apply_block(&BlockWithdrawals::new(5, vec![withdrawal(addr(0xab), 32, 9)]))
            .unwrap();
        cache.advance_to(5).unwrap();

        let json = serde_json::to_value(&cache).unwrap();
        assert_eq!(json["lastBlock"], 5);
        let entry = &json["withdrawals"]["0xabababababababababababababababababababab"];
        assert_eq!(entry["sum"], "32");
        assert_eq!(entry["details"][0]["block"], 5);
        assert_eq!(entry["details"][0]["index"], "9");
        assert_eq!(entry["details"][0]["amount"], "32");
    }
}
