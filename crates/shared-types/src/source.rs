//! # Event Source Port
//!
//! Outbound port for everything the audit reads from the chain: block
//! withdrawals, the chain head, token transfer events and token balances.
//!
//! The production adapter is a JSON-RPC client (see `audit-runtime`);
//! [`InMemoryEventSource`] backs tests and dry runs.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::entities::{Address, BlockNumber, BlockWithdrawals, TransferEvent, Withdrawal, U256};
use crate::errors::SourceError;

/// Chain data source - outbound port.
///
/// Implementations must return a stable, finalized view of any block range
/// at or below the head they report.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Current chain head height.
    async fn block_number(&self) -> Result<BlockNumber, SourceError>;

    /// Withdrawals of one block, `None` if the block does not exist yet.
    async fn get_block(&self, number: BlockNumber)
        -> Result<Option<BlockWithdrawals>, SourceError>;

    /// Token `Transfer` events, ascending by block. Bounds are inclusive;
    /// `None` means genesis / latest.
    async fn transfer_events(
        &self,
        from_block: Option<BlockNumber>,
        to_block: Option<BlockNumber>,
    ) -> Result<Vec<TransferEvent>, SourceError>;

    /// Current token balance of `holder`.
    async fn balance_of(&self, holder: &Address) -> Result<U256, SourceError>;
}

// =============================================================================
// In-memory implementation
// =============================================================================

/// Deterministic event source with call counters and fault injection.
#[derive(Default)]
pub struct InMemoryEventSource {
    head: AtomicU64,
    blocks: RwLock<BTreeMap<BlockNumber, Vec<Withdrawal>>>,
    transfers: RwLock<Vec<TransferEvent>>,
    balances: RwLock<HashMap<Address, U256>>,
    failing_blocks: RwLock<BTreeSet<BlockNumber>>,
    fail_next_fetches: AtomicUsize,
    head_calls: AtomicUsize,
    block_calls: AtomicUsize,
    transfer_calls: AtomicUsize,
    balance_calls: AtomicUsize,
}

impl InMemoryEventSource {
    /// Empty chain whose head is `head`.
    pub fn new(head: BlockNumber) -> Self {
        Self {
            head: AtomicU64::new(head),
            ..Default::default()
        }
    }

    /// Add a withdrawal to `block`.
    pub fn with_withdrawal(self, block: BlockNumber, address: Address, amount: u64, index: u64) -> Self {
        self.push_withdrawal(
            block,
            Withdrawal {
                address,
                amount: U256::from(amount),
                index: U256::from(index),
            },
        );
        self
    }

    /// Add a transfer event.
    pub fn with_transfer(self, event: TransferEvent) -> Self {
        self.transfers.write().push(event);
        self
    }

    /// Set a holder's token balance.
    pub fn with_balance(self, holder: Address, balance: U256) -> Self {
        self.balances.write().insert(holder, balance);
        self
    }

    /// Append a withdrawal to `block` in place.
    pub fn push_withdrawal(&self, block: BlockNumber, withdrawal: Withdrawal) {
        self.blocks.write().entry(block).or_default().push(withdrawal);
    }

    /// Move the chain head.
    pub fn set_head(&self, head: BlockNumber) {
        self.head.store(head, Ordering::SeqCst);
    }

    /// Fail the next `count` block fetches, whatever block they ask for.
    pub fn fail_next_block_fetches(&self, count: usize) {
        self.fail_next_fetches.store(count, Ordering::SeqCst);
    }

    /// Fail every fetch of `block` until [`clear_failures`](Self::clear_failures).
    pub fn fail_block(&self, block: BlockNumber) {
        self.failing_blocks.write().insert(block);
    }

    /// Remove all injected faults.
    pub fn clear_failures(&self) {
        self.failing_blocks.write().clear();
        self.fail_next_fetches.store(0, Ordering::SeqCst);
    }

    /// Number of `block_number` calls served.
    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_block` calls served (including failed ones).
    pub fn block_calls(&self) -> usize {
        self.block_calls.load(Ordering::SeqCst)
    }

    /// Number of `transfer_events` calls served.
    pub fn transfer_calls(&self) -> usize {
        self.transfer_calls.load(Ordering::SeqCst)
    }

    /// Number of `balance_of` calls served.
    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    /// Total adapter calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.head_calls() + self.block_calls() + self.transfer_calls() + self.balance_calls()
    }

    fn take_injected_failure(&self) -> bool {
        self.fail_next_fetches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    async fn block_number(&self) -> Result<BlockNumber, SourceError> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn get_block(
        &self,
        number: BlockNumber,
    ) -> Result<Option<BlockWithdrawals>, SourceError> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);

        if self.take_injected_failure() || self.failing_blocks.read().contains(&number) {
            return Err(SourceError::Injected { block: number });
        }

        if number > self.head.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let withdrawals = self.blocks.read().get(&number).cloned().unwrap_or_default();
        Ok(Some(BlockWithdrawals::new(number, withdrawals)))
    }

    async fn transfer_events(
        &self,
        from_block: Option<BlockNumber>,
        to_block: Option<BlockNumber>,
    ) -> Result<Vec<TransferEvent>, SourceError> {
        self.transfer_calls.fetch_add(1, Ordering::SeqCst);

        let from = from_block.unwrap_or(0);
        let to = to_block.unwrap_or(BlockNumber::MAX);
        let mut events: Vec<TransferEvent> = self
            .transfers
            .read()
            .iter()
            .filter(|e| e.block >= from && e.block <= to)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.block);
        Ok(events)
    }

    async fn balance_of(&self, holder: &Address) -> Result<U256, SourceError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.balances.read().get(holder).copied().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    #[tokio::test]
    async fn test_blocks_beyond_head_are_missing() {
        let source = InMemoryEventSource::new(10).with_withdrawal(5, addr(1), 100, 0);

        let block = source.get_block(5).await.unwrap().unwrap();
        assert_eq!(block.withdrawals.len(), 1);
        assert!(source.get_block(6).await.unwrap().unwrap().is_empty());
        assert!(source.get_block(11).await.unwrap().is_none());
        assert_eq!(source.block_calls(), 3);
    }

    #[tokio::test]
    async fn test_fail_next_fetches_counts_down() {
        let source = InMemoryEventSource::new(10);
        source.fail_next_block_fetches(2);

        assert!(source.get_block(1).await.is_err());
        assert!(source.get_block(1).await.is_err());
        assert!(source.get_block(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_block_until_cleared() {
        let source = InMemoryEventSource::new(10);
        source.fail_block(3);

        assert_eq!(
            source.get_block(3).await,
            Err(SourceError::Injected { block: 3 })
        );
        assert!(source.get_block(4).await.is_ok());
        source.clear_failures();
        assert!(source.get_block(3).await.is_ok());
    }

    #[tokio::test]
    async fn test_transfer_events_are_block_ordered_and_bounded() {
        let source = InMemoryEventSource::new(100)
            .with_transfer(TransferEvent::new(50, addr(1), addr(2), U256::one()))
            .with_transfer(TransferEvent::new(10, addr(1), addr(3), U256::one()))
            .with_transfer(TransferEvent::new(90, addr(1), addr(4), U256::one()));

        let all = source.transfer_events(None, None).await.unwrap();
        let blocks: Vec<_> = all.iter().map(|e| e.block).collect();
        assert_eq!(blocks, vec![10, 50, 90]);

        let bounded = source.transfer_events(Some(20), Some(90)).await.unwrap();
        assert_eq!(bounded.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_holder_has_zero_balance() {
        let source = InMemoryEventSource::new(0).with_balance(addr(1), U256::from(9u64));
        assert_eq!(source.balance_of(&addr(1)).await.unwrap(), U256::from(9u64));
        assert_eq!(source.balance_of(&addr(2)).await.unwrap(), U256::zero());
        assert_eq!(source.balance_calls(), 2);
    }
}
