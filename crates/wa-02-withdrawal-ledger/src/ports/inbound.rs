//! # Inbound Ports
//!
//! API trait defining what the withdrawal ledger can do.

use async_trait::async_trait;
use shared_types::{Address, BlockNumber};

use crate::domain::{AddressLedger, LedgerError, SyncCache, SyncReport};

/// Withdrawal ledger API - inbound port.
#[async_trait]
pub trait WithdrawalLedgerApi: Send + Sync {
    /// Sync from the cursor up to the chain head observed at the start of
    /// the call.
    async fn sync(&mut self) -> Result<SyncReport, LedgerError>;

    /// Sync from the cursor up to `head`. Makes no source calls when the
    /// cursor is already at or past `head`.
    async fn sync_to(&mut self, head: BlockNumber) -> Result<SyncReport, LedgerError>;

    /// Current cache.
    fn cache(&self) -> &SyncCache;

    /// Ledger of one address.
    fn ledger(&self, address: &Address) -> Option<&AddressLedger>;

    /// Highest block processed (`-1` before the first chunk).
    fn last_block(&self) -> i64;
}
