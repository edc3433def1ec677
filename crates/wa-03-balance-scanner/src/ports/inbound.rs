//! # Inbound Ports
//!
//! API trait defining what the balance scanner can do.

use async_trait::async_trait;
use shared_types::{Address, BlockNumber, U256};
use std::collections::BTreeMap;

use crate::domain::{ScanError, ScanPhase, ScanReport};

/// Balance scanner API - inbound port.
#[async_trait]
pub trait BalanceScannerApi: Send + Sync {
    /// Scan up to the chain head observed at the start of the call.
    async fn scan(&mut self) -> Result<ScanReport, ScanError>;

    /// Scan up to `head` (inclusive).
    async fn scan_to(&mut self, head: BlockNumber) -> Result<ScanReport, ScanError>;

    /// Holders known so far.
    fn balances(&self) -> &BTreeMap<Address, U256>;

    /// Last persisted `lastBlockSynced`.
    fn checkpoint(&self) -> Option<BlockNumber>;

    /// Current run phase.
    fn phase(&self) -> ScanPhase;
}
