//! # Inbound Ports
//!
//! API trait defining what the reconciliation engine can do. Reconciliation
//! is pure arithmetic over already synced data, so the API is synchronous.

use shared_types::{Address, TransferEvent};
use wa_02_withdrawal_ledger::SyncCache;

use crate::domain::{AddressReport, AuditSummary, LogTotals, ReconciliationError, ReconciliationLog};

/// Reconciliation API - inbound port.
pub trait ReconciliationApi: Send + Sync {
    /// Reconcile one address against its claims (any order).
    ///
    /// # Errors
    /// - `AddressNotFound` if the ledger has no entry for `address`
    fn reconcile_address(
        &self,
        ledger: &SyncCache,
        address: &Address,
        claims: &[TransferEvent],
    ) -> Result<AddressReport, ReconciliationError>;

    /// Reconcile every claimant found in `transfers`, append the intervals
    /// not logged yet and persist the log.
    ///
    /// Unknown claimants are skipped and listed in the summary.
    ///
    /// # Errors
    /// - `Cache` if the log cannot be written
    fn audit(
        &mut self,
        ledger: &SyncCache,
        transfers: &[TransferEvent],
    ) -> Result<AuditSummary, ReconciliationError>;

    /// The reconciliation log.
    fn log(&self) -> &ReconciliationLog;

    /// Cumulative totals of the log.
    fn totals(&self) -> LogTotals {
        self.log().totals()
    }
}
