//! One function per CLI subcommand.
//!
//! Every command that writes to the data directory holds its lock for the
//! whole run. Commands take the event source as a parameter so they run
//! unchanged against the in-memory source.

use anyhow::Context;
use shared_types::{EventSource, U256};
use std::sync::Arc;
use wa_01_cache_store::{CacheStore, DataDirLock, JsonFileStore};
use wa_02_withdrawal_ledger::{SyncCache, SyncReport, WithdrawalLedgerApi, WithdrawalLedgerService};
use wa_03_balance_scanner::{BalanceScannerApi, BalanceScannerService, ScanReport};
use wa_04_reconciliation::{
    AuditSummary, LogTotals, ReconciliationApi, ReconciliationLog, ReconciliationService,
    TransferLog,
};

use crate::config::AuditConfig;

fn lock_data_dir(config: &AuditConfig) -> anyhow::Result<DataDirLock> {
    DataDirLock::acquire(&config.data_dir)
        .with_context(|| format!("cannot lock data directory {}", config.data_dir.display()))
}

fn open_store(config: &AuditConfig) -> CacheStore<JsonFileStore> {
    CacheStore::new(JsonFileStore::new(&config.data_dir))
}

/// `sync-withdrawals`: bring `withdrawals.json` up to the chain head.
pub async fn sync_withdrawals<E: EventSource + 'static>(
    config: &AuditConfig,
    source: Arc<E>,
) -> anyhow::Result<SyncReport> {
    let _lock = lock_data_dir(config)?;
    let mut service =
        WithdrawalLedgerService::new(config.ledger.clone(), source, open_store(config));
    service.sync().await.context("withdrawal sync failed")
}

/// `fetch-transfers`: replace `transfers.json` with every token transfer.
pub async fn fetch_transfers<E: EventSource + 'static>(
    config: &AuditConfig,
    source: Arc<E>,
) -> anyhow::Result<usize> {
    let _lock = lock_data_dir(config)?;
    let events = source
        .transfer_events(None, None)
        .await
        .context("fetching transfer events failed")?;

    let log = TransferLog::new(events);
    open_store(config)
        .save(&log)
        .context("writing transfers.json failed")?;

    tracing::info!("[audit] stored {} transfer events", log.events.len());
    Ok(log.events.len())
}

/// `scan-balances`: extend the holder index in `balances.json`.
pub async fn scan_balances<E: EventSource + 'static>(
    config: &AuditConfig,
    source: Arc<E>,
) -> anyhow::Result<ScanReport> {
    let _lock = lock_data_dir(config)?;
    let mut service =
        BalanceScannerService::new(config.scanner.clone(), source, open_store(config));
    service.scan().await.context("balance scan stopped")
}

/// `check`: reconcile every claimant and append new windows to the
/// reconciliation log.
///
/// Mismatches are reported in the summary; they do not fail the command.
pub fn check(config: &AuditConfig) -> anyhow::Result<AuditSummary> {
    config.require_deposit_contract()?;
    let _lock = lock_data_dir(config)?;

    let store = open_store(config);
    let ledger: SyncCache = store.load_or_default();
    let transfers: TransferLog = store.load_or_default();
    if transfers.events.is_empty() {
        tracing::warn!("[audit] transfers.json is empty; run fetch-transfers first");
    }

    let mut service = ReconciliationService::new(config.reconciliation.clone(), store);
    service
        .audit(&ledger, &transfers.events)
        .context("reconciliation failed")
}

/// Result of `summarize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSummary {
    /// Entries in the reconciliation log.
    pub entries: usize,
    /// Cumulative totals.
    pub totals: LogTotals,
    /// Rough count of withdrawals that were never claimed.
    pub estimated_missing: Option<U256>,
}

/// `summarize`: totals of the reconciliation log.
pub fn summarize(config: &AuditConfig) -> anyhow::Result<LogSummary> {
    let store = open_store(config);
    let log = store
        .load::<ReconciliationLog>()
        .context("reading reconciliation.json failed")?
        .unwrap_or_default();

    let reconciliation = &config.reconciliation;
    Ok(LogSummary {
        entries: log.len(),
        totals: log.totals(),
        estimated_missing: log
            .estimated_missing_withdrawals(&reconciliation.scale, reconciliation.typical_withdrawal),
    })
}
