//! # Reconciliation Service
//!
//! Runs the interval fold for each claimant, reports findings and keeps the
//! append-only reconciliation log.

use shared_types::{Address, TransferEvent};
use wa_01_cache_store::{CacheStore, DocumentStore};
use wa_02_withdrawal_ledger::SyncCache;

use crate::algorithms::{claims_by_recipient, reconcile};
use crate::config::ReconciliationConfig;
use crate::domain::{AddressReport, AuditSummary, ReconciliationError, ReconciliationLog};
use crate::ports::ReconciliationApi;

/// Reconciliation Service.
pub struct ReconciliationService<S: DocumentStore> {
    config: ReconciliationConfig,
    store: CacheStore<S>,
    log: ReconciliationLog,
}

impl<S: DocumentStore> ReconciliationService<S> {
    /// Create the service, loading the existing log (or starting a new one).
    pub fn new(config: ReconciliationConfig, store: CacheStore<S>) -> Self {
        let log = store.load_or_default::<ReconciliationLog>();
        Self { config, store, log }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    fn report_intervals(report: &AddressReport) {
        for interval in &report.intervals {
            if interval.matches {
                tracing::info!(
                    "[wa-04] {} - {}: success: {}",
                    interval.from_block,
                    interval.to_block,
                    interval.withdrawals_accumulated
                );
            } else {
                tracing::warn!(
                    "[wa-04] {} - {}: wrong value: expected {}, got {}",
                    interval.from_block,
                    interval.to_block,
                    interval.claimed,
                    interval.withdrawals_accumulated
                );
            }
        }

        if !report.totals_match {
            tracing::warn!(
                "[wa-04] {}: total claimed {} != total accumulated {}",
                report.address,
                report.total_claimed,
                report.total_accumulated
            );
        }
        if !report.unattributed_before_first_claim.is_empty() {
            tracing::warn!(
                "[wa-04] {}: {} withdrawals ({}) before the first claim were not attributed",
                report.address,
                report.unattributed_before_first_claim.count,
                report.unattributed_before_first_claim.scaled_sum
            );
        }
        if !report.pending_after_last_claim.is_empty() {
            tracing::debug!(
                "[wa-04] {}: {} withdrawals ({}) pending after the last claim",
                report.address,
                report.pending_after_last_claim.count,
                report.pending_after_last_claim.scaled_sum
            );
        }
    }
}

impl<S: DocumentStore> ReconciliationApi for ReconciliationService<S> {
    fn reconcile_address(
        &self,
        ledger: &SyncCache,
        address: &Address,
        claims: &[TransferEvent],
    ) -> Result<AddressReport, ReconciliationError> {
        let entry = ledger
            .ledger(address)
            .ok_or(ReconciliationError::AddressNotFound { address: *address })?;

        let details = entry.sorted_details();
        let mut claims = claims.to_vec();
        claims.sort_by_key(|c| c.block);

        let scale = &self.config.scale;
        let outcome = reconcile(*address, &details, &claims, scale);

        let total_claimed = crate::domain::total(claims.iter().map(|c| &c.value));
        let total_accumulated = outcome
            .windows_accumulated()
            .saturating_add(outcome.unattributed.scaled_sum);
        let mismatched_intervals = outcome.intervals.iter().filter(|i| !i.matches).count();

        Ok(AddressReport {
            address: *address,
            intervals: outcome.intervals,
            total_claimed,
            total_accumulated,
            totals_match: total_claimed == total_accumulated,
            mismatched_intervals,
            unattributed_before_first_claim: outcome.unattributed,
            pending_after_last_claim: outcome.pending,
        })
    }

    fn audit(
        &mut self,
        ledger: &SyncCache,
        transfers: &[TransferEvent],
    ) -> Result<AuditSummary, ReconciliationError> {
        let claims = claims_by_recipient(
            transfers,
            &self.config.claim_source,
            self.config.claims_start_block,
        );
        tracing::info!(
            "[wa-04] reconciling {} claimants with scale {}",
            claims.len(),
            self.config.scale
        );

        let mut summary = AuditSummary::default();
        for (address, address_claims) in &claims {
            tracing::info!("[wa-04] processing address {}", address);
            match self.reconcile_address(ledger, address, address_claims) {
                Ok(report) => {
                    Self::report_intervals(&report);
                    self.log.append_new(&report.intervals);
                    summary.reports.push(report);
                }
                Err(e) => {
                    tracing::warn!("[wa-04] skipping {}: {}", address, e);
                    summary.skipped.push(e);
                }
            }
        }

        self.store.save(&self.log)?;

        let totals = summary.totals();
        tracing::info!("[wa-04] total tokens claimed: {}", totals.claimed);
        tracing::info!("[wa-04] total withdrawals accumulated: {}", totals.accumulated);
        tracing::info!(
            "[wa-04] {} intervals, {} discrepancies, {} addresses skipped",
            summary.interval_count(),
            summary.discrepancy_count(),
            summary.skipped.len()
        );
        Ok(summary)
    }

    fn log(&self) -> &ReconciliationLog {
        &self.log
    }
}
