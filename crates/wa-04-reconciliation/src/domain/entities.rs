//! # Domain Entities
//!
//! Claim intervals, per-address reports, the run summary and the two
//! persisted documents owned by reconciliation.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use shared_types::{Address, BlockNumber, DecimalU256, TransferEvent, U256};
use std::collections::BTreeMap;
use wa_01_cache_store::CacheDocument;

use super::errors::ReconciliationError;
use super::invariants::total;
use super::value_objects::{AttributionGap, LogTotals, Scale};

/// One claim window and its verdict. Never mutated after creation.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimInterval {
    /// Claim recipient.
    pub address: Address,
    /// Block of the claim opening the window.
    pub from_block: BlockNumber,
    /// Last block of the window (one before the closing claim).
    pub to_block: BlockNumber,
    /// Value of the closing claim.
    #[serde_as(as = "DecimalU256")]
    pub claimed: U256,
    /// Scaled withdrawals attributed to the window.
    #[serde_as(as = "DecimalU256")]
    pub withdrawals_accumulated: U256,
    /// `claimed == withdrawals_accumulated`.
    #[serde(rename = "match")]
    pub matches: bool,
    /// Both claims share a block, so nothing can be attributed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub empty: bool,
}

/// Identity of a logged interval: recipient, bounds and emptiness.
pub type IntervalKey = (Address, BlockNumber, BlockNumber, bool);

impl ClaimInterval {
    /// Build an interval, deriving `matches`.
    pub fn new(
        address: Address,
        from_block: BlockNumber,
        to_block: BlockNumber,
        claimed: U256,
        withdrawals_accumulated: U256,
    ) -> Self {
        Self {
            address,
            from_block,
            to_block,
            claimed,
            withdrawals_accumulated,
            matches: claimed == withdrawals_accumulated,
            empty: false,
        }
    }

    /// Window between two claims in the same `block`. Nothing is attributed;
    /// `to_block` is the block before, or `0` at genesis.
    pub fn empty_window(address: Address, block: BlockNumber, claimed: U256) -> Self {
        Self {
            empty: true,
            ..Self::new(address, block, block.saturating_sub(1), claimed, U256::zero())
        }
    }

    /// True when the window covers no block.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Key used to recognize the same window across runs.
    pub fn key(&self) -> IntervalKey {
        (self.address, self.from_block, self.to_block, self.empty)
    }
}

/// Reconciliation result for one address.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressReport {
    /// Claim recipient.
    pub address: Address,
    /// One interval per adjacent claim pair, in block order.
    pub intervals: Vec<ClaimInterval>,
    /// Every claim value, the first one included.
    #[serde_as(as = "DecimalU256")]
    pub total_claimed: U256,
    /// Scaled withdrawals up to the last claim, including those before the
    /// first claim.
    #[serde_as(as = "DecimalU256")]
    pub total_accumulated: U256,
    /// `total_claimed == total_accumulated`.
    pub totals_match: bool,
    /// Intervals with `match: false`.
    pub mismatched_intervals: usize,
    /// Withdrawals before the first claim; never attributed to a window.
    pub unattributed_before_first_claim: AttributionGap,
    /// Withdrawals at or after the last claim; accrued, not yet claimed.
    pub pending_after_last_claim: AttributionGap,
}

impl AddressReport {
    /// True if every window and the totals agree.
    pub fn is_clean(&self) -> bool {
        self.mismatched_intervals == 0 && self.totals_match
    }
}

/// Result of reconciling every claimant.
#[derive(Debug, Default)]
pub struct AuditSummary {
    /// Reports of the addresses that could be reconciled.
    pub reports: Vec<AddressReport>,
    /// Addresses that could not be reconciled, with the reason.
    pub skipped: Vec<ReconciliationError>,
}

impl AuditSummary {
    /// Mismatched intervals, plus addresses whose windows all match but
    /// whose totals do not.
    pub fn discrepancy_count(&self) -> usize {
        self.reports
            .iter()
            .map(|r| {
                if r.mismatched_intervals > 0 {
                    r.mismatched_intervals
                } else {
                    usize::from(!r.totals_match)
                }
            })
            .sum()
    }

    /// Total intervals checked.
    pub fn interval_count(&self) -> usize {
        self.reports.iter().map(|r| r.intervals.len()).sum()
    }

    /// Totals over every reconciled address.
    pub fn totals(&self) -> LogTotals {
        LogTotals {
            claimed: total(self.reports.iter().map(|r| &r.total_claimed)),
            accumulated: total(self.reports.iter().map(|r| &r.total_accumulated)),
        }
    }
}

/// Append-only log of every distinct interval checked (`reconciliation.json`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconciliationLog {
    /// Intervals in the order they were produced.
    pub intervals: Vec<ClaimInterval>,
}

impl CacheDocument for ReconciliationLog {
    const FILE_NAME: &'static str = "reconciliation.json";

    fn empty() -> Self {
        Self::default()
    }
}

impl ReconciliationLog {
    /// Append intervals.
    pub fn extend(&mut self, intervals: impl IntoIterator<Item = ClaimInterval>) {
        self.intervals.extend(intervals);
    }

    /// Append the intervals of one run, skipping windows already logged
    /// (same [`key`](ClaimInterval::key)). Windows repeated within
    /// `intervals` pair up with logged entries in order, so re-running an
    /// audit over unchanged data leaves the log unchanged.
    ///
    /// Returns how many entries were appended.
    pub fn append_new<'a>(&mut self, intervals: impl IntoIterator<Item = &'a ClaimInterval>) -> usize {
        let mut logged: BTreeMap<IntervalKey, usize> = BTreeMap::new();
        for interval in &self.intervals {
            *logged.entry(interval.key()).or_insert(0) += 1;
        }

        let mut appended = 0;
        for interval in intervals {
            match logged.get_mut(&interval.key()) {
                Some(remaining) if *remaining > 0 => *remaining -= 1,
                _ => {
                    self.intervals.push(interval.clone());
                    appended += 1;
                }
            }
        }
        appended
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// True if nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Cumulative claimed vs accumulated across all entries.
    pub fn totals(&self) -> LogTotals {
        LogTotals {
            claimed: total(self.intervals.iter().map(|i| &i.claimed)),
            accumulated: total(self.intervals.iter().map(|i| &i.withdrawals_accumulated)),
        }
    }

    /// When withdrawals exceed claims, the excess converted back to source
    /// units and divided by `typical_amount`: a rough count of withdrawals
    /// that were never claimed. `None` if nothing is missing or
    /// `typical_amount` is zero.
    pub fn estimated_missing_withdrawals(&self, scale: &Scale, typical_amount: U256) -> Option<U256> {
        if typical_amount.is_zero() {
            return None;
        }
        self.totals()
            .unclaimed()
            .map(|excess| scale.invert(excess) / typical_amount)
    }
}

/// Every token transfer event seen so far (`transfers.json`), block ordered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferLog {
    /// Events.
    pub events: Vec<TransferEvent>,
}

impl CacheDocument for TransferLog {
    const FILE_NAME: &'static str = "transfers.json";

    fn empty() -> Self {
        Self::default()
    }
}

impl TransferLog {
    /// Wrap events, sorting them by block (stable).
    pub fn new(mut events: Vec<TransferEvent>) -> Self {
        events.sort_by_key(|e| e.block);
        Self { events }
    }
}
