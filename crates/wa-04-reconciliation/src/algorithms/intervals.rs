//! # Interval Fold
//!
//! Walks block-ordered claims and block-ordered withdrawal details in lock
//! step. The detail cursor is carried from one window to the next and only
//! moves forward, so the whole reconciliation is a single merge of two
//! sorted sequences.

use shared_types::{Address, TransferEvent, WithdrawalDetail, U256};

use crate::domain::{total, AttributionGap, ClaimInterval, Scale};

/// Outcome of reconciling one address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// One interval per adjacent claim pair.
    pub intervals: Vec<ClaimInterval>,
    /// Details skipped because they precede the first claim.
    pub unattributed: AttributionGap,
    /// Details at or after the last claim.
    pub pending: AttributionGap,
}

impl Reconciliation {
    /// Σ accumulated over all intervals.
    pub fn windows_accumulated(&self) -> U256 {
        total(self.intervals.iter().map(|i| &i.withdrawals_accumulated))
    }
}

/// Reconcile `claims` against `details` for `address`.
///
/// Both slices must be sorted by block. Window `i` is
/// `[claims[i].block, claims[i+1].block - 1]` and is checked against
/// `claims[i+1].value`. A detail exactly on the upper bound belongs to the
/// window; the next one is left under the cursor for the following window.
pub fn reconcile(
    address: Address,
    details: &[WithdrawalDetail],
    claims: &[TransferEvent],
    scale: &Scale,
) -> Reconciliation {
    let mut outcome = Reconciliation::default();
    let (Some(first), Some(last)) = (claims.first(), claims.last()) else {
        return outcome;
    };

    // Details before the first claim are never attributed to a window.
    let start = details.partition_point(|d| d.block < first.block);
    for detail in &details[..start] {
        outcome.unattributed.add(scale.apply(detail.amount));
    }

    let (_, intervals) = claims.windows(2).fold(
        (start, Vec::with_capacity(claims.len().saturating_sub(1))),
        |(cursor, mut intervals), pair| {
            let (cursor, interval) = attribute_window(address, details, cursor, pair, scale);
            intervals.push(interval);
            (cursor, intervals)
        },
    );
    outcome.intervals = intervals;

    let pending_from = details.partition_point(|d| d.block < last.block);
    for detail in &details[pending_from..] {
        outcome.pending.add(scale.apply(detail.amount));
    }

    outcome
}

/// Accumulate one window starting at `cursor`. Returns the cursor left on the
/// first detail past the window.
fn attribute_window(
    address: Address,
    details: &[WithdrawalDetail],
    mut cursor: usize,
    pair: &[TransferEvent],
    scale: &Scale,
) -> (usize, ClaimInterval) {
    let (open, close) = (&pair[0], &pair[1]);
    let from = open.block;
    if close.block <= from {
        return (cursor, ClaimInterval::empty_window(address, from, close.value));
    }

    let to = close.block - 1;
    let mut sum = U256::zero();
    while let Some(detail) = details.get(cursor) {
        if detail.block > to {
            break;
        }
        sum = sum.saturating_add(scale.apply(detail.amount));
        cursor += 1;
    }

    (cursor, ClaimInterval::new(address, from, to, close.value, sum))
}
