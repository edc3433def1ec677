//! # Invariants and Constants

use shared_types::U256;

use super::entities::ClaimInterval;

/// Default scale numerator (source unit to token unit).
pub const DEFAULT_SCALE_NUMERATOR: u64 = 1_000_000_000;

/// Default scale denominator.
pub const DEFAULT_SCALE_DENOMINATOR: u64 = 32;

/// Typical withdrawal amount in source units, used to turn an unexplained
/// token difference into an estimated count of missed withdrawals.
pub const DEFAULT_TYPICAL_WITHDRAWAL: u64 = 1525;

/// `match` must equal `claimed == withdrawalsAccumulated`.
pub fn invariant_interval_consistent(interval: &ClaimInterval) -> bool {
    interval.matches == (interval.claimed == interval.withdrawals_accumulated)
}

/// Saturating sum.
pub fn total<'a>(values: impl IntoIterator<Item = &'a U256>) -> U256 {
    values
        .into_iter()
        .fold(U256::zero(), |acc, v| acc.saturating_add(*v))
}
