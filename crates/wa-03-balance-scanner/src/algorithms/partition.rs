//! # Range Partitioning and Merge
//!
//! A scan range is cut into batches; each batch is cut into one contiguous
//! sub-range per worker.

use shared_types::{Address, BlockNumber, U256};
use std::collections::BTreeMap;

use crate::domain::{BlockRange, PartialBalances};

/// Cut `[start, end)` into consecutive batches of `batch_size` blocks. The
/// last batch may be shorter.
pub fn plan_batches(start: BlockNumber, end: BlockNumber, batch_size: u64) -> Vec<BlockRange> {
    if batch_size == 0 {
        return Vec::new();
    }

    let mut batches = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let batch_end = cursor.saturating_add(batch_size).min(end);
        batches.push(BlockRange::new(cursor, batch_end));
        cursor = batch_end;
    }
    batches
}

/// Split `range` into at most `workers` contiguous, non-empty sub-ranges
/// whose lengths differ by at most one. Earlier workers take the remainder.
pub fn split_range(range: BlockRange, workers: usize) -> Vec<BlockRange> {
    let len = range.len();
    if len == 0 || workers == 0 {
        return Vec::new();
    }

    let parts = (workers as u64).min(len);
    let base = len / parts;
    let remainder = len % parts;

    let mut start = range.start;
    (0..parts)
        .map(|i| {
            let size = base + u64::from(i < remainder);
            let sub = BlockRange::new(start, start + size);
            start += size;
            sub
        })
        .collect()
}

/// Fold worker results into `accumulated`, never overwriting an address that
/// is already present.
///
/// Partials are applied in ascending worker index regardless of the order
/// they are passed in, so when two workers report the same address the
/// lowest index wins. Returns the number of holders added.
pub fn merge_first_seen(
    accumulated: &mut BTreeMap<Address, U256>,
    mut partials: Vec<PartialBalances>,
) -> usize {
    partials.sort_by_key(|p| p.worker);

    let before = accumulated.len();
    for partial in partials {
        for (address, balance) in partial.balances {
            accumulated.entry(address).or_insert(balance);
        }
    }
    accumulated.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    fn partial(worker: usize, entries: &[(u8, u64)]) -> PartialBalances {
        PartialBalances {
            worker,
            balances: entries
                .iter()
                .map(|(a, v)| (addr(*a), U256::from(*v)))
                .collect(),
        }
    }

    #[test]
    fn test_plan_batches_last_is_short() {
        let batches = plan_batches(100, 125, 10);
        assert_eq!(
            batches,
            vec![
                BlockRange::new(100, 110),
                BlockRange::new(110, 120),
                BlockRange::new(120, 125),
            ]
        );
    }

    #[test]
    fn test_plan_batches_empty_range() {
        assert!(plan_batches(50, 50, 10).is_empty());
        assert!(plan_batches(60, 50, 10).is_empty());
        assert!(plan_batches(0, 50, 0).is_empty());
    }

    #[test]
    fn test_split_range_earlier_workers_take_remainder() {
        let parts = split_range(BlockRange::new(0, 10), 3);
        let lens: Vec<_> = parts.iter().map(|p| p.len()).collect();
        assert_eq!(lens, vec![4, 3, 3]);
        assert_eq!(parts[0], BlockRange::new(0, 4));
        assert_eq!(parts[2], BlockRange::new(7, 10));
    }

    #[test]
    fn test_split_range_fewer_blocks_than_workers() {
        let parts = split_range(BlockRange::new(5, 7), 3);
        assert_eq!(parts, vec![BlockRange::new(5, 6), BlockRange::new(6, 7)]);
    }

    #[test]
    fn test_merge_keeps_existing_entries() {
        let mut acc = BTreeMap::from([(addr(1), U256::from(5u64))]);
        let added = merge_first_seen(&mut acc, vec![partial(0, &[(1, 99), (2, 7)])]);

        assert_eq!(added, 1);
        assert_eq!(acc[&addr(1)], U256::from(5u64));
        assert_eq!(acc[&addr(2)], U256::from(7u64));
    }

    #[test]
    fn test_merge_lowest_worker_wins_tie() {
        let mut acc = BTreeMap::new();
        merge_first_seen(
            &mut acc,
            vec![partial(2, &[(9, 300)]), partial(0, &[(9, 100)]), partial(1, &[(9, 200)])],
        );
        assert_eq!(acc[&addr(9)], U256::from(100u64));
    }

    fn partials_strategy() -> impl Strategy<Value = Vec<PartialBalances>> {
        proptest::collection::vec(
            proptest::collection::btree_map(0u8..12, 0u64..1_000, 0..8),
            1..6,
        )
        .prop_map(|maps| {
            maps.into_iter()
                .enumerate()
                .map(|(worker, entries)| PartialBalances {
                    worker,
                    balances: entries
                        .into_iter()
                        .map(|(a, v)| (addr(a), U256::from(v)))
                        .collect(),
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_merge_is_independent_of_completion_order(
            (ordered, shuffled) in partials_strategy()
                .prop_flat_map(|p| (Just(p.clone()), Just(p).prop_shuffle()))
        ) {
            let mut a = BTreeMap::new();
            let mut b = BTreeMap::new();
            merge_first_seen(&mut a, ordered);
            merge_first_seen(&mut b, shuffled);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_split_covers_range_exactly(
            start in 0u64..10_000,
            len in 0u64..500,
            workers in 1usize..8,
        ) {
            let range = BlockRange::new(start, start + len);
            let parts = split_range(range, workers);

            prop_assert!(parts.len() <= workers);
            let mut cursor = start;
            for part in &parts {
                prop_assert_eq!(part.start, cursor);
                prop_assert!(!part.is_empty());
                cursor = part.end;
            }
            prop_assert_eq!(cursor, start + len);

            if let (Some(max), Some(min)) = (
                parts.iter().map(|p| p.len()).max(),
                parts.iter().map(|p| p.len()).min(),
            ) {
                prop_assert!(max - min <= 1);
            }
        }
    }
}
