//! # Claim Grouping
//!
//! Picks the claims out of the full transfer log.

use shared_types::{Address, BlockNumber, TransferEvent};
use std::collections::BTreeMap;

/// Transfers sent by `claim_source`, at or after `claims_start_block` when
/// given, grouped by recipient and stably sorted by block.
pub fn claims_by_recipient(
    transfers: &[TransferEvent],
    claim_source: &Address,
    claims_start_block: Option<BlockNumber>,
) -> BTreeMap<Address, Vec<TransferEvent>> {
    let floor = claims_start_block.unwrap_or(0);

    let mut grouped: BTreeMap<Address, Vec<TransferEvent>> = BTreeMap::new();
    for transfer in transfers
        .iter()
        .filter(|t| t.from == *claim_source && t.block >= floor)
    {
        grouped.entry(transfer.to).or_default().push(transfer.clone());
    }

    for claims in grouped.values_mut() {
        claims.sort_by_key(|c| c.block);
    }
    grouped
}
