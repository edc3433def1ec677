//! # Chunk Planning
//!
//! Splits the unsynced tail `(lastBlock, head]` into fixed-size windows.

use shared_types::BlockNumber;

use crate::domain::ChunkRange;

/// Next window to sync: `[lastBlock + 1, min(lastBlock + chunk_size, head)]`.
///
/// Returns `None` when `head` is already processed or `chunk_size` is zero.
pub fn next_chunk(last_block: i64, head: BlockNumber, chunk_size: u64) -> Option<ChunkRange> {
    if chunk_size == 0 {
        return None;
    }

    let from = u64::try_from(last_block.saturating_add(1)).unwrap_or(0);
    if from > head {
        return None;
    }

    let to = from.saturating_add(chunk_size - 1).min(head);
    Some(ChunkRange::new(from, to))
}

/// Every window from `lastBlock + 1` up to and including `head`.
pub fn plan_chunks(last_block: i64, head: BlockNumber, chunk_size: u64) -> Vec<ChunkRange> {
    let mut chunks = Vec::new();
    let mut cursor = last_block;
    while let Some(chunk) = next_chunk(cursor, head, chunk_size) {
        chunks.push(chunk);
        // The cursor cannot move past i64::MAX; nothing beyond it is planned.
        match i64::try_from(chunk.to) {
            Ok(to) => cursor = to,
            Err(_) => break,
        }
    }
    chunks
}
