//! # Withdrawal Ledger Service
//!
//! Drives chunked, resumable sync of the withdrawal cache.

use async_trait::async_trait;
use futures::future::try_join_all;
use shared_types::{Address, BlockNumber, BlockWithdrawals, EventSource};
use std::sync::Arc;
use wa_01_cache_store::{CacheStore, DocumentStore};

use crate::algorithms::next_chunk;
use crate::config::LedgerConfig;
use crate::domain::{AddressLedger, ChunkRange, LedgerError, SyncCache, SyncReport};
use crate::ports::WithdrawalLedgerApi;

/// Withdrawal Ledger Service - sole writer of the sync cache during a run.
pub struct WithdrawalLedgerService<E: EventSource, S: DocumentStore> {
    /// Configuration.
    config: LedgerConfig,
    /// Chain source.
    source: Arc<E>,
    /// Where the cache is persisted.
    store: CacheStore<S>,
    /// Working copy of the cache.
    cache: SyncCache,
}

impl<E: EventSource, S: DocumentStore> WithdrawalLedgerService<E, S> {
    /// Create the service, loading the persisted cache or starting fresh.
    pub fn new(config: LedgerConfig, source: Arc<E>, store: CacheStore<S>) -> Self {
        let cache: SyncCache = store.load_or_default();
        tracing::info!(
            "[wa-02] loaded withdrawal cache: lastBlock={}, {} addresses",
            cache.last_block,
            cache.address_count()
        );
        Self::with_cache(config, source, store, cache)
    }

    /// Create the service around an already loaded cache.
    pub fn with_cache(
        config: LedgerConfig,
        source: Arc<E>,
        store: CacheStore<S>,
        cache: SyncCache,
    ) -> Self {
        Self {
            config,
            source,
            store,
            cache,
        }
    }

    /// Give up the working cache.
    pub fn into_cache(self) -> SyncCache {
        self.cache
    }

    /// Fetch every block of `chunk` concurrently. Either all blocks come
    /// back, in ascending order, or the first error does.
    async fn fetch_chunk(
        &self,
        chunk: ChunkRange,
        head: BlockNumber,
    ) -> Result<Vec<BlockWithdrawals>, LedgerError> {
        let source = &self.source;
        let requests = chunk.blocks().map(|number| async move {
            source
                .get_block(number)
                .await?
                .ok_or(LedgerError::MissingBlock { number, head })
        });
        try_join_all(requests).await
    }

    /// Fetch, apply and persist one chunk.
    async fn process_chunk(
        &mut self,
        chunk: ChunkRange,
        head: BlockNumber,
        report: &mut SyncReport,
    ) -> Result<(), LedgerError> {
        tracing::info!("[wa-02] processing blocks {} to {}", chunk.from, chunk.to);

        let blocks = match self.fetch_chunk(chunk, head).await {
            Ok(blocks) => blocks,
            Err(e) => {
                tracing::error!(
                    "[wa-02] chunk {}-{} aborted, cursor stays at {}: {}",
                    chunk.from,
                    chunk.to,
                    self.cache.last_block,
                    e
                );
                return Err(e);
            }
        };

        let recorded = self.cache.apply_blocks(&blocks)?;

        self.cache.advance_to(chunk.to)?;
        self.store.save(&self.cache)?;

        report.chunks += 1;
        report.blocks_fetched += chunk.len();
        report.withdrawals_recorded += recorded as u64;
        report.last_block = self.cache.last_block;

        tracing::debug!(
            "[wa-02] chunk {}-{} persisted: {} withdrawals",
            chunk.from,
            chunk.to,
            recorded
        );
        Ok(())
    }
}

#[async_trait]
impl<E: EventSource + 'static, S: DocumentStore + 'static> WithdrawalLedgerApi
    for WithdrawalLedgerService<E, S>
{
    async fn sync(&mut self) -> Result<SyncReport, LedgerError> {
        let head = self.source.block_number().await?;
        self.sync_to(head).await
    }

    async fn sync_to(&mut self, head: BlockNumber) -> Result<SyncReport, LedgerError> {
        let chunk_size = self.config.chunk_size;
        if chunk_size == 0 {
            return Err(LedgerError::InvalidChunkSize(chunk_size));
        }

        let mut report = SyncReport {
            head,
            last_block: self.cache.last_block,
            ..Default::default()
        };

        if self.cache.is_synced_to(head) {
            tracing::info!(
                "[wa-02] already synced: lastBlock={} head={}",
                self.cache.last_block,
                head
            );
            return Ok(report);
        }

        report.from_block = Some(self.cache.next_block());

        while let Some(chunk) = next_chunk(self.cache.last_block, head, chunk_size) {
            self.process_chunk(chunk, head, &mut report).await?;
        }

        tracing::info!(
            "[wa-02] synced to block {}: {} chunks, {} withdrawals, {} addresses",
            report.last_block,
            report.chunks,
            report.withdrawals_recorded,
            self.cache.address_count()
        );
        Ok(report)
    }

    fn cache(&self) -> &SyncCache {
        &self.cache
    }

    fn ledger(&self, address: &Address) -> Option<&AddressLedger> {
        self.cache.ledger(address)
    }

    fn last_block(&self) -> i64 {
        self.cache.last_block
    }
}
