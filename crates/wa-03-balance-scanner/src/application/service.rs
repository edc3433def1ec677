//! # Balance Scanner Service
//!
//! Coordinates batches, spawns one task per worker sub-range, merges their
//! owned results and checkpoints after every batch.

use async_trait::async_trait;
use futures::future::join_all;
use shared_types::{Address, BlockNumber, EventSource, U256};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use wa_01_cache_store::{CacheError, CacheStore, DocumentStore};

use crate::algorithms::{merge_first_seen, plan_batches, split_range};
use crate::config::ScannerConfig;
use crate::domain::{
    invariant_checkpoint_advances, BalanceSnapshot, BatchFailure, BlockRange, PartialBalances,
    ScanError, ScanPhase, ScanReport,
};
use crate::ports::BalanceScannerApi;

/// Balance Scanner Service - sole writer of the holder snapshot during a run.
pub struct BalanceScannerService<E: EventSource, S: DocumentStore> {
    /// Configuration.
    config: ScannerConfig,
    /// Chain source, shared with worker tasks.
    source: Arc<E>,
    /// Where the snapshot is persisted.
    store: CacheStore<S>,
    /// Accumulated holder map. Written only by the coordinator.
    balances: BTreeMap<Address, U256>,
    /// Last persisted `lastBlockSynced`.
    checkpoint: Option<BlockNumber>,
    /// Current run phase.
    phase: ScanPhase,
}

impl<E: EventSource + 'static, S: DocumentStore> BalanceScannerService<E, S> {
    /// Create the service. Nothing is loaded until a scan starts.
    pub fn new(config: ScannerConfig, source: Arc<E>, store: CacheStore<S>) -> Self {
        Self {
            config,
            source,
            store,
            balances: BTreeMap::new(),
            checkpoint: None,
            phase: ScanPhase::Init,
        }
    }

    fn validate(&self) -> Result<(), ScanError> {
        if self.config.batch_size == 0 {
            return Err(ScanError::InvalidConfig {
                field: "batch_size",
                reason: "must be positive",
            });
        }
        if self.config.worker_count == 0 {
            return Err(ScanError::InvalidConfig {
                field: "worker_count",
                reason: "must be positive",
            });
        }
        Ok(())
    }

    fn enter(&mut self, phase: ScanPhase) {
        tracing::debug!("[wa-03] phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Resume from `balances.json` or cold start. Returns the first block to
    /// scan.
    async fn prepare(&mut self, head: BlockNumber) -> Result<BlockNumber, ScanError> {
        match self.store.load::<BalanceSnapshot>() {
            Ok(Some(snapshot)) => {
                self.enter(ScanPhase::LoadCheckpoint);
                tracing::info!(
                    "[wa-03] resuming from lastBlockSynced={} with {} holders",
                    snapshot.last_block_synced,
                    snapshot.holder_count()
                );
                self.checkpoint = Some(snapshot.last_block_synced);
                self.balances = snapshot.balances;
                return Ok(snapshot.last_block_synced.saturating_add(1));
            }
            Ok(None) => {}
            Err(e @ CacheError::Corrupt { .. }) => {
                tracing::warn!("[wa-03] ignoring unreadable snapshot: {}", e);
            }
            Err(e) => return Err(e.into()),
        }

        self.enter(ScanPhase::ColdStart);
        self.checkpoint = None;
        self.balances.clear();
        if self.config.seed_from_transfers {
            self.seed_from_transfers(head).await?;
        }
        Ok(self.config.activation_block)
    }

    /// Record every sender and recipient of historical transfers, querying
    /// each newly seen address once.
    async fn seed_from_transfers(&mut self, head: BlockNumber) -> Result<(), ScanError> {
        let events = self.source.transfer_events(Some(0), Some(head)).await?;
        tracing::info!("[wa-03] seeding holders from {} transfer events", events.len());

        for event in &events {
            for holder in [event.from, event.to] {
                if self.balances.contains_key(&holder) {
                    continue;
                }
                let balance = self.source.balance_of(&holder).await?;
                tracing::debug!("[wa-03] new holder {}", holder);
                self.balances.insert(holder, balance);
            }
        }

        tracing::info!("[wa-03] {} holders after seeding", self.balances.len());
        Ok(())
    }

    /// One attempt at a batch: spawn a worker per sub-range and collect every
    /// partial. Any worker failure fails the attempt.
    async fn run_workers(
        &self,
        batch: BlockRange,
        known: &Arc<BTreeSet<Address>>,
        attempt: u32,
    ) -> Result<Vec<PartialBalances>, BatchFailure> {
        tracing::info!("[wa-03] processing blocks {} (attempt {})", batch, attempt);

        let handles: Vec<_> = split_range(batch, self.config.worker_count)
            .into_iter()
            .enumerate()
            .map(|(worker, range)| {
                tokio::spawn(scan_sub_range(
                    worker,
                    range,
                    Arc::clone(&self.source),
                    Arc::clone(known),
                ))
            })
            .collect();

        let mut partials = Vec::with_capacity(handles.len());
        for (worker, joined) in join_all(handles).await.into_iter().enumerate() {
            let partial = joined.map_err(|e| BatchFailure::WorkerAborted {
                worker,
                reason: e.to_string(),
            })??;
            partials.push(partial);
        }
        Ok(partials)
    }

    /// Merge and persist a completed batch.
    fn commit_batch(
        &mut self,
        batch: BlockRange,
        partials: Vec<PartialBalances>,
    ) -> Result<(), ScanError> {
        let Some(last) = batch.last() else {
            return Ok(());
        };

        self.enter(ScanPhase::Merge);
        let added = merge_first_seen(&mut self.balances, partials);

        self.enter(ScanPhase::Persist);
        debug_assert!(invariant_checkpoint_advances(self.checkpoint, last));
        let snapshot = BalanceSnapshot::now(last, self.balances.clone());
        self.store.save(&snapshot)?;
        self.checkpoint = Some(last);

        tracing::info!(
            "[wa-03] batch {} persisted: {} new holders, {} total",
            batch,
            added,
            self.balances.len()
        );
        Ok(())
    }
}

/// Worker body: walk `range`, query the balance of every withdrawal
/// recipient not already known, and return what was found.
async fn scan_sub_range<E: EventSource>(
    worker: usize,
    range: BlockRange,
    source: Arc<E>,
    known: Arc<BTreeSet<Address>>,
) -> Result<PartialBalances, BatchFailure> {
    let mut partial = PartialBalances::new(worker);

    for number in range.blocks() {
        let block = source
            .get_block(number)
            .await?
            .ok_or(BatchFailure::MissingBlock { number })?;

        for withdrawal in &block.withdrawals {
            let address = withdrawal.address;
            if known.contains(&address) || partial.contains(&address) {
                continue;
            }
            let balance = source.balance_of(&address).await?;
            tracing::debug!("[wa-03] worker {}: new holder {}", worker, address);
            partial.balances.insert(address, balance);
        }
    }

    Ok(partial)
}

#[async_trait]
impl<E: EventSource + 'static, S: DocumentStore + 'static> BalanceScannerApi
    for BalanceScannerService<E, S>
{
    async fn scan(&mut self) -> Result<ScanReport, ScanError> {
        self.validate()?;
        let head = self.source.block_number().await?;
        self.scan_to(head).await
    }

    async fn scan_to(&mut self, head: BlockNumber) -> Result<ScanReport, ScanError> {
        self.validate()?;
        self.phase = ScanPhase::Init;

        let start = self.prepare(head).await?;
        let end = head.saturating_add(1);
        let batches = plan_batches(start, end, self.config.batch_size);
        tracing::info!(
            "[wa-03] scanning [{}, {}] in {} batches of {} blocks, {} workers",
            start,
            head,
            batches.len(),
            self.config.batch_size,
            self.config.worker_count
        );

        let mut report = ScanReport {
            start_block: start,
            ..Default::default()
        };

        for batch in batches {
            self.enter(ScanPhase::RunWorkers);
            let known = Arc::new(self.balances.keys().copied().collect::<BTreeSet<_>>());

            let outcome = {
                let this = &*self;
                let known = &known;
                this.config
                    .retry
                    .run(move |attempt| this.run_workers(batch, known, attempt))
                    .await
            };

            let partials = match outcome {
                Ok(partials) => partials,
                Err(exhausted) => {
                    self.enter(ScanPhase::Failed);
                    tracing::error!(
                        "[wa-03] batch {} failed permanently; last checkpoint {:?}",
                        batch,
                        self.checkpoint
                    );
                    return Err(ScanError::RetriesExhausted {
                        batch_start: batch.start,
                        batch_end: batch.end,
                        attempts: exhausted.attempts,
                        checkpoint: self.checkpoint,
                        source: exhausted.last_error,
                    });
                }
            };

            self.commit_batch(batch, partials)?;
            report.batches += 1;
        }

        self.enter(ScanPhase::Done);
        report.last_block_synced = self.checkpoint;
        report.holders = self.balances.len();
        tracing::info!(
            "[wa-03] scan complete: {} batches, {} holders, lastBlockSynced={:?}",
            report.batches,
            report.holders,
            report.last_block_synced
        );
        Ok(report)
    }

    fn balances(&self) -> &BTreeMap<Address, U256> {
        &self.balances
    }

    fn checkpoint(&self) -> Option<BlockNumber> {
        self.checkpoint
    }

    fn phase(&self) -> ScanPhase {
        self.phase
    }
}
