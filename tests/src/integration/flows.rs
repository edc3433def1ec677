//! # Ledger → Reconciliation Flows
//!
//! The withdrawal ledger is synced into a JSON data directory, then the
//! reconciliation engine reads it back from disk and audits the claims.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_types::{EventSource, U256};
    use wa_01_cache_store::{CacheStore, JsonFileStore};
    use wa_02_withdrawal_ledger::{LedgerConfig, SyncCache, WithdrawalLedgerApi, WithdrawalLedgerService};
    use wa_04_reconciliation::{
        ReconciliationApi, ReconciliationConfig, ReconciliationLog, ReconciliationService,
        TransferLog,
    };

    use crate::integration::fixtures::{chain, ALICE, BOB, DEPOSIT};

    fn store(dir: &std::path::Path) -> CacheStore<JsonFileStore> {
        CacheStore::new(JsonFileStore::new(dir))
    }

    #[tokio::test]
    async fn test_synced_ledger_reconciles_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(chain());

        let mut ledger = WithdrawalLedgerService::new(
            LedgerConfig::default().with_chunk_size(7),
            Arc::clone(&source),
            store(dir.path()),
        );
        let report = ledger.sync().await.unwrap();
        assert_eq!(report.last_block, 30);
        assert_eq!(report.withdrawals_recorded, 6);

        let transfers = TransferLog::new(source.transfer_events(None, None).await.unwrap());
        store(dir.path()).save(&transfers).unwrap();

        // Everything below is read back from disk.
        let cache: SyncCache = store(dir.path()).load().unwrap().unwrap();
        let transfers: TransferLog = store(dir.path()).load().unwrap().unwrap();
        assert!(cache.verify_sums().is_ok());

        let mut engine = ReconciliationService::new(
            ReconciliationConfig::for_testing(DEPOSIT),
            store(dir.path()),
        );
        let summary = engine.audit(&cache, &transfers.events).unwrap();

        let alice = summary.reports.iter().find(|r| r.address == ALICE).unwrap();
        assert!(alice.is_clean());
        assert_eq!(alice.intervals.len(), 2);
        assert_eq!(alice.total_claimed, U256::from(350u64));

        let bob = summary.reports.iter().find(|r| r.address == BOB).unwrap();
        assert!(!bob.is_clean());
        // [2, 25] holds 70 + 90 + 110 = 270 against a claim of 200.
        assert_eq!(bob.intervals[0].withdrawals_accumulated, U256::from(270u64));
        assert_eq!(summary.discrepancy_count(), 1);

        let log: ReconciliationLog = store(dir.path()).load().unwrap().unwrap();
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn test_resync_from_disk_is_free_until_head_moves() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(chain());

        let mut first =
            WithdrawalLedgerService::new(LedgerConfig::for_testing(), Arc::clone(&source), store(dir.path()));
        first.sync_to(30).await.unwrap();
        let calls_after_first = source.block_calls();

        let mut second =
            WithdrawalLedgerService::new(LedgerConfig::for_testing(), Arc::clone(&source), store(dir.path()));
        let report = second.sync_to(30).await.unwrap();
        assert!(report.was_up_to_date());
        assert_eq!(source.block_calls(), calls_after_first);

        source.set_head(35);
        source.push_withdrawal(
            33,
            shared_types::Withdrawal {
                address: ALICE,
                amount: U256::from(5u64),
                index: U256::from(6u64),
            },
        );
        let report = second.sync().await.unwrap();
        assert_eq!(report.from_block, Some(31));
        assert_eq!(report.blocks_fetched, 5);
        assert_eq!(
            second.ledger(&ALICE).unwrap().sum,
            U256::from(355u64)
        );
    }

    #[tokio::test]
    async fn test_repeated_audits_keep_log_totals_stable() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(chain());

        let mut ledger =
            WithdrawalLedgerService::new(LedgerConfig::default(), Arc::clone(&source), store(dir.path()));
        ledger.sync().await.unwrap();
        let cache = ledger.into_cache();
        let transfers = source.transfer_events(None, None).await.unwrap();

        for _ in 0..2 {
            let mut engine = ReconciliationService::new(
                ReconciliationConfig::for_testing(DEPOSIT),
                store(dir.path()),
            );
            engine.audit(&cache, &transfers).unwrap();
        }

        let engine = ReconciliationService::new(
            ReconciliationConfig::for_testing(DEPOSIT),
            store(dir.path()),
        );
        assert_eq!(engine.log().len(), 3);
        let totals = engine.totals();
        assert_eq!(totals.claimed, U256::from(550u64));
        assert_eq!(totals.overclaimed(), None);
        assert_eq!(totals.unclaimed(), Some(U256::from(70u64)));
    }

    #[test]
    fn test_cache_documents_are_plain_json() {
        let dir = tempfile::tempdir().unwrap();
        let transfers = TransferLog::new(vec![crate::integration::fixtures::claim(9, ALICE, 500)]);
        store(dir.path()).save(&transfers).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("transfers.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["value"], "500");
        assert_eq!(json[0]["to"], ALICE.to_string());
    }
}
