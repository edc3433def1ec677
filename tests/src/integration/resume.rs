//! # Restart Behaviour
//!
//! Interrupted runs must leave the data directory at the last completed
//! chunk or batch, and the next run must continue from there.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_types::U256;
    use wa_01_cache_store::{CacheStore, DataDirLock, JsonFileStore};
    use wa_02_withdrawal_ledger::{
        LedgerConfig, LedgerError, SyncCache, WithdrawalLedgerApi, WithdrawalLedgerService,
    };
    use wa_03_balance_scanner::{
        BalanceScannerApi, BalanceScannerService, BalanceSnapshot, ScanError, ScanPhase,
        ScannerConfig,
    };

    use crate::integration::fixtures::{chain, ALICE, BOB, DEPOSIT};

    fn store(dir: &std::path::Path) -> CacheStore<JsonFileStore> {
        CacheStore::new(JsonFileStore::new(dir))
    }

    #[tokio::test]
    async fn test_ledger_failure_keeps_last_completed_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(chain());
        source.fail_block(14);

        let mut ledger =
            WithdrawalLedgerService::new(LedgerConfig::for_testing(), Arc::clone(&source), store(dir.path()));
        let err = ledger.sync_to(30).await.unwrap_err();
        assert!(matches!(err, LedgerError::Source(_)));

        let on_disk: SyncCache = store(dir.path()).load().unwrap().unwrap();
        assert_eq!(on_disk.last_block, 9);
        assert!(on_disk.ledger(&ALICE).is_some());

        source.clear_failures();
        let mut restarted =
            WithdrawalLedgerService::new(LedgerConfig::for_testing(), Arc::clone(&source), store(dir.path()));
        let report = restarted.sync_to(30).await.unwrap();
        assert_eq!(report.from_block, Some(10));
        assert_eq!(restarted.last_block(), 30);
        assert_eq!(restarted.ledger(&BOB).unwrap().sum, U256::from(270u64));
    }

    #[tokio::test]
    async fn test_scanner_resumes_after_exhausted_retries() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(chain());
        source.fail_block(15);

        let mut scanner =
            BalanceScannerService::new(ScannerConfig::for_testing(), Arc::clone(&source), store(dir.path()));
        let err = scanner.scan_to(25).await.unwrap_err();
        match err {
            ScanError::RetriesExhausted {
                batch_start,
                attempts,
                checkpoint,
                ..
            } => {
                assert_eq!(batch_start, 10);
                assert_eq!(attempts, 6);
                assert_eq!(checkpoint, Some(9));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(scanner.phase(), ScanPhase::Failed);

        let snapshot: BalanceSnapshot = store(dir.path()).load().unwrap().unwrap();
        assert_eq!(snapshot.last_block_synced, 9);

        source.clear_failures();
        let transfer_calls = source.transfer_calls();
        let mut restarted =
            BalanceScannerService::new(ScannerConfig::for_testing(), Arc::clone(&source), store(dir.path()));
        let report = restarted.scan_to(25).await.unwrap();

        // Resumed from the checkpoint, so no second seeding pass.
        assert_eq!(source.transfer_calls(), transfer_calls);
        assert_eq!(report.start_block, 10);
        assert_eq!(report.last_block_synced, Some(25));
        assert_eq!(restarted.balances().get(&BOB), Some(&U256::from(200u64)));
        assert!(restarted.balances().contains_key(&DEPOSIT));
    }

    #[tokio::test]
    async fn test_scanner_and_ledger_share_a_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(chain());

        let mut ledger =
            WithdrawalLedgerService::new(LedgerConfig::default(), Arc::clone(&source), store(dir.path()));
        let mut scanner =
            BalanceScannerService::new(ScannerConfig::for_testing(), Arc::clone(&source), store(dir.path()));
        ledger.sync().await.unwrap();
        scanner.scan().await.unwrap();

        assert!(dir.path().join("withdrawals.json").exists());
        assert!(dir.path().join("balances.json").exists());

        let raw = std::fs::read_to_string(dir.path().join("balances.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["lastBlockSynced"], 30);
        assert_eq!(json["balances"][ALICE.to_string()], "350");
    }

    #[test]
    fn test_data_dir_lock_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let held = DataDirLock::acquire(dir.path()).unwrap();
        assert!(DataDirLock::acquire(dir.path()).is_err());
        drop(held);
        assert!(DataDirLock::acquire(dir.path()).is_ok());
    }
}
