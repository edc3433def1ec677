//! # WA-03 Concurrent Batch Balance Scanner
//!
//! Builds an index of token holders and their current balances by walking
//! the chain in batches, each batch split across a small pool of worker
//! tasks.
//!
//! **Subsystem ID:** 03
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Run state machine
//!
//! ```text
//! Init ─┬─> LoadCheckpoint ─┐
//!       └─> ColdStart ──────┴─> [ RunWorkers -> Merge -> Persist ]* -> Done
//!                                   │ (retry ceiling hit)
//!                                   └─> Failed
//! ```
//!
//! ## Guarantees
//!
//! - Workers only read the holder set as it stood when their batch started
//!   and return owned partial maps. Only the coordinator writes the
//!   accumulated map.
//! - Merge is insert-if-absent in ascending worker index, so the lowest
//!   worker wins a tie and completion order never matters.
//! - `balances.json` is replaced after every successful batch. A batch that
//!   exhausts its retries leaves the previous snapshot on disk untouched.
//!
//! ## Module Structure
//!
//! ```text
//! wa-03-balance-scanner/
//! ├── domain/          # BalanceSnapshot, PartialBalances, BlockRange, ScanPhase, errors
//! ├── algorithms/      # Batch planning, range splitting, merge, retry policy
//! ├── ports/           # BalanceScannerApi (inbound) + EventSource/DocumentStore (outbound)
//! ├── application/     # BalanceScannerService
//! └── config.rs        # ScannerConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use algorithms::{merge_first_seen, plan_batches, split_range, RetryExhausted, RetryPolicy};
pub use application::BalanceScannerService;
pub use config::ScannerConfig;
pub use domain::{
    BalanceSnapshot, BatchFailure, BlockRange, PartialBalances, ScanError, ScanPhase, ScanReport,
    DEFAULT_ACTIVATION_BLOCK, DEFAULT_BATCH_SIZE, DEFAULT_WORKER_COUNT,
};
pub use ports::BalanceScannerApi;
