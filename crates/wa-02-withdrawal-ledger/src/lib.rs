//! # WA-02 Incremental Withdrawal Ledger
//!
//! Per-address ledger of consensus-layer withdrawals, synced chunk by chunk
//! from the chain and resumable from the last persisted chunk.
//!
//! **Subsystem ID:** 02
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Keep, per lowercase address, a running `sum` and the ordered list of
//!   withdrawal details that make it up.
//! - Never re-scan a block at or below the `lastBlock` cursor.
//! - Persist after every chunk, so a crash loses at most one chunk of work.
//!
//! ## Invariants
//!
//! | Invariant | Enforced by |
//! |-----------|-------------|
//! | `sum == Σ details.amount` | `AddressLedger::record` / `invariant_sum_matches` |
//! | `lastBlock` never decreases | `SyncCache::advance_to` |
//! | No partial chunk marked synced | fetch-all-then-apply in `WithdrawalLedgerService` |
//!
//! ## Module Structure
//!
//! ```text
//! wa-02-withdrawal-ledger/
//! ├── domain/          # SyncCache, AddressLedger, SyncReport, errors, invariants
//! ├── algorithms/      # Chunk planning
//! ├── ports/           # WithdrawalLedgerApi (inbound) + EventSource/DocumentStore (outbound)
//! ├── application/     # WithdrawalLedgerService
//! └── config.rs        # LedgerConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use algorithms::{next_chunk, plan_chunks};
pub use application::WithdrawalLedgerService;
pub use config::LedgerConfig;
pub use domain::{
    invariant_cursor_monotonic, invariant_sum_matches, AddressLedger, ChunkRange, LedgerError,
    SyncCache, SyncReport, DEFAULT_CHUNK_SIZE,
};
pub use ports::WithdrawalLedgerApi;
