//! # WA-04 Interval Reconciliation Engine
//!
//! Checks that every claim paid out by the deposit contract equals the
//! withdrawals its recipient accrued since the previous claim, converted to
//! token units by an exact rational scale.
//!
//! **Subsystem ID:** 04
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Algorithm
//!
//! For one address, with claims `c[0..n]` and withdrawal details both sorted
//! by block, window `i` covers `[c[i].block, c[i+1].block - 1]` and is
//! compared against `c[i+1].value`. A single cursor walks the details once
//! across all windows; it is threaded through a fold, never rewound.
//!
//! ```text
//! claims:    c0 ─────────── c1 ─────────── c2
//! details:  d d │ d  d   d  │ d      d    │ d
//!           ^^^   window 0     window 1     pending
//!           unattributed
//! ```
//!
//! Mismatches are findings, not errors: they become `ClaimInterval` records
//! with `match: false` and the run completes.
//!
//! ## Module Structure
//!
//! ```text
//! wa-04-reconciliation/
//! ├── domain/          # Scale, ClaimInterval, AddressReport, AuditSummary, logs, errors
//! ├── algorithms/      # Interval fold, claim grouping
//! ├── ports/           # ReconciliationApi (inbound) + DocumentStore (outbound)
//! ├── application/     # ReconciliationService
//! └── config.rs        # ReconciliationConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use algorithms::{claims_by_recipient, reconcile, Reconciliation};
pub use application::ReconciliationService;
pub use config::ReconciliationConfig;
pub use domain::{
    AddressReport, AttributionGap, AuditSummary, ClaimInterval, LogTotals, ReconciliationError,
    ReconciliationLog, Scale, TransferLog, DEFAULT_TYPICAL_WITHDRAWAL,
};
pub use ports::ReconciliationApi;
