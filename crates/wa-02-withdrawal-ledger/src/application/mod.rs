//! # Application Layer
//!
//! Service orchestrating the incremental sync.

pub mod service;

pub use service::WithdrawalLedgerService;
