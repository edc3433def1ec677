//! # Outbound Ports
//!
//! Reconciliation only persists its log; it never calls the chain.

pub use wa_01_cache_store::DocumentStore;
