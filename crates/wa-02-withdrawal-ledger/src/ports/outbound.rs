//! # Outbound Ports
//!
//! The ledger depends on a chain source and a document store, both defined
//! by sibling crates.

pub use shared_types::EventSource;
pub use wa_01_cache_store::DocumentStore;
