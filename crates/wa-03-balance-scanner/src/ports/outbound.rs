//! # Outbound Ports

pub use shared_types::EventSource;
pub use wa_01_cache_store::DocumentStore;
