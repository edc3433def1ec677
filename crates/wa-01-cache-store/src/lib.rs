//! # WA-01 Typed Cache Store
//!
//! Persists the audit's working documents as JSON and hands them back as
//! typed values.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! Every document the other subsystems keep between runs (withdrawal ledger,
//! transfer log, balance snapshot, reconciliation log) goes through here:
//!
//! - Each document is a Rust type with an explicit serde schema; big integers
//!   are declared per field, never guessed from a key name.
//! - Loading a missing or unparseable document yields its empty value, since
//!   "no cache yet" is the normal first-run state.
//! - Writes go to a temp file that is synced and renamed over the target, so a
//!   crash mid-write never leaves a truncated document behind.
//!
//! ## Module Structure
//!
//! ```text
//! wa-01-cache-store/
//! ├── domain/          # CacheDocument trait, CacheError
//! ├── ports/           # DocumentStore (outbound, raw bytes by name)
//! ├── adapters/        # JsonFileStore, MemoryStore, DataDirLock
//! └── application/     # CacheStore: typed load / load_or_default / save
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{DataDirLock, JsonFileStore, MemoryStore};
pub use application::CacheStore;
pub use domain::{CacheDocument, CacheError};
pub use ports::DocumentStore;
