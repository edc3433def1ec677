//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implementations of the [`DocumentStore`](crate::ports::DocumentStore) port.

mod json_file;
mod lock;
mod memory;

pub use json_file::JsonFileStore;
pub use lock::DataDirLock;
pub use memory::MemoryStore;
