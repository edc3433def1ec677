//! In-memory document store for tests.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::CacheError;
use crate::ports::DocumentStore;

/// Document store backed by a map. Counts writes per document.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Vec<u8>>>,
    writes: RwLock<HashMap<String, usize>>,
    total_writes: AtomicUsize,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document with raw bytes (e.g. to simulate corruption).
    pub fn insert_raw(&self, name: &str, bytes: impl Into<Vec<u8>>) {
        self.documents.write().insert(name.to_string(), bytes.into());
    }

    /// Raw bytes of a document.
    pub fn raw(&self, name: &str) -> Option<Vec<u8>> {
        self.documents.read().get(name).cloned()
    }

    /// Number of writes to `name`.
    pub fn writes_to(&self, name: &str) -> usize {
        self.writes.read().get(name).copied().unwrap_or(0)
    }

    /// Number of writes across all documents.
    pub fn total_writes(&self) -> usize {
        self.total_writes.load(Ordering::SeqCst)
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.raw(name))
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.documents.write().insert(name.to_string(), bytes.to_vec());
        *self.writes.write().entry(name.to_string()).or_insert(0) += 1;
        self.total_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
