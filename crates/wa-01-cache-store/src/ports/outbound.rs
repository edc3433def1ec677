//! # Outbound Ports (Driven Ports)
//!
//! Raw document storage required by the cache store.

use crate::domain::CacheError;

/// Byte-level document storage.
///
/// Production: `JsonFileStore` (one file per document under a directory)
/// Testing: `MemoryStore`
pub trait DocumentStore: Send + Sync {
    /// Read a document, `None` if it has never been written.
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Replace a document. Either the whole new content becomes visible or the
    /// previous content stays in place.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), CacheError>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<T> {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).read(name)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), CacheError> {
        (**self).write(name, bytes)
    }
}
