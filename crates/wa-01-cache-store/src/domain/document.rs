//! # Cache Documents
//!
//! A cache document is any serde type that knows its file name and its
//! empty (first-run) value.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A document persisted by the cache store.
pub trait CacheDocument: Serialize + DeserializeOwned + Send + Sync {
    /// File name relative to the data directory, e.g. `withdrawals.json`.
    const FILE_NAME: &'static str;

    /// Value used when no readable document exists yet.
    fn empty() -> Self;
}
