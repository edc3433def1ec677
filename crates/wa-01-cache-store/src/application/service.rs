//! # Cache Store Service
//!
//! Typed load/save on top of a [`DocumentStore`].

use crate::domain::{CacheDocument, CacheError};
use crate::ports::DocumentStore;

/// Typed cache store.
#[derive(Debug, Clone)]
pub struct CacheStore<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> CacheStore<S> {
    /// Wrap a document store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Load a document.
    ///
    /// # Returns
    /// * `Ok(None)` - never written
    /// * `Err(CacheError::Corrupt)` - present but not a valid `D`
    pub fn load<D: CacheDocument>(&self) -> Result<Option<D>, CacheError> {
        let Some(bytes) = self.store.read(D::FILE_NAME)? else {
            return Ok(None);
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| CacheError::Corrupt {
                document: D::FILE_NAME.to_string(),
                reason: e.to_string(),
            })
    }

    /// Load a document, falling back to [`CacheDocument::empty`] when it is
    /// missing, unreadable or corrupt. Never fails.
    pub fn load_or_default<D: CacheDocument>(&self) -> D {
        match self.load::<D>() {
            Ok(Some(document)) => document,
            Ok(None) => {
                tracing::info!("[wa-01] no {} yet, starting empty", D::FILE_NAME);
                D::empty()
            }
            Err(e) => {
                tracing::warn!("[wa-01] {}; starting from an empty document", e);
                D::empty()
            }
        }
    }

    /// Serialize and persist a document, replacing any previous version.
    pub fn save<D: CacheDocument>(&self, document: &D) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec_pretty(document).map_err(|e| CacheError::Encode {
            document: D::FILE_NAME.to_string(),
            reason: e.to_string(),
        })?;
        self.store.write(D::FILE_NAME, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{JsonFileStore, MemoryStore};
    use serde::{Deserialize, Serialize};
    use serde_with::serde_as;
    use shared_types::{DecimalU256, U256};
    use std::collections::BTreeMap;

    #[serde_as]
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Ledger {
        last_block: i64,
        #[serde_as(as = "BTreeMap<_, DecimalU256>")]
        sums: BTreeMap<String, U256>,
        /// Same key name as a big-integer field elsewhere, but a plain string.
        amount: String,
    }

    impl CacheDocument for Ledger {
        const FILE_NAME: &'static str = "ledger.json";

        fn empty() -> Self {
            Self {
                last_block: -1,
                sums: BTreeMap::new(),
                amount: String::new(),
            }
        }
    }

    fn sample() -> Ledger {
        let huge = U256::from(u128::MAX) * U256::from(1_000u64);
        Ledger {
            last_block: 4_100_099,
            sums: BTreeMap::from([
                ("0xaa".to_string(), huge),
                ("0xbb".to_string(), U256::from(32u64)),
            ]),
            amount: "not a number".to_string(),
        }
    }

    #[test]
    fn test_save_then_load_reproduces_document() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(JsonFileStore::new(dir.path()));

        let ledger = sample();
        cache.save(&ledger).unwrap();
        let loaded: Ledger = cache.load().unwrap().unwrap();

        assert_eq!(loaded, ledger);
    }

    #[test]
    fn test_big_integers_are_written_as_decimal_strings() {
        let cache = CacheStore::new(MemoryStore::new());
        cache.save(&sample()).unwrap();

        let raw = cache.inner().raw("ledger.json").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["sums"]["0xbb"], "32");
        assert_eq!(value["lastBlock"], 4_100_099);
        assert_eq!(value["amount"], "not a number");
    }

    #[test]
    fn test_missing_document_loads_default() {
        let cache = CacheStore::new(MemoryStore::new());
        assert!(cache.load::<Ledger>().unwrap().is_none());
        assert_eq!(cache.load_or_default::<Ledger>(), Ledger::empty());
    }

    #[test]
    fn test_corrupt_document_loads_default() {
        let store = MemoryStore::new();
        store.insert_raw("ledger.json", "{\"lastBlock\": 12, \"sums\": {");
        let cache = CacheStore::new(store);

        assert!(matches!(
            cache.load::<Ledger>(),
            Err(CacheError::Corrupt { .. })
        ));
        assert_eq!(cache.load_or_default::<Ledger>(), Ledger::empty());
    }

    #[test]
    fn test_truncated_file_on_disk_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ledger.json"), b"{\"lastBl").unwrap();
        let cache = CacheStore::new(JsonFileStore::new(dir.path()));

        assert_eq!(cache.load_or_default::<Ledger>().last_block, -1);
    }
}
