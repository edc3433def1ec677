//! File-backed document store.
//!
//! One file per document under a data directory. Writes go through
//! `<name>.tmp` + `sync_all` + rename.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::CacheError;
use crate::ports::DocumentStore;

/// Directory-rooted document store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a document.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl DocumentStore for JsonFileStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match std::fs::read(self.path_of(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(name, e)),
        }
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.root).map_err(|e| CacheError::io(name, e))?;

        let path = self.path_of(name);
        let temp_path = path.with_extension("tmp");

        let mut file = std::fs::File::create(&temp_path).map_err(|e| CacheError::io(name, e))?;
        file.write_all(bytes).map_err(|e| CacheError::io(name, e))?;
        file.sync_all().map_err(|e| CacheError::io(name, e))?;
        drop(file);

        std::fs::rename(&temp_path, &path).map_err(|e| CacheError::io(name, e))?;

        tracing::debug!("[wa-01] wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}
