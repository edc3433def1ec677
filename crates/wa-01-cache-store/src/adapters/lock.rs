//! # Data Directory Lock
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on
//! Windows). One run owns a data directory at a time; a second run against
//! the same caches fails fast instead of interleaving writes.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::CacheError;

/// Exclusive lock on a data directory, released on drop.
#[derive(Debug)]
pub struct DataDirLock {
    file: File,
    path: PathBuf,
}

impl DataDirLock {
    /// Lock file name.
    const LOCK_FILE: &'static str = "LOCK";

    /// Acquire the lock without waiting.
    ///
    /// # Errors
    ///
    /// `CacheError::Locked` if another process holds it.
    pub fn acquire(data_dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(data_dir).map_err(|e| CacheError::io(Self::LOCK_FILE, e))?;

        let path = data_dir.join(Self::LOCK_FILE);
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| CacheError::io(Self::LOCK_FILE, e))?;

        file.try_lock_exclusive().map_err(|_| CacheError::Locked {
            path: path.display().to_string(),
        })?;

        // Best effort: the PID is only informational.
        let _ = file.set_len(0);
        let _ = writeln!(file, "{}", std::process::id());

        tracing::debug!("[wa-01] acquired {}", path.display());
        Ok(Self { file, path })
    }

    /// Lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_lock_fails_until_first_is_dropped() {
        let dir = tempfile::tempdir().unwrap();

        let first = DataDirLock::acquire(dir.path()).unwrap();
        assert!(matches!(
            DataDirLock::acquire(dir.path()),
            Err(CacheError::Locked { .. })
        ));

        drop(first);
        assert!(DataDirLock::acquire(dir.path()).is_ok());
    }
}
