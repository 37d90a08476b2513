use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{KeyValueStore, StorageError};
use crate::lock::DirLock;

const LOCK_FILE: &str = ".lock";
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// One JSON document per key under a data directory.
///
/// Writes land in `<key>.json.tmp` and are renamed over `<key>.json`, so a
/// reader sees either the old or the new record, never a torn one. An
/// advisory lock on `<dir>/.lock` serializes writers across processes.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    lock_timeout: Duration,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document backing `key`.
    #[must_use]
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let _lock = DirLock::shared(&self.lock_path(), self.lock_timeout)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let _lock = DirLock::exclusive(&self.lock_path(), self.lock_timeout)?;

        let path = self.record_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;
        tracing::trace!(key, path = %path.display(), "record written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(());
        }
        let _lock = DirLock::exclusive(&self.lock_path(), self.lock_timeout)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Write {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn missing_record_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.read("favorites-store").unwrap().is_none());
    }

    #[test]
    fn write_then_read_round_trips_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        store.write("user-store", r#"{"isPremium":true}"#).unwrap();
        assert_eq!(
            store.read("user-store").unwrap().as_deref(),
            Some(r#"{"isPremium":true}"#)
        );
        assert!(!store.record_path("user-store").with_extension("json.tmp").exists());
    }

    #[test]
    fn overwrite_replaces_whole_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.write("k", "first value that is long").unwrap();
        store.write("k", "short").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("short"));
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.write("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.read("k").unwrap().is_none());
    }

    #[test]
    fn held_lock_times_out_writers() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).with_lock_timeout(Duration::from_millis(20));
        let _held =
            DirLock::exclusive(&dir.path().join(LOCK_FILE), Duration::from_millis(50))
                .unwrap();
        let err = store.write("k", "v").unwrap_err();
        assert_eq!(err.code(), ErrorCode::LockContention);
    }
}
