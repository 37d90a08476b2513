//! Advisory lock on the data directory.
//!
//! Two `zen` processes can run at once (a shell session and a reminder
//! refresh, say). Readers take the lock shared, writers exclusive; the
//! lock is released when the guard drops.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::ErrorCode;

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("{}: data directory busy for {waited:?} ({})", ErrorCode::LockContention.code(), path.display())]
    Timeout { path: PathBuf, waited: Duration },
    #[error("{}: cannot open lock file: {}", ErrorCode::PersistenceWrite.code(), .0)]
    Io(#[from] io::Error),
}

impl LockError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::LockContention,
            Self::Io(_) => ErrorCode::PersistenceWrite,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Shared,
    Exclusive,
}

/// Held advisory lock; dropping it unlocks.
#[derive(Debug)]
pub struct DirLock {
    file: File,
    path: PathBuf,
    access: Access,
}

impl DirLock {
    /// Lock for reading a record.
    ///
    /// # Errors
    ///
    /// [`LockError::Timeout`] if a writer holds the lock past `timeout`.
    pub fn shared(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        Self::acquire(path, timeout, Access::Shared)
    }

    /// Lock for replacing or removing a record.
    ///
    /// # Errors
    ///
    /// [`LockError::Timeout`] if anyone holds the lock past `timeout`.
    pub fn exclusive(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        Self::acquire(path, timeout, Access::Exclusive)
    }

    fn acquire(path: &Path, timeout: Duration, access: Access) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let started = Instant::now();
        while !try_lock(&file, access) {
            let waited = started.elapsed();
            if waited >= timeout {
                tracing::debug!(path = %path.display(), ?access, ?waited, "lock timed out");
                return Err(LockError::Timeout {
                    path: path.to_path_buf(),
                    waited,
                });
            }
            thread::sleep(RETRY_INTERVAL);
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            access,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn access(&self) -> Access {
        self.access
    }
}

fn try_lock(file: &File, access: Access) -> bool {
    match access {
        Access::Shared => FileExt::try_lock_shared(file).is_ok(),
        Access::Exclusive => FileExt::try_lock_exclusive(file).is_ok(),
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
