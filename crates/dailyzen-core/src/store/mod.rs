//! Namespaced key-value persistence.
//!
//! Each store owns exactly one record (`favorites-store`, `user-store`,
//! `reminder-store`). A record is read once at hydration and replaced
//! wholesale on every change; there are no partial updates.
//!
//! Writes are layered: a [`KeyValueStore`] does the actual I/O, and a
//! [`RecordWriter`] decides when. [`WriteBehind`] hands every write to a
//! background worker so callers never wait on disk; [`SyncWriter`] writes
//! inline. Both log failures and move on.

mod file;
mod write_behind;

pub use file::FileStore;
pub use write_behind::{WriteBehind, WriteStats};

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ErrorCode;
use crate::lock::LockError;

/// Record key for the favorites set.
pub const FAVORITES_KEY: &str = "favorites-store";
/// Record key for the premium entitlement.
pub const USER_KEY: &str = "user-store";
/// Record key for the locally scheduled reminder.
pub const REMINDER_KEY: &str = "reminder-store";

/// Persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{}: failed to read '{key}': {source}", ErrorCode::PersistenceRead.code())]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("{}: failed to write '{key}': {source}", ErrorCode::PersistenceWrite.code())]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("{}: record '{key}' is malformed: {source}", ErrorCode::PersistenceRead.code())]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{}: record '{key}' could not be encoded: {source}", ErrorCode::PersistenceWrite.code())]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Lock(#[from] LockError),
}

impl StorageError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Decode { .. } => ErrorCode::PersistenceRead,
            Self::Write { .. } | Self::Encode { .. } => ErrorCode::PersistenceWrite,
            Self::Lock(err) => err.code(),
        }
    }
}

/// Durable string records addressed by key.
pub trait KeyValueStore: Send + Sync {
    /// Read a record; `Ok(None)` when it was never written.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a record.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a record; deleting a missing record is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Where mutated records go after the in-memory change.
pub trait RecordWriter: Send + Sync {
    /// Queue the latest value of a record. Never fails; failures are logged.
    fn submit(&self, key: &str, value: String);
}

/// Decode a JSON record.
///
/// # Errors
///
/// Returns a read error from the backing store, or [`StorageError::Decode`]
/// when the stored text is not a valid record.
pub fn load_record<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Decode {
            key: key.to_string(),
            source,
        })
}

/// How a store's in-memory state was initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Hydration {
    /// Loaded from a stored record.
    Stored,
    /// No record existed yet (first run).
    Fresh,
    /// The record could not be read or decoded; defaults are in use.
    Defaulted,
}

/// Startup read of a record. Failures degrade to `None` with a warning.
pub fn hydrate_record<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> (Option<T>, Hydration) {
    match load_record(store, key) {
        Ok(Some(record)) => (Some(record), Hydration::Stored),
        Ok(None) => (None, Hydration::Fresh),
        Err(err) => {
            tracing::warn!(key, code = %err.code(), error = %err, "hydration failed; using defaults");
            (None, Hydration::Defaulted)
        }
    }
}

/// Encode a record and hand it to the writer.
pub fn submit_record<T: Serialize>(writer: &dyn RecordWriter, key: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(raw) => writer.submit(key, raw),
        Err(source) => {
            let err = StorageError::Encode {
                key: key.to_string(),
                source,
            };
            tracing::warn!(error = %err, "record not persisted");
        }
    }
}

/// Writes inline on the caller's thread, logging failures.
pub struct SyncWriter {
    store: Arc<dyn KeyValueStore>,
}

impl SyncWriter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl RecordWriter for SyncWriter {
    fn submit(&self, key: &str, value: String) {
        if let Err(err) = self.store.write(key, &value) {
            tracing::warn!(key, error = %err, "record write failed; in-memory state kept");
        }
    }
}

/// In-process store with switchable fault injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail.
    pub fn fail_reads(&self, enabled: bool) {
        self.fail_reads.store(enabled, Ordering::SeqCst);
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self, enabled: bool) {
        self.fail_writes.store(enabled, Ordering::SeqCst);
    }

    /// Successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current raw value of a record, bypassing fault injection.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Read {
                key: key.to_string(),
                source: io::Error::other("injected read failure"),
            });
        }
        Ok(self.raw(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                key: key.to_string(),
                source: io::Error::other("injected write failure"),
            });
        }
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                key: key.to_string(),
                source: io::Error::other("injected write failure"),
            });
        }
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
