//! Fire-and-forget record persistence.
//!
//! [`WriteBehind::submit`] only enqueues. A single worker thread drains the
//! queue in batches and keeps the newest value per key, so a burst of
//! changes to one record costs one write. A failed write is logged and
//! dropped; the next change to the same record writes the full state again.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use super::{KeyValueStore, RecordWriter};

enum Command {
    Put { key: String, value: String },
    Flush(Sender<()>),
}

/// Counters describing what the worker has done so far.
#[derive(Debug, Default)]
pub struct WriteStats {
    written: AtomicU64,
    failed: AtomicU64,
    superseded: AtomicU64,
}

impl WriteStats {
    #[must_use]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    /// Values replaced by a newer value for the same key before being written.
    #[must_use]
    pub fn superseded(&self) -> u64 {
        self.superseded.load(Ordering::SeqCst)
    }
}

/// Background writer shared by every store of a session.
pub struct WriteBehind {
    store: Arc<dyn KeyValueStore>,
    tx: Mutex<Option<Sender<Command>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<WriteStats>,
}

impl WriteBehind {
    /// Start the worker thread.
    pub fn spawn(store: Arc<dyn KeyValueStore>) -> Self {
        let (tx, rx) = mpsc::channel();
        let stats = Arc::new(WriteStats::default());
        let worker_store = Arc::clone(&store);
        let worker_stats = Arc::clone(&stats);
        let worker = thread::Builder::new()
            .name("dailyzen-write-behind".into())
            .spawn(move || run_worker(&rx, worker_store.as_ref(), &worker_stats));

        let (tx, worker) = match worker {
            Ok(handle) => (Some(tx), Some(handle)),
            Err(err) => {
                tracing::warn!(error = %err, "write-behind worker unavailable; writing inline");
                (None, None)
            }
        };

        Self {
            store,
            tx: Mutex::new(tx),
            worker: Mutex::new(worker),
            stats,
        }
    }

    #[must_use]
    pub fn stats(&self) -> &WriteStats {
        &self.stats
    }

    /// Block until every write submitted before this call has been attempted.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        let sent = self
            .sender()
            .is_some_and(|tx| tx.send(Command::Flush(ack_tx)).is_ok());
        if sent {
            // A dropped ack means the worker is gone, which also means done.
            let _ = ack_rx.recv();
        }
    }

    /// Flush, stop the worker and wait for it to exit.
    pub fn shutdown(&self) {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner).take();
        drop(tx);
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = worker
            && handle.join().is_err()
        {
            tracing::error!("write-behind worker panicked");
        }
    }

    fn sender(&self) -> Option<Sender<Command>> {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write_inline(&self, key: &str, value: &str) {
        write_one(self.store.as_ref(), &self.stats, key, value);
    }
}

impl RecordWriter for WriteBehind {
    fn submit(&self, key: &str, value: String) {
        let Some(tx) = self.sender() else {
            self.write_inline(key, &value);
            return;
        };
        if let Err(mpsc::SendError(cmd)) = tx.send(Command::Put {
            key: key.to_string(),
            value,
        }) && let Command::Put { key, value } = cmd
        {
            self.write_inline(&key, &value);
        }
    }
}

impl Drop for WriteBehind {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(rx: &Receiver<Command>, store: &dyn KeyValueStore, stats: &WriteStats) {
    while let Ok(first) = rx.recv() {
        let mut pending: BTreeMap<String, String> = BTreeMap::new();
        let mut next = Some(first);
        while let Some(cmd) = next {
            match cmd {
                Command::Put { key, value } => {
                    if pending.insert(key, value).is_some() {
                        stats.superseded.fetch_add(1, Ordering::SeqCst);
                    }
                }
                Command::Flush(ack) => {
                    drain(&mut pending, store, stats);
                    let _ = ack.send(());
                }
            }
            next = rx.try_recv().ok();
        }
        drain(&mut pending, store, stats);
    }
    tracing::debug!("write-behind worker stopped");
}

fn drain(pending: &mut BTreeMap<String, String>, store: &dyn KeyValueStore, stats: &WriteStats) {
    for (key, value) in std::mem::take(pending) {
        write_one(store, stats, &key, &value);
    }
}

fn write_one(store: &dyn KeyValueStore, stats: &WriteStats, key: &str, value: &str) {
    match store.write(key, value) {
        Ok(()) => {
            stats.written.fetch_add(1, Ordering::SeqCst);
        }
        Err(err) => {
            stats.failed.fetch_add(1, Ordering::SeqCst);
            tracing::warn!(key, code = %err.code(), error = %err, "record write failed; in-memory state kept");
        }
    }
}
