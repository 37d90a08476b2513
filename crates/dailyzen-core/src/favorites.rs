//! The set of favorited quote IDs.
//!
//! A [`FavoritesStore`] only exists hydrated: [`FavoritesStore::hydrate`]
//! reads the `favorites-store` record once and never fails (an unreadable
//! record starts an empty set). Every mutation updates memory first and
//! then submits the whole set to the [`RecordWriter`]; memory stays the
//! source of truth for the running session whatever the write outcome.
//!
//! Mutation takes `&mut self`, so two toggles of the same ID can never
//! interleave. Sharing a store across threads means wrapping it in a
//! `Mutex`, which keeps toggle's read-then-write atomic.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::{FAVORITES_KEY, Hydration, KeyValueStore, RecordWriter, hydrate_record, submit_record};

#[derive(Debug, Default, Serialize, Deserialize)]
struct FavoritesRecord {
    #[serde(default)]
    ids: Vec<String>,
    /// Digest of the quote catalog the IDs were written against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    catalog: Option<String>,
}

pub struct FavoritesStore {
    ids: BTreeSet<String>,
    hydration: Hydration,
    dirty: bool,
    catalog_digest: Option<String>,
    writer: Arc<dyn RecordWriter>,
}

impl FavoritesStore {
    /// Load the persisted set.
    ///
    /// `catalog_digest` is stamped on every write; when the stored stamp
    /// differs, positional IDs may point at different quotes and a warning
    /// is logged. Stored IDs are kept either way.
    pub fn hydrate(
        reader: &dyn KeyValueStore,
        writer: Arc<dyn RecordWriter>,
        catalog_digest: Option<String>,
    ) -> Self {
        let (record, hydration) = hydrate_record::<FavoritesRecord>(reader, FAVORITES_KEY);
        let record = record.unwrap_or_default();

        if let (Some(stored), Some(current)) = (&record.catalog, &catalog_digest)
            && stored != current
        {
            tracing::warn!(
                stored = %stored,
                current = %current,
                "quote catalog changed since favorites were saved; IDs may refer to other quotes"
            );
        }

        let ids: BTreeSet<String> = record.ids.into_iter().collect();
        tracing::debug!(count = ids.len(), ?hydration, "favorites hydrated");

        Self {
            ids,
            hydration,
            dirty: false,
            catalog_digest,
            writer,
        }
    }

    /// Insert an ID. Adding an existing ID changes nothing.
    pub fn add(&mut self, id: &str) {
        if self.ids.insert(id.to_string()) {
            tracing::debug!(id, "favorite added");
            self.persist();
        }
    }

    /// Delete an ID. Removing an absent ID changes nothing.
    pub fn remove(&mut self, id: &str) {
        if self.ids.remove(id) {
            tracing::debug!(id, "favorite removed");
            self.persist();
        }
    }

    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Flip membership; returns whether `id` is a favorite afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.has(id) {
            self.remove(id);
            false
        } else {
            self.add(id);
            true
        }
    }

    /// Remove every ID with a single write. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.ids.len();
        if removed > 0 {
            self.ids.clear();
            tracing::debug!(removed, "favorites cleared");
            self.persist();
        }
        removed
    }

    /// Stored IDs in lexical order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub const fn hydration(&self) -> Hydration {
        self.hydration
    }

    /// True once the set has changed since hydration.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn persist(&mut self) {
        self.dirty = true;
        let record = FavoritesRecord {
            ids: self.ids.iter().cloned().collect(),
            catalog: self.catalog_digest.clone(),
        };
        submit_record(self.writer.as_ref(), FAVORITES_KEY, &record);
    }
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("ids", &self.ids)
            .field("hydration", &self.hydration)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
