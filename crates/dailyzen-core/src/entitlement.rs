//! Premium entitlement flag (`user-store`).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::{Hydration, KeyValueStore, RecordWriter, USER_KEY, hydrate_record, submit_record};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    #[serde(default)]
    is_premium: bool,
}

/// Holds `isPremium`. Starts `false`, never expires on its own.
pub struct UserStore {
    is_premium: bool,
    hydration: Hydration,
    writer: Arc<dyn RecordWriter>,
}

impl UserStore {
    pub fn hydrate(reader: &dyn KeyValueStore, writer: Arc<dyn RecordWriter>) -> Self {
        let (record, hydration) = hydrate_record::<UserRecord>(reader, USER_KEY);
        let is_premium = record.unwrap_or_default().is_premium;
        tracing::debug!(is_premium, ?hydration, "entitlement hydrated");
        Self {
            is_premium,
            hydration,
            writer,
        }
    }

    #[must_use]
    pub const fn is_premium(&self) -> bool {
        self.is_premium
    }

    /// Overwrite the flag and persist it. The only entitlement mutation path.
    pub fn set_premium(&mut self, value: bool) {
        if self.is_premium != value {
            tracing::info!(is_premium = value, "entitlement changed");
        }
        self.is_premium = value;
        submit_record(
            self.writer.as_ref(),
            USER_KEY,
            &UserRecord {
                is_premium: value,
            },
        );
    }

    #[must_use]
    pub const fn hydration(&self) -> Hydration {
        self.hydration
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore")
            .field("is_premium", &self.is_premium)
            .field("hydration", &self.hydration)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SyncWriter};

    fn open(backing: &Arc<MemoryStore>) -> UserStore {
        UserStore::hydrate(backing.as_ref(), Arc::new(SyncWriter::new(backing.clone())))
    }

    #[test]
    fn first_run_is_not_premium() {
        let backing = Arc::new(MemoryStore::new());
        let user = open(&backing);
        assert!(!user.is_premium());
        assert_eq!(user.hydration(), Hydration::Fresh);
    }

    #[test]
    fn set_premium_persists_camel_case_record() {
        let backing = Arc::new(MemoryStore::new());
        let mut user = open(&backing);
        user.set_premium(true);
        assert!(user.is_premium());

        let raw = backing.raw(USER_KEY).expect("record written");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value, serde_json::json!({ "isPremium": true }));
        assert!(open(&backing).is_premium());
    }

    #[test]
    fn set_premium_is_an_unconditional_overwrite() {
        let backing = Arc::new(MemoryStore::new());
        let mut user = open(&backing);
        user.set_premium(true);
        user.set_premium(true);
        assert_eq!(backing.write_count(), 2);
        user.set_premium(false);
        assert!(!open(&backing).is_premium());
    }

    #[test]
    fn unreadable_record_defaults_to_not_premium() {
        let backing = Arc::new(MemoryStore::new());
        backing.write(USER_KEY, "garbage").expect("seed");
        let user = open(&backing);
        assert!(!user.is_premium());
        assert_eq!(user.hydration(), Hydration::Defaulted);
    }
}
