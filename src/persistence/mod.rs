//! Snapshot save/load
//!
//! Features:
//! - Single JSON blob under one fixed key, fully replaced on every commit
//! - `savedAt` stamp with a 7-day expiry (stale blobs are purged)
//! - Per-field validation on load (see `validate`)

pub mod validate;

use std::collections::HashMap;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;

use crate::consts::*;
use crate::draw::state::Snapshot;
use crate::error::StorageError;

/// Key/value substrate (LocalStorage on web, a map in tests and natively)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str);
}

/// In-memory substrate
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Wire shape of a committed snapshot
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredRef<'a> {
    #[serde(flatten)]
    snapshot: &'a Snapshot,
    saved_at: String,
}

/// Reads and writes the rotation snapshot through a substrate
#[derive(Debug)]
pub struct SnapshotStore<S: KeyValueStore> {
    storage: S,
    key: &'static str,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key: STATE_KEY,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Load the stored snapshot, or defaults if absent, unreadable or expired
    pub fn load(&mut self, now: DateTime<Utc>) -> Snapshot {
        let Some(raw) = self.storage.get(self.key) else {
            log::info!("No saved rotation found, starting fresh");
            return Snapshot::default();
        };
        let Some(blob) = validate::parse_blob(&raw) else {
            return Snapshot::default();
        };

        if let Some(saved_at) = blob.saved_at {
            if now - saved_at > Duration::days(EXPIRY_DAYS) {
                log::info!("Saved rotation from {} expired, discarding", saved_at);
                self.storage.remove(self.key);
                return Snapshot::default();
            }
        }

        log::info!(
            "Loaded rotation ({} drawn, {} months)",
            blob.snapshot.order.len(),
            blob.snapshot.history.len()
        );
        blob.snapshot
    }

    /// Write the snapshot stamped with `now`, replacing whatever was stored
    ///
    /// Failures are logged and dropped; in-memory state stays authoritative.
    pub fn commit(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) {
        if let Err(e) = self.try_commit(snapshot, now) {
            log::warn!("Rotation not saved: {}", e);
        }
    }

    fn try_commit(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> Result<(), StorageError> {
        let json = serde_json::to_string(&StoredRef {
            snapshot,
            saved_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        })?;
        self.storage.set(self.key, &json)?;
        log::debug!("Rotation saved ({} bytes)", json.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{Month, MonthlyRecord};

    /// Substrate that rejects every write
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteRejected("quota exceeded".to_string()))
        }
        fn remove(&mut self, key: &str) {
            self.0.remove(key);
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.names[0] = "Ann".into();
        snapshot.names[1] = "Bob".into();
        snapshot.names[2] = "Cy".into();
        snapshot.order = vec!["Ann".into(), "Bob".into(), "Cy".into()];
        snapshot.locked = true;
        snapshot.history.push(MonthlyRecord {
            month: Month::January,
            pair: ["Ann".into(), "Bob".into()],
            date: at("2026-10-18T20:15:00.250Z"),
            avatars: ["🦊".into(), "🐼".into()],
            drawn_pair: None,
        });
        snapshot
    }

    #[test]
    fn test_load_empty_gives_defaults() {
        let mut store = SnapshotStore::new(MemoryStore::new());
        assert_eq!(store.load(at("2026-10-19T00:00:00Z")), Snapshot::default());
    }

    #[test]
    fn test_commit_then_load() {
        let mut store = SnapshotStore::new(MemoryStore::new());
        let now = at("2026-10-19T00:00:00Z");
        store.commit(&sample(), now);
        assert_eq!(store.load(now + Duration::hours(1)), sample());

        let raw = store.storage().get(STATE_KEY).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["savedAt"], "2026-10-19T00:00:00.000Z");
        assert_eq!(json["emojis"].as_array().unwrap().len(), ROSTER_SIZE);
        assert_eq!(json["history"][0]["month"], "January");
    }

    #[test]
    fn test_expired_blob_purged() {
        let mut store = SnapshotStore::new(MemoryStore::new());
        let saved = at("2026-10-01T00:00:00Z");
        store.commit(&sample(), saved);

        let now = saved + Duration::days(EXPIRY_DAYS) + Duration::seconds(1);
        assert_eq!(store.load(now), Snapshot::default());
        assert!(store.storage().get(STATE_KEY).is_none());
    }

    #[test]
    fn test_exactly_seven_days_is_fresh() {
        let mut store = SnapshotStore::new(MemoryStore::new());
        let saved = at("2026-10-01T00:00:00Z");
        store.commit(&sample(), saved);
        assert_eq!(store.load(saved + Duration::days(EXPIRY_DAYS)), sample());
    }

    #[test]
    fn test_garbage_blob_gives_defaults() {
        let mut mem = MemoryStore::new();
        mem.set(STATE_KEY, "not json at all").unwrap();
        let mut store = SnapshotStore::new(mem);
        assert_eq!(store.load(at("2026-10-19T00:00:00Z")), Snapshot::default());
    }

    #[test]
    fn test_failed_write_is_swallowed() {
        let mut store = SnapshotStore::new(ReadOnlyStore(MemoryStore::new()));
        let snapshot = sample();
        store.commit(&snapshot, at("2026-10-19T00:00:00Z"));
        assert!(store.storage().get(STATE_KEY).is_none());
        assert_eq!(snapshot, sample());
    }
}
