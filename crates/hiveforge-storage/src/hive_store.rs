// hiveforge-storage/src/hive_store.rs
// ============================================================================
// Module: HiveStore
// Description: Hive-scoped event stream store under `<vault>/hives/<hive_id>/events.jsonl`.
// Purpose: An analogue of the Akashic Record keyed by `hive_id` (§4.2).
// Dependencies: crate::stream_store, hiveforge_core
// ============================================================================

//! ## Overview
//! "The HiveStore is an analogous store keyed by `hive_id` in a parallel
//! directory; the contract is identical." (§4.2) This wraps the same
//! [`crate::stream_store`] engine [`crate::AkashicRecord`] uses, rooted at
//! `<vault>/hives/` instead of `<vault>/`.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use hiveforge_core::Event;

use crate::error::StorageError;
use crate::lock::DEFAULT_LOCK_TIMEOUT;
use crate::stream_store;

const EVENTS_FILE: &str = "events.jsonl";
const HIVES_DIR: &str = "hives";

/// The HiveStore: one hash-chained stream per hive (§4.2).
#[derive(Debug, Clone)]
pub struct HiveStore {
    hives_root: PathBuf,
    lock_timeout: Duration,
}

impl HiveStore {
    /// Opens (creating if absent) a HiveStore rooted at `<vault>/hives/`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(vault: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_timeout(vault, DEFAULT_LOCK_TIMEOUT)
    }

    /// As [`HiveStore::open`], with an explicit lock-acquisition timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn with_timeout(vault: impl AsRef<Path>, lock_timeout: Duration) -> Result<Self, StorageError> {
        let hives_root = vault.as_ref().join(HIVES_DIR);
        std::fs::create_dir_all(&hives_root)?;
        Ok(Self { hives_root, lock_timeout })
    }

    fn hive_path(&self, hive_id: &str) -> PathBuf {
        self.hives_root.join(hive_id).join(EVENTS_FILE)
    }

    /// Appends `event` to its hive's stream. `event.hive_id` must be set.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EmptyStream`] if `event` carries no
    /// `hive_id`, or propagates lock/hash/I/O failures.
    pub fn append(&self, event: Event) -> Result<Event, StorageError> {
        let hive_id = event
            .hive_id
            .as_ref()
            .ok_or_else(|| StorageError::EmptyStream("<no hive_id on event>".to_string()))?
            .as_str()
            .to_string();
        stream_store::append(&self.hive_path(&hive_id), event, self.lock_timeout)
    }

    /// Replays every event recorded for `hive_id`, in append order.
    ///
    /// # Errors
    ///
    /// Propagates lock/parse failures.
    pub fn replay(&self, hive_id: &str) -> Result<Vec<Event>, StorageError> {
        stream_store::replay(&self.hive_path(hive_id), self.lock_timeout)
    }

    /// Returns the last event recorded for `hive_id`, if any.
    ///
    /// # Errors
    ///
    /// Propagates lock/parse failures.
    pub fn last_event(&self, hive_id: &str) -> Result<Option<Event>, StorageError> {
        stream_store::last_event(&self.hive_path(hive_id), self.lock_timeout)
    }

    /// Counts the events recorded for `hive_id`.
    ///
    /// # Errors
    ///
    /// Propagates lock/I/O failures.
    pub fn count_events(&self, hive_id: &str) -> Result<usize, StorageError> {
        stream_store::count_events(&self.hive_path(hive_id), self.lock_timeout)
    }

    /// Verifies the hash chain for `hive_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ChainBroken`] at the first broken link.
    pub fn verify_chain(&self, hive_id: &str) -> Result<(), StorageError> {
        stream_store::verify_chain(&self.hive_path(hive_id), self.lock_timeout)
    }

    /// Exports `hive_id`'s stream as raw newline-delimited JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EmptyStream`] if the hive has no events.
    pub fn export_hive(&self, hive_id: &str) -> Result<String, StorageError> {
        stream_store::export(&self.hive_path(hive_id), hive_id, self.lock_timeout)
    }

    /// Lists every hive id with at least one recorded event.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the store root cannot be read.
    pub fn list_hives(&self) -> Result<Vec<String>, StorageError> {
        stream_store::list_stream_dirs(&self.hives_root, EVENTS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use hiveforge_core::Actor;
    use hiveforge_core::EventId;
    use hiveforge_core::EventType;
    use hiveforge_core::HiveId;
    use hiveforge_core::Payload;
    use hiveforge_core::Timestamp;

    use super::*;

    fn hive_created(hive_id: &str) -> Event {
        Event {
            id: EventId::new(""),
            event_type: EventType::HiveCreated,
            timestamp: Timestamp::new(time::OffsetDateTime::now_utc()),
            run_id: None,
            hive_id: Some(HiveId::new(hive_id)),
            colony_id: None,
            task_id: None,
            worker_id: None,
            actor: Actor::system(),
            payload: Payload::new(),
            prev_hash: None,
            parents: Vec::new(),
            hash: String::new(),
        }
    }

    #[test]
    fn append_and_replay_hive_stream() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = HiveStore::open(dir.path()).expect("open");
        store.append(hive_created("hive-1")).expect("append");

        let events = store.replay("hive-1").expect("replay");
        assert_eq!(events.len(), 1);
        assert_eq!(store.list_hives().expect("list"), vec!["hive-1".to_string()]);
    }

    #[test]
    fn append_requires_hive_id() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = HiveStore::open(dir.path()).expect("open");
        let mut event = hive_created("hive-1");
        event.hive_id = None;
        let err = store.append(event).expect_err("missing hive_id");
        assert!(matches!(err, StorageError::EmptyStream(_)));
    }
}
