// hiveforge-storage/src/akashic_record.rs
// ============================================================================
// Module: Akashic Record
// Description: Run-scoped event stream store under `<vault>/<run_id>/events.jsonl`.
// Purpose: The authoritative, hash-chained log of everything a run does (§3.1, §4.2).
// Dependencies: crate::stream_store, hiveforge_core
// ============================================================================

//! ## Overview
//! One [`AkashicRecord`] instance owns a vault directory. Each run gets its
//! own subdirectory `<vault>/<run_id>/events.jsonl` (§6.3); `append` resolves
//! the stream from `event.stream_key()` and requires it to be a `run_id`, not
//! a `hive_id` (hive-scoped events belong to [`crate::HiveStore`]).

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use hiveforge_core::Event;

use crate::error::StorageError;
use crate::lock::DEFAULT_LOCK_TIMEOUT;
use crate::stream_store;

const EVENTS_FILE: &str = "events.jsonl";

/// The Akashic Record: one hash-chained stream per run (§3.1, §4.2).
#[derive(Debug, Clone)]
pub struct AkashicRecord {
    vault: PathBuf,
    lock_timeout: Duration,
}

impl AkashicRecord {
    /// Opens (creating if absent) an Akashic Record rooted at `vault`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if `vault` cannot be created.
    pub fn open(vault: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::with_timeout(vault, DEFAULT_LOCK_TIMEOUT)
    }

    /// As [`AkashicRecord::open`], with an explicit lock-acquisition timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if `vault` cannot be created.
    pub fn with_timeout(vault: impl Into<PathBuf>, lock_timeout: Duration) -> Result<Self, StorageError> {
        let vault = vault.into();
        std::fs::create_dir_all(&vault)?;
        Ok(Self { vault, lock_timeout })
    }

    fn run_path(&self, run_id: &str) -> PathBuf {
        self.vault.join(run_id).join(EVENTS_FILE)
    }

    /// Appends `event` to its run's stream (§4.2 step 1). `event.run_id`
    /// must be set; hive-scoped events belong in [`crate::HiveStore`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EmptyStream`] if `event` carries no `run_id`,
    /// or propagates lock/hash/I/O failures.
    pub fn append(&self, event: Event) -> Result<Event, StorageError> {
        let run_id = event
            .run_id
            .as_ref()
            .ok_or_else(|| StorageError::EmptyStream("<no run_id on event>".to_string()))?
            .as_str()
            .to_string();
        stream_store::append(&self.run_path(&run_id), event, self.lock_timeout)
    }

    /// Replays every event recorded for `run_id`, in append order.
    ///
    /// # Errors
    ///
    /// Propagates lock/parse failures.
    pub fn replay(&self, run_id: &str) -> Result<Vec<Event>, StorageError> {
        stream_store::replay(&self.run_path(run_id), self.lock_timeout)
    }

    /// Returns the last event recorded for `run_id`, if any.
    ///
    /// # Errors
    ///
    /// Propagates lock/parse failures.
    pub fn last_event(&self, run_id: &str) -> Result<Option<Event>, StorageError> {
        stream_store::last_event(&self.run_path(run_id), self.lock_timeout)
    }

    /// Counts the events recorded for `run_id`.
    ///
    /// # Errors
    ///
    /// Propagates lock/I/O failures.
    pub fn count_events(&self, run_id: &str) -> Result<usize, StorageError> {
        stream_store::count_events(&self.run_path(run_id), self.lock_timeout)
    }

    /// Verifies the hash chain for `run_id` (§4.2 "chain verification").
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ChainBroken`] at the first broken link.
    pub fn verify_chain(&self, run_id: &str) -> Result<(), StorageError> {
        stream_store::verify_chain(&self.run_path(run_id), self.lock_timeout)
    }

    /// Exports `run_id`'s stream as raw newline-delimited JSON (§3.3
    /// `export_run`).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EmptyStream`] if the run has no events.
    pub fn export_run(&self, run_id: &str) -> Result<String, StorageError> {
        stream_store::export(&self.run_path(run_id), run_id, self.lock_timeout)
    }

    /// Lists every run id with at least one recorded event (§4.2 "list
    /// streams").
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the vault cannot be read.
    pub fn list_runs(&self) -> Result<Vec<String>, StorageError> {
        stream_store::list_stream_dirs(&self.vault, EVENTS_FILE)
    }

    /// Returns the on-disk stream path for `run_id`, without requiring it to
    /// exist.
    #[must_use]
    pub fn run_path_for(&self, run_id: &str) -> PathBuf {
        self.run_path(run_id)
    }

    /// Returns the vault root this record is rooted at.
    #[must_use]
    pub fn vault(&self) -> &Path {
        &self.vault
    }
}
