// hiveforge-storage/src/honeycomb_store.rs
// ============================================================================
// Module: Honeycomb Store
// Description: Two-tier append-only episode archive (§3.5, §4.14).
// Purpose: Record every completed episode for Scout Bee's recommender to learn from.
// Dependencies: crate::lock, hiveforge_core::{Episode, hashing}
// ============================================================================

//! ## Overview
//! "Honeycomb store: two parallel append-only files per colony
//! (`<colony>.jsonl`) and a global `_all.jsonl`, written atomically via the
//! same lock protocol as AR. Episodes are sorted-key JSON." (§4.14)
//!
//! Unlike the Akashic Record, episodes are not hash-chained: each line is an
//! independent [`Episode`] record, canonicalized (sorted keys, no
//! whitespace) with the same RFC 8785 encoder the event log uses, so the two
//! stores share one on-disk convention.

use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use hiveforge_core::Episode;
use hiveforge_core::hashing::canonical_json_bytes;

use crate::error::StorageError;
use crate::lock;
use crate::lock::DEFAULT_LOCK_TIMEOUT;
use crate::stream_store;

const HONEYCOMB_DIR: &str = "honeycomb";
const ALL_STREAM: &str = "_all";

/// The Honeycomb store: per-colony and global episode archives (§4.14).
#[derive(Debug, Clone)]
pub struct HoneycombStore {
    root: PathBuf,
    lock_timeout: Duration,
}

impl HoneycombStore {
    /// Opens (creating if absent) a Honeycomb store rooted at
    /// `<vault>/honeycomb/`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(vault: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_timeout(vault, DEFAULT_LOCK_TIMEOUT)
    }

    /// As [`HoneycombStore::open`], with an explicit lock-acquisition timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn with_timeout(vault: impl AsRef<Path>, lock_timeout: Duration) -> Result<Self, StorageError> {
        let root = vault.as_ref().join(HONEYCOMB_DIR);
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, lock_timeout })
    }

    fn colony_path(&self, colony_id: &str) -> PathBuf {
        self.root.join(format!("{colony_id}.jsonl"))
    }

    fn all_path(&self) -> PathBuf {
        self.root.join(format!("{ALL_STREAM}.jsonl"))
    }

    /// Records `episode` to both its colony's stream and the global
    /// `_all.jsonl` stream, each under its own advisory lock.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::LockTimeout`] / [`StorageError::Io`] /
    /// [`StorageError::Hash`] on failure to lock, canonicalize, or write.
    pub fn record(&self, episode: &Episode) -> Result<(), StorageError> {
        let colony_path = self.colony_path(episode.colony_id.as_str());
        append_episode(&colony_path, episode, self.lock_timeout)?;
        append_episode(&self.all_path(), episode, self.lock_timeout)?;
        tracing::debug!(
            episode_id = episode.episode_id.as_str(),
            colony_id = episode.colony_id.as_str(),
            "recorded episode"
        );
        Ok(())
    }

    /// Replays every episode recorded for `colony_id`, in append order.
    ///
    /// # Errors
    ///
    /// Propagates lock/parse failures.
    pub fn replay_colony(&self, colony_id: &str) -> Result<Vec<Episode>, StorageError> {
        read_episodes(&self.colony_path(colony_id), self.lock_timeout)
    }

    /// Replays every episode ever recorded, across all colonies, in append
    /// order.
    ///
    /// # Errors
    ///
    /// Propagates lock/parse failures.
    pub fn replay_all(&self) -> Result<Vec<Episode>, StorageError> {
        read_episodes(&self.all_path(), self.lock_timeout)
    }

    /// Lists every colony id with at least one recorded episode.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the store root cannot be read.
    pub fn list_colonies(&self) -> Result<Vec<String>, StorageError> {
        stream_store::list_stream_files(&self.root, &[ALL_STREAM])
    }
}

/// Appends `episode`'s canonical JSON form to `path` under an exclusive lock.
fn append_episode(path: &Path, episode: &Episode, timeout: Duration) -> Result<(), StorageError> {
    let mut guard = lock::acquire_exclusive(path, timeout)?;
    let canonical = canonical_json_bytes(episode)?;
    let mut line = String::from_utf8_lossy(&canonical).into_owned();
    line.push('\n');
    use std::io::Seek;
    use std::io::SeekFrom;
    guard.file_mut().seek(SeekFrom::End(0))?;
    guard.file_mut().write_all(line.as_bytes())?;
    guard.file_mut().sync_data()?;
    Ok(())
}

/// Reads every non-blank line of the episode stream at `path` under a shared lock.
fn read_episodes(path: &Path, timeout: Duration) -> Result<Vec<Episode>, StorageError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let guard = lock::acquire_shared(path, timeout)?;
    let reader = BufReader::new(guard.file());
    let mut episodes = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        episodes.push(serde_json::from_str(&line)?);
    }
    Ok(episodes)
}
