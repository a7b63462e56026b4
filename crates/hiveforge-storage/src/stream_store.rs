// hiveforge-storage/src/stream_store.rs
// ============================================================================
// Module: Append-Only Event Stream Store
// Description: Generic hash-chained, file-locked, newline-delimited JSON log.
// Purpose: Back the Akashic Record, HiveStore, and Honeycomb stores (§4.2, §4.14).
// Dependencies: crate::{error, ids, lock, tail}, hiveforge_core, serde_json, tracing
// ============================================================================

//! ## Overview
//! A stream is one newline-delimited canonical JSON file at an explicit
//! path; callers (the Akashic Record, the HiveStore, the Honeycomb store)
//! decide the filesystem layout (`<vault>/<run_id>/events.jsonl`,
//! `<vault>/hives/<hive_id>/events.jsonl`, `<vault>/honeycomb/<colony>.jsonl`,
//! §6.3) and pass the resolved path down to the functions here. The append
//! protocol (§4.2 step 1) is:
//!
//! 1. Acquire an exclusive advisory lock on the stream file (bounded timeout).
//! 2. Resolve `prev_hash` by reading the last non-blank line via the
//!    chunk-doubling tail scan, rather than replaying the whole file.
//! 3. Assign a fresh, time-ordered id, stamp `prev_hash`, and finalize the
//!    event's hash.
//! 4. Append the canonical JSON line and release the lock.
//!
//! Replay (§4.2 "replay") takes a shared lock and folds every line through
//! [`hiveforge_core::parse_event`] in order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read as _;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use hiveforge_core::Event;
use hiveforge_core::parse_event;

use crate::error::StorageError;
use crate::ids::new_event_id;
use crate::lock;
use crate::tail;

/// Appends `event` to the stream file at `path`, assigning a fresh id,
/// resolving `prev_hash` from the stream tail, and finalizing its hash
/// (§4.2 step 1). Any `id`, `prev_hash`, and `hash` already set on `event`
/// are overwritten. Creates `path` (and its parent directories) if absent.
///
/// # Errors
///
/// Returns [`StorageError::LockTimeout`] if the exclusive lock is not
/// acquired within `timeout`, or [`StorageError::Io`] / [`StorageError::Hash`]
/// on failure to read, hash, or write.
pub fn append(path: &Path, mut event: Event, timeout: Duration) -> Result<Event, StorageError> {
    let mut guard = lock::acquire_exclusive(path, timeout)?;

    let prev_hash = match tail::last_nonblank_line(guard.file_mut())? {
        Some(line) => {
            let value: serde_json::Value = serde_json::from_str(&line)?;
            let prev = parse_event(&value)?;
            Some(prev.hash)
        }
        None => None,
    };

    event.id = new_event_id();
    event.prev_hash = prev_hash;
    let finalized = event.finalized()?;

    let mut line = serde_json::to_string(&finalized)?;
    line.push('\n');
    guard.file_mut().seek(SeekFrom::End(0))?;
    guard.file_mut().write_all(line.as_bytes())?;
    guard.file_mut().sync_data()?;

    tracing::debug!(
        path = %path.display(),
        event_id = finalized.id.as_str(),
        event_type = finalized.event_type.as_wire_str(),
        "appended event"
    );
    Ok(finalized)
}

/// Replays every event in the stream file at `path`, in append order.
/// Returns an empty vector if `path` does not exist.
///
/// # Errors
///
/// Returns [`StorageError::LockTimeout`] on a shared-lock timeout, or
/// [`StorageError::Parse`] if a stored line is not a well-formed event.
pub fn replay(path: &Path, timeout: Duration) -> Result<Vec<Event>, StorageError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut guard = lock::acquire_shared(path, timeout)?;
    read_all_events(guard.file_mut())
}

/// Returns the last event appended to the stream file at `path`, or `None`
/// if the stream is empty or does not exist.
///
/// # Errors
///
/// Returns [`StorageError::LockTimeout`] or [`StorageError::Parse`].
pub fn last_event(path: &Path, timeout: Duration) -> Result<Option<Event>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }
    let mut guard = lock::acquire_shared(path, timeout)?;
    match tail::last_nonblank_line(guard.file_mut())? {
        Some(line) => {
            let value: serde_json::Value = serde_json::from_str(&line)?;
            Ok(Some(parse_event(&value)?))
        }
        None => Ok(None),
    }
}

/// Counts the events stored at `path`, without materializing them.
///
/// # Errors
///
/// Returns [`StorageError::LockTimeout`] or [`StorageError::Io`].
pub fn count_events(path: &Path, timeout: Duration) -> Result<usize, StorageError> {
    if !path.exists() {
        return Ok(0);
    }
    let guard = lock::acquire_shared(path, timeout)?;
    let reader = BufReader::new(guard.file());
    let mut count = 0;
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

/// Verifies the hash chain of the stream file at `path`: every event's
/// `prev_hash` must equal the preceding event's stored `hash` (or be `None`
/// at the head), and every event's stored `hash` must equal its recomputed
/// canonical hash (§4.2 "chain verification").
///
/// # Errors
///
/// Returns [`StorageError::ChainBroken`] at the first broken link, or
/// propagates read/parse/hash failures.
pub fn verify_chain(path: &Path, timeout: Duration) -> Result<(), StorageError> {
    let events = replay(path, timeout)?;
    let mut expected_prev: Option<String> = None;
    for event in events {
        if event.prev_hash != expected_prev {
            return Err(StorageError::ChainBroken {
                event_id: event.id.into_string(),
                expected: expected_prev,
                found: event.prev_hash,
            });
        }
        let recomputed = event.clone().finalized()?;
        if recomputed.hash != event.hash {
            return Err(StorageError::ChainBroken {
                event_id: event.id.into_string(),
                expected: Some(recomputed.hash),
                found: Some(event.hash),
            });
        }
        expected_prev = Some(event.hash);
    }
    Ok(())
}

/// Exports the stream file at `path` as its raw newline-delimited JSON text,
/// suitable for writing verbatim to a file or HTTP response body (§3.3
/// `export_run`).
///
/// # Errors
///
/// Returns [`StorageError::EmptyStream`] if the stream has no events, or
/// propagates lock/read failures.
pub fn export(path: &Path, stream_key: &str, timeout: Duration) -> Result<String, StorageError> {
    if !path.exists() {
        return Err(StorageError::EmptyStream(stream_key.to_string()));
    }
    let guard = lock::acquire_shared(path, timeout)?;
    let mut text = String::new();
    let mut reader = BufReader::new(guard.file());
    reader.read_to_string(&mut text)?;
    if text.trim().is_empty() {
        return Err(StorageError::EmptyStream(stream_key.to_string()));
    }
    Ok(text)
}

/// Reads every non-blank line of `file` from the start, parsing each as an event.
fn read_all_events(file: &mut File) -> Result<Vec<Event>, StorageError> {
    file.seek(SeekFrom::Start(0))?;
    let reader = BufReader::new(file);
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(&line)?;
        events.push(parse_event(&value)?);
    }
    Ok(events)
}

/// Lists the immediate subdirectory names of `root` that contain a
/// non-empty `filename` (§4.2 "list streams": "directories with a
/// non-empty stream file"). Returns an empty vector if `root` does not
/// exist.
///
/// # Errors
///
/// Returns [`StorageError::Io`] if `root` exists but cannot be read.
pub fn list_stream_dirs(root: &Path, filename: &str) -> Result<Vec<String>, StorageError> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut keys = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let stream_path = path.join(filename);
        let has_events = stream_path.metadata().map(|m| m.len() > 0).unwrap_or(false);
        if has_events {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                keys.push(name.to_string());
            }
        }
    }
    keys.sort();
    Ok(keys)
}

/// Lists the `*.jsonl` stream keys directly under `root` (§4.14 Honeycomb's
/// flat `honeycomb/<colony_id>.jsonl` layout). Returns an empty vector if
/// `root` does not exist.
///
/// # Errors
///
/// Returns [`StorageError::Io`] if `root` exists but cannot be read.
pub fn list_stream_files(root: &Path, exclude: &[&str]) -> Result<Vec<String>, StorageError> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut keys = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("jsonl") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if !exclude.contains(&stem) {
                keys.push(stem.to_string());
            }
        }
    }
    keys.sort();
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use hiveforge_core::Actor;
    use hiveforge_core::EventId;
    use hiveforge_core::EventType;
    use hiveforge_core::Payload;
    use hiveforge_core::RunId;
    use hiveforge_core::Timestamp;

    use super::*;

    const TEST_TIMEOUT: Duration = Duration::from_secs(2);

    fn blank_event(run_id: &str, event_type: EventType) -> Event {
        Event {
            id: EventId::new(""),
            event_type,
            timestamp: Timestamp::new(time::OffsetDateTime::now_utc()),
            run_id: Some(RunId::new(run_id)),
            hive_id: None,
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
    fn append_then_replay_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.jsonl");
        append(&path, blank_event("run-1", EventType::RunStarted), TEST_TIMEOUT).expect("append 1");
        append(&path, blank_event("run-1", EventType::RunCompleted), TEST_TIMEOUT).expect("append 2");

        let events = replay(&path, TEST_TIMEOUT).expect("replay");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::RunStarted);
        assert_eq!(events[1].prev_hash.as_deref(), Some(events[0].hash.as_str()));
        assert!(events[0].prev_hash.is_none());
    }

    #[test]
    fn verify_chain_passes_on_untampered_stream() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.jsonl");
        for _ in 0 .. 5 {
            append(&path, blank_event("run-1", EventType::TaskProgressed), TEST_TIMEOUT).expect("append");
        }
        verify_chain(&path, TEST_TIMEOUT).expect("chain verifies");
    }

    #[test]
    fn verify_chain_detects_broken_link() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.jsonl");
        append(&path, blank_event("run-1", EventType::RunStarted), TEST_TIMEOUT).expect("append 1");
        append(&path, blank_event("run-1", EventType::RunCompleted), TEST_TIMEOUT).expect("append 2");

        let contents = std::fs::read_to_string(&path).expect("read");
        let mut lines: Vec<&str> = contents.lines().collect();
        let mut tampered: serde_json::Value = serde_json::from_str(lines[1]).expect("parse");
        tampered["prev_hash"] = serde_json::Value::String("deadbeef".to_string());
        let tampered_line = serde_json::to_string(&tampered).expect("serialize");
        lines[1] = &tampered_line;
        std::fs::write(&path, format!("{}\n", lines.join("\n"))).expect("rewrite");

        let err = verify_chain(&path, TEST_TIMEOUT).expect_err("should detect tamper");
        assert!(matches!(err, StorageError::ChainBroken { .. }));
    }

    #[test]
    fn last_event_matches_replay_tail() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.jsonl");
        append(&path, blank_event("run-1", EventType::RunStarted), TEST_TIMEOUT).expect("append 1");
        let second =
            append(&path, blank_event("run-1", EventType::RunCompleted), TEST_TIMEOUT).expect("append 2");

        let last = last_event(&path, TEST_TIMEOUT).expect("last").expect("some");
        assert_eq!(last.id, second.id);
    }

    #[test]
    fn count_events_matches_replay_length() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.jsonl");
        append(&path, blank_event("run-1", EventType::RunStarted), TEST_TIMEOUT).expect("append");
        append(&path, blank_event("run-1", EventType::TaskProgressed), TEST_TIMEOUT).expect("append");

        assert_eq!(count_events(&path, TEST_TIMEOUT).expect("count"), 2);
    }

    #[test]
    fn export_returns_raw_ndjson() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.jsonl");
        append(&path, blank_event("run-1", EventType::RunStarted), TEST_TIMEOUT).expect("append");

        let exported = export(&path, "run-1", TEST_TIMEOUT).expect("export");
        assert_eq!(exported.trim_end().lines().count(), 1);
    }

    #[test]
    fn export_missing_stream_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nope").join("events.jsonl");
        let err = export(&path, "nope", TEST_TIMEOUT).expect_err("missing stream");
        assert!(matches!(err, StorageError::EmptyStream(_)));
    }

    #[test]
    fn list_stream_dirs_finds_only_nonempty() {
        let dir = tempfile::tempdir().expect("tempdir");
        append(
            &dir.path().join("run-1").join("events.jsonl"),
            blank_event("run-1", EventType::RunStarted),
            TEST_TIMEOUT,
        )
        .expect("append");
        std::fs::create_dir_all(dir.path().join("run-2")).expect("mkdir empty");

        let keys = list_stream_dirs(dir.path(), "events.jsonl").expect("list");
        assert_eq!(keys, vec!["run-1".to_string()]);
    }
}
