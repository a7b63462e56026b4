// hiveforge-storage/src/error.rs
// ============================================================================
// Module: Storage Errors
// Description: Failure kinds for the Akashic Record, HiveStore, and Honeycomb.
// Purpose: Give every storage operation a typed, non-panicking failure (§7).
// Dependencies: hiveforge_core::hashing::HashError, thiserror
// ============================================================================

//! ## Overview
//! Storage errors are fatal for the operation that raised them (§7): a lock
//! timeout or an I/O failure aborts the current append or replay, but never
//! corrupts on-disk state, since the append protocol only renames/writes
//! the stream file's tail after the new record is fully serialized.

use hiveforge_core::HashError;
use thiserror::Error;

/// Errors raised by Akashic Record / HiveStore / Honeycomb storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The advisory file lock could not be acquired within the configured
    /// timeout (§4.2, §5: "failure is fatal").
    #[error("timed out acquiring {kind} lock on {path} after {timeout_secs}s")]
    LockTimeout {
        /// Lock flavor (`"exclusive"` or `"shared"`).
        kind: &'static str,
        /// Path of the lock file.
        path: String,
        /// Configured timeout, in seconds.
        timeout_secs: u64,
    },
    /// An underlying filesystem operation failed.
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// A stored line was not valid JSON or did not match the `Event` shape.
    #[error("corrupt stream record: {0}")]
    Parse(#[from] serde_json::Error),
    /// Canonicalization/hashing failed while finalizing a new event.
    #[error("hashing error: {0}")]
    Hash(#[from] HashError),
    /// `verify_chain` found a broken link.
    #[error("chain broken at event {event_id}: expected prev_hash {expected:?}, found {found:?}")]
    ChainBroken {
        /// The first offending event's id.
        event_id: String,
        /// The hash the chain invariant required.
        expected: Option<String>,
        /// The `prev_hash` actually stored on that event.
        found: Option<String>,
    },
    /// The requested stream has no events.
    #[error("stream {0:?} is empty or does not exist")]
    EmptyStream(String),
}
