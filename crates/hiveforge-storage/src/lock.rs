// hiveforge-storage/src/lock.rs
// ============================================================================
// Module: Advisory File Locking
// Description: Timeout-bounded exclusive/shared OS advisory locks (§4.2, §5).
// Purpose: Give every stream append/replay a single-writer-many-readers guarantee.
// Dependencies: fs2, std::fs, std::time
// ============================================================================

//! ## Overview
//! The append protocol's atomicity across processes rests entirely on this
//! module: an exclusive advisory lock on the stream file, acquired with a
//! bounded timeout (default 10s; a timeout is fatal for that append, §5).
//! `fs2::FileExt::try_lock_exclusive`/`try_lock_shared` are non-blocking, so
//! the bound is enforced here by polling with a short backoff rather than
//! relying on a blocking OS call with no deadline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::path::Path;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use fs2::FileExt;

use crate::error::StorageError;

/// Default bound on lock acquisition (§4.2: "timeout: bounded, e.g. 10 s").
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval while waiting for a contended lock.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A held advisory lock. Releases on drop.
pub struct FileGuard {
    file: File,
}

impl FileGuard {
    /// Returns the underlying file handle for reading/writing.
    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    /// Returns the underlying file handle.
    #[must_use]
    pub fn file(&self) -> &File {
        &self.file
    }
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        // Best-effort: the OS also releases the lock when the fd closes.
        let _ = FileExt::unlock(&self.file);
    }
}

/// Opens `path` (creating it if absent) and acquires an exclusive lock,
/// polling until `timeout` elapses (§4.2 step 1).
///
/// # Errors
///
/// Returns [`StorageError::Io`] if the file cannot be opened, or
/// [`StorageError::LockTimeout`] if the lock is not acquired in time.
pub fn acquire_exclusive(path: &Path, timeout: Duration) -> Result<FileGuard, StorageError> {
    let file = open_rw(path)?;
    poll_lock(path, timeout, "exclusive", || FileExt::try_lock_exclusive(&file))?;
    Ok(FileGuard { file })
}

/// Opens `path` for reading and acquires a shared lock, polling until
/// `timeout` elapses (§4.2 replay: "open shared-lock").
///
/// # Errors
///
/// Returns [`StorageError::Io`] if the file cannot be opened, or
/// [`StorageError::LockTimeout`] if the lock is not acquired in time.
pub fn acquire_shared(path: &Path, timeout: Duration) -> Result<FileGuard, StorageError> {
    let file = open_rw(path)?;
    poll_lock(path, timeout, "shared", || FileExt::try_lock_shared(&file))?;
    Ok(FileGuard { file })
}

/// Opens `path` read-write, creating it (and its parent directories) if absent.
fn open_rw(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).read(true).write(true).open(path)
}

/// Retries `try_lock` on contention until it succeeds or `timeout` elapses.
fn poll_lock(
    path: &Path,
    timeout: Duration,
    kind: &'static str,
    mut try_lock: impl FnMut() -> std::io::Result<()>,
) -> Result<(), StorageError> {
    let start = Instant::now();
    loop {
        match try_lock() {
            Ok(()) => return Ok(()),
            Err(err) if is_lock_contended(&err) => {
                if start.elapsed() >= timeout {
                    return Err(StorageError::LockTimeout {
                        kind,
                        path: path.display().to_string(),
                        timeout_secs: timeout.as_secs(),
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(err) => return Err(StorageError::Io(err)),
        }
    }
}

/// Returns whether `err` represents lock contention rather than a genuine failure.
fn is_lock_contended(err: &std::io::Error) -> bool {
    // fs2 normalizes a contended non-blocking lock attempt to `WouldBlock`
    // on every platform it supports.
    err.kind() == std::io::ErrorKind::WouldBlock
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_lock_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stream.lock");
        let guard = acquire_exclusive(&path, Duration::from_secs(1)).expect("acquire");
        drop(guard);
        let guard2 = acquire_exclusive(&path, Duration::from_secs(1)).expect("reacquire");
        drop(guard2);
    }
}
