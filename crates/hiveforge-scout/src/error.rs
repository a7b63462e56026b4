// hiveforge-scout/src/error.rs
// ============================================================================
// Module: Scout Errors
// Description: Failure modes for episode recording and store access.
// Dependencies: thiserror, hiveforge_storage
// ============================================================================

use thiserror::Error;

/// Failure recording or retrieving episodes (§4.14).
#[derive(Debug, Error)]
pub enum ScoutError {
    /// The Honeycomb store failed to read or write.
    #[error("honeycomb store error: {0}")]
    Storage(#[from] hiveforge_storage::StorageError),
}
