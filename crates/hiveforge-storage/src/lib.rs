// hiveforge-storage/src/lib.rs
// ============================================================================
// Crate: hiveforge-storage
// Description: File-locked, hash-chained append-only storage (§4.2, §4.14).
// Purpose: Back the Akashic Record, HiveStore, and Honeycomb store.
// ============================================================================

//! ## Overview
//! `hiveforge-storage` is the only crate in the workspace that touches the
//! vault filesystem (§6.3). Three public stores sit on top of one shared
//! engine:
//!
//! - [`AkashicRecord`] — run-scoped, hash-chained event streams (§3.1, §4.2).
//! - [`HiveStore`] — hive-scoped, hash-chained event streams; "an analogous
//!   store keyed by `hive_id`... the contract is identical" (§4.2).
//! - [`HoneycombStore`] — per-colony and global episode archives, not
//!   hash-chained (§3.5, §4.14).
//!
//! All three serialize writes through OS advisory file locks
//! ([`lock::acquire_exclusive`]/[`lock::acquire_shared`]), bounded by a
//! timeout that is fatal for the operation when exceeded (§5).

#![forbid(unsafe_code)]

mod akashic_record;
mod error;
mod hive_store;
mod honeycomb_store;
mod ids;
mod lock;
mod stream_store;
mod tail;

pub use akashic_record::AkashicRecord;
pub use error::StorageError;
pub use hive_store::HiveStore;
pub use honeycomb_store::HoneycombStore;
pub use ids::new_event_id;
pub use lock::DEFAULT_LOCK_TIMEOUT;
pub use lock::FileGuard;
pub use lock::acquire_exclusive;
pub use lock::acquire_shared;
