// hiveforge-storage/src/ids.rs
// ============================================================================
// Module: Event Id Generation
// Description: Monotonic, lexicographically sortable event identifiers.
// Purpose: Give every appended event an id that sorts in append order (§3.1).
// Dependencies: std::time, uuid
// ============================================================================

//! ## Overview
//! `EventId`s must be globally unique and lexicographically sortable in
//! append order (§3.1). No ULID crate is in the dependency stack, so this
//! composes the same idea from what is already depended on: a zero-padded
//! hex encoding of milliseconds since the Unix epoch (sorts correctly as a
//! string up to year 10889) followed by a random `uuid` v4 suffix to break
//! ties between events recorded in the same millisecond.

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use hiveforge_core::EventId;

/// Generates a new, time-ordered [`EventId`].
#[must_use]
pub fn new_event_id() -> EventId {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    EventId::new(format!("{millis:012x}-{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = new_event_id();
        let b = new_event_id();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_ids_sort_by_time() {
        let a = new_event_id();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = new_event_id();
        assert!(a.as_str() < b.as_str());
    }
}
