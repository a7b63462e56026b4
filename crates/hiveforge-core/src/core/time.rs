// hiveforge-core/src/core/time.rs
// ============================================================================
// Module: Akashic Record Time Model
// Description: Canonical UTC timestamp representation for events and logs.
// Purpose: Provide a deterministic, RFC 3339 wire form (§6.2) for event time.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Every event carries an explicit UTC instant. The core never reads
//! wall-clock time itself; callers supply timestamps through the `Clock`
//! capability (`hiveforge_core::interfaces::Clock`) so that replay stays
//! deterministic and testable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as DeError;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Canonical UTC instant used throughout the Akashic Record.
///
/// # Invariants
/// - Always serializes as an RFC 3339 string in UTC (`§6.2`).
/// - No validation beyond what `time::OffsetDateTime` already enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Wraps an existing `OffsetDateTime`, normalizing it to UTC.
    #[must_use]
    pub fn new(at: OffsetDateTime) -> Self {
        Self(at.to_offset(time::UtcOffset::UTC))
    }

    /// Returns the inner `OffsetDateTime`.
    #[must_use]
    pub const fn as_offset_date_time(&self) -> OffsetDateTime {
        self.0
    }

    /// Returns the RFC 3339 string form used on the wire.
    ///
    /// # Panics
    ///
    /// Panics only if `time`'s RFC 3339 formatter rejects a UTC
    /// `OffsetDateTime`, which does not happen for values produced by this
    /// type.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
    }

    /// Parses an RFC 3339 string into a `Timestamp`.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is not valid RFC 3339.
    pub fn parse(value: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(value, &Rfc3339).map(Self::new)
    }

    /// Returns the duration elapsed between `self` and a later timestamp.
    #[must_use]
    pub fn elapsed_since(&self, earlier: &Self) -> time::Duration {
        self.0 - earlier.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(DeError::custom)
    }
}

/// Capability for obtaining the current UTC instant.
///
/// The core never calls `OffsetDateTime::now_utc()` directly outside of this
/// trait's implementations; orchestration layers inject a `Clock` so that
/// tests can supply deterministic sequences of timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current UTC instant.
    fn now(&self) -> Timestamp;
}

/// `Clock` backed by the operating system's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(OffsetDateTime::now_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_rfc3339() {
        let original = Timestamp::new(OffsetDateTime::UNIX_EPOCH);
        let text = original.to_rfc3339();
        let parsed = Timestamp::parse(&text).expect("parse rfc3339");
        assert_eq!(original, parsed);
    }

    #[test]
    fn serializes_as_string() {
        let stamp = Timestamp::new(OffsetDateTime::UNIX_EPOCH);
        let json = serde_json::to_string(&stamp).expect("serialize");
        assert_eq!(json, "\"1970-01-01T00:00:00Z\"");
    }
}
