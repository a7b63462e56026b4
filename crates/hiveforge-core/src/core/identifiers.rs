// hiveforge-core/src/core/identifiers.rs
// ============================================================================
// Module: HiveForge Identifiers
// Description: Canonical opaque identifiers for Akashic Record entities.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every cross-referenced entity in the Akashic Record (events, runs, hives,
//! colonies, tasks, workers, requirements, conferences, episodes, and the RA
//! pipeline's working documents) gets its own opaque newtype identifier. All
//! of them share one shape — an owned UTF-8 string with no internal
//! normalization — so they are defined once through `id_type!` rather than by
//! hand per type, the way the upstream identifier module in this corpus does
//! it for a much smaller identifier surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

macro_rules! id_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Invariants
        /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new ", stringify!($name), ".")]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the owned string.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

// ============================================================================
// SECTION: Event Stream Identifiers
// ============================================================================

id_type!(EventId, "Globally unique, lexicographically sortable event identifier (§3.1).");
id_type!(RunId, "Run identifier; keys one Akashic Record stream (§4.2).");
id_type!(HiveId, "Hive identifier; keys one HiveStore stream (§4.2).");
id_type!(ColonyId, "Colony identifier; scopes a sub-project within a Hive.");
id_type!(TaskId, "Task identifier scoped to a Run.");
id_type!(WorkerId, "Worker Bee identifier.");
id_type!(RequirementId, "Requirement identifier scoped to a Run.");
id_type!(ConferenceId, "Conference identifier scoped to a Hive.");

// ============================================================================
// SECTION: Requirement Analysis Identifiers
// ============================================================================

id_type!(AssumptionId, "Assumption identifier within an RA analysis run.");
id_type!(HypothesisId, "Failure hypothesis identifier within an RA analysis run.");
id_type!(QuestionId, "Clarification question identifier within an RA analysis run.");
id_type!(ChallengeId, "Challenge identifier within a challenge report.");
id_type!(ReportId, "Challenge report identifier.");
id_type!(DraftId, "Spec draft identifier.");
id_type!(DocId, "Persisted requirement document identifier (`<PREFIX><NNN>`, §4.5.4).");

// ============================================================================
// SECTION: Sentinel / Guard / Conflict Identifiers
// ============================================================================

id_type!(AlertId, "Sentinel Hornet alert identifier.");
id_type!(ResourceId, "Resource identifier claimed by colonies (§4.12).");
id_type!(ApprovalRequestId, "Approval request identifier for irreversible actions (§4.6).");

// ============================================================================
// SECTION: Honeycomb Identifiers
// ============================================================================

id_type!(EpisodeId, "Honeycomb episode identifier (§3.5).");

// ============================================================================
// SECTION: Actors
// ============================================================================

/// Free-form actor string attached to every event (`"user"`, `"system"`,
/// `"queen-<id>"`, …). Intentionally not a closed enum: §3.1 describes
/// it as free-form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Creates a new actor identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the actor string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `"system"` actor, used for core-generated events.
    #[must_use]
    pub fn system() -> Self {
        Self::new("system")
    }

    /// The `"user"` actor.
    #[must_use]
    pub fn user() -> Self {
        Self::new("user")
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Actor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Actor {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_json() {
        let id = RunId::new("run-1");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"run-1\"");
        let back: RunId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn actor_defaults() {
        assert_eq!(Actor::system().as_str(), "system");
        assert_eq!(Actor::user().as_str(), "user");
    }
}
