// hiveforge-core/src/core/errors.rs
// ============================================================================
// Module: Core Domain Errors
// Description: Cross-cutting error kinds shared by the state machine and projections.
// Purpose: Give every domain-layer failure a typed, non-panicking representation.
// Dependencies: thiserror
// ============================================================================

use thiserror::Error;

/// Errors raised while attempting a state transition (§4.4).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The requested event is not valid from the current state.
    #[error("cannot apply event {event:?} from state {state:?}")]
    InvalidTransition {
        /// The state the machine was in.
        state: String,
        /// The event type that was rejected.
        event: String,
    },
    /// A transition's guard condition was not satisfied.
    #[error("guard condition failed for transition: {0}")]
    GuardFailed(String),
}

/// Errors raised by the oscillation/governance detector (§4.4).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernanceError {
    /// The same two-state cycle repeated beyond the allowed bound.
    #[error("oscillation detected: states {a} <-> {b} repeated {count} times")]
    Oscillation {
        /// One of the two states in the cycle.
        a: String,
        /// The other state in the cycle.
        b: String,
        /// Number of times the cycle repeated.
        count: u32,
    },
}
