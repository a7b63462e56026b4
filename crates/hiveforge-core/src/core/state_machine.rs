// hiveforge-core/src/core/state_machine.rs
// ============================================================================
// Module: Generic Finite State Machine Framework
// Description: Table-driven FSM plus the concrete Run/Task/Requirement/Hive/Colony machines.
// Purpose: Give every lifecycle entity the same transition contract and the oscillation detector (§4.4).
// Dependencies: std::collections::HashMap, serde
// ============================================================================

//! ## Overview
//! `StateMachine` is a registry keyed by `(from_state, event_type)` mapping
//! to an ordered list of candidate `Transition` edges. `transition` looks
//! the key up and takes the first edge whose guard is absent or passes; a
//! missing key or an all-guards-false key raises [`TransitionError`]. Most
//! machines register exactly one edge per key; the RA orchestrator's
//! payload-routed `GUARD_GATE` fan-out (§4.5) is the reason the table holds
//! a `Vec` rather than a single edge. The five lifecycle machines plus the
//! RA machine in §4.4/§4.5 are built as registries over this same framework
//! rather than hand-written per-type switch statements.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::collections::VecDeque;

use serde::Deserialize;
use serde::Serialize;

use crate::core::errors::GovernanceError;
use crate::core::errors::TransitionError;
use crate::core::event::EventType;
use crate::core::payload::Payload;
use crate::core::payload::PayloadValue;

// ============================================================================
// SECTION: Generic State Machine
// ============================================================================

/// A guard predicate evaluated against a transition's event payload.
pub type Guard = fn(&Payload) -> bool;

/// A single registered transition edge.
#[derive(Clone)]
pub struct Transition<S> {
    /// Destination state when this edge is taken.
    pub to: S,
    /// Optional guard; the edge is only taken if this returns `true`.
    pub guard: Option<Guard>,
}

/// Table-driven finite state machine over state type `S` (§4.4).
///
/// # Invariants
/// - `transition` only ever moves through registered `(state, event_type)` edges.
/// - A present guard that returns `false` raises [`TransitionError::GuardFailed`]
///   without changing state.
pub struct StateMachine<S> {
    state: S,
    table: HashMap<(S, EventType), Vec<Transition<S>>>,
}

impl<S> StateMachine<S>
where
    S: Clone + Eq + std::hash::Hash + std::fmt::Debug,
{
    /// Creates a machine starting at `initial` with an empty transition table.
    #[must_use]
    pub fn new(initial: S) -> Self {
        Self {
            state: initial,
            table: HashMap::new(),
        }
    }

    /// Registers a transition edge. Multiple edges may share the same
    /// `(from, event_type)` key — the RA orchestrator's GUARD_GATE ->
    /// RA_COMPLETED fan-out (§4.5) routes to different destinations by
    /// payload, so `transition` tries each registered edge in registration
    /// order and takes the first whose guard is absent or passes.
    pub fn add_edge(&mut self, from: S, event_type: EventType, to: S, guard: Option<Guard>) {
        self.table
            .entry((from, event_type))
            .or_default()
            .push(Transition { to, guard });
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Returns whether `event_type` has a registered edge from the current state.
    #[must_use]
    pub fn can_transition(&self, event_type: &EventType) -> bool {
        self.table
            .contains_key(&(self.state.clone(), event_type.clone()))
    }

    /// Returns the outgoing event types registered from the current state.
    #[must_use]
    pub fn valid_events(&self) -> Vec<EventType> {
        self.table
            .keys()
            .filter(|(from, _)| *from == self.state)
            .map(|(_, event_type)| event_type.clone())
            .collect()
    }

    /// Applies `event_type` with the associated `payload`, advancing state.
    ///
    /// When more than one edge is registered for `(current_state,
    /// event_type)` (a payload-routed fan-out), edges are tried in
    /// registration order and the first whose guard is absent or passes is
    /// taken.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTransition`] when no edge is
    /// registered for `(current_state, event_type)`, or
    /// [`TransitionError::GuardFailed`] when every registered guard rejects
    /// `payload`.
    pub fn transition(
        &mut self,
        event_type: &EventType,
        payload: &Payload,
    ) -> Result<S, TransitionError> {
        let key = (self.state.clone(), event_type.clone());
        let Some(edges) = self.table.get(&key) else {
            return Err(TransitionError::InvalidTransition {
                state: format!("{:?}", self.state),
                event: event_type.as_wire_str().to_string(),
            });
        };
        for edge in edges {
            let accepted = match edge.guard {
                Some(guard) => guard(payload),
                None => true,
            };
            if accepted {
                self.state = edge.to.clone();
                return Ok(self.state.clone());
            }
        }
        Err(TransitionError::GuardFailed(format!(
            "no guard accepted {:?} from {:?}",
            event_type, self.state
        )))
    }
}

// ============================================================================
// SECTION: Run State Machine
// ============================================================================

/// Run lifecycle states (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Actively executing.
    Running,
    /// Completed successfully.
    Completed,
    /// Failed.
    Failed,
    /// Aborted, including via emergency stop.
    Aborted,
}

/// Builds the Run state machine (§4.4): RUNNING is initial and terminal on
/// completion, failure, or abort (including emergency stop).
#[must_use]
pub fn run_state_machine() -> StateMachine<RunState> {
    let mut machine = StateMachine::new(RunState::Running);
    machine.add_edge(RunState::Running, EventType::RunCompleted, RunState::Completed, None);
    machine.add_edge(RunState::Running, EventType::RunFailed, RunState::Failed, None);
    machine.add_edge(RunState::Running, EventType::RunAborted, RunState::Aborted, None);
    machine.add_edge(
        RunState::Running,
        EventType::SystemEmergencyStop,
        RunState::Aborted,
        None,
    );
    machine
}

// ============================================================================
// SECTION: Task State Machine
// ============================================================================

/// Task lifecycle states (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Not yet started.
    Pending,
    /// Currently being worked.
    InProgress,
    /// Blocked on a dependency.
    Blocked,
    /// Completed successfully.
    Completed,
    /// Failed.
    Failed,
}

fn retry_guard(payload: &Payload) -> bool {
    let retry_count = match payload.get("retry_count") {
        Some(PayloadValue::Int(n)) => *n,
        _ => 0,
    };
    let max_retries = match payload.get("max_retries") {
        Some(PayloadValue::Int(n)) => *n,
        _ => 0,
    };
    retry_count < max_retries
}

/// Builds the Task state machine (§4.4). The `FAILED -> PENDING` retry edge
/// is guarded by `retry_count < max_retries`, read from the transitioning
/// event's payload; the caller is responsible for incrementing
/// `retry_count` on a successful retry transition.
#[must_use]
pub fn task_state_machine() -> StateMachine<TaskState> {
    let mut machine = StateMachine::new(TaskState::Pending);
    machine.add_edge(
        TaskState::Pending,
        EventType::TaskAssigned,
        TaskState::InProgress,
        None,
    );
    machine.add_edge(
        TaskState::InProgress,
        EventType::TaskBlocked,
        TaskState::Blocked,
        None,
    );
    machine.add_edge(
        TaskState::InProgress,
        EventType::TaskCompleted,
        TaskState::Completed,
        None,
    );
    machine.add_edge(
        TaskState::InProgress,
        EventType::TaskFailed,
        TaskState::Failed,
        None,
    );
    machine.add_edge(
        TaskState::Blocked,
        EventType::TaskUnblocked,
        TaskState::InProgress,
        None,
    );
    machine.add_edge(
        TaskState::Failed,
        EventType::TaskAssigned,
        TaskState::Pending,
        Some(retry_guard),
    );
    machine
}

// ============================================================================
// SECTION: Requirement State Machine
// ============================================================================

/// Requirement lifecycle states (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementState {
    /// Awaiting a decision.
    Pending,
    /// Approved.
    Approved,
    /// Rejected.
    Rejected,
}

/// Builds the Requirement state machine (§4.4).
#[must_use]
pub fn requirement_state_machine() -> StateMachine<RequirementState> {
    let mut machine = StateMachine::new(RequirementState::Pending);
    machine.add_edge(
        RequirementState::Pending,
        EventType::RequirementApproved,
        RequirementState::Approved,
        None,
    );
    machine.add_edge(
        RequirementState::Pending,
        EventType::RequirementRejected,
        RequirementState::Rejected,
        None,
    );
    machine
}

// ============================================================================
// SECTION: Hive State Machine
// ============================================================================

/// Hive lifecycle states (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiveState {
    /// At least one colony active.
    Active,
    /// No colony currently active.
    Idle,
    /// Closed; terminal.
    Closed,
}

/// Builds the Hive state machine (§4.4): ACTIVE and IDLE toggle via colony
/// lifecycle events; HIVE_CLOSED is terminal from either.
#[must_use]
pub fn hive_state_machine() -> StateMachine<HiveState> {
    let mut machine = StateMachine::new(HiveState::Active);
    machine.add_edge(
        HiveState::Active,
        EventType::ColonyCompleted,
        HiveState::Idle,
        None,
    );
    machine.add_edge(
        HiveState::Idle,
        EventType::ColonyCreated,
        HiveState::Active,
        None,
    );
    machine.add_edge(
        HiveState::Active,
        EventType::HiveClosed,
        HiveState::Closed,
        None,
    );
    machine.add_edge(
        HiveState::Idle,
        EventType::HiveClosed,
        HiveState::Closed,
        None,
    );
    machine
}

// ============================================================================
// SECTION: Colony State Machine
// ============================================================================

/// Colony lifecycle states (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColonyState {
    /// Not yet started.
    Pending,
    /// Actively executing.
    InProgress,
    /// Completed successfully.
    Completed,
    /// Failed.
    Failed,
    /// Suspended, typically by the Sentinel.
    Suspended,
}

/// Builds the Colony state machine (§4.4).
#[must_use]
pub fn colony_state_machine() -> StateMachine<ColonyState> {
    let mut machine = StateMachine::new(ColonyState::Pending);
    machine.add_edge(
        ColonyState::Pending,
        EventType::ColonyStarted,
        ColonyState::InProgress,
        None,
    );
    machine.add_edge(
        ColonyState::InProgress,
        EventType::ColonyCompleted,
        ColonyState::Completed,
        None,
    );
    machine.add_edge(
        ColonyState::InProgress,
        EventType::ColonyFailed,
        ColonyState::Failed,
        None,
    );
    machine.add_edge(
        ColonyState::InProgress,
        EventType::ColonySuspended,
        ColonyState::Suspended,
        None,
    );
    machine.add_edge(
        ColonyState::Suspended,
        EventType::ColonyStarted,
        ColonyState::InProgress,
        None,
    );
    machine.add_edge(
        ColonyState::Suspended,
        EventType::ColonyFailed,
        ColonyState::Failed,
        None,
    );
    machine
}

// ============================================================================
// SECTION: Requirement Analysis State Machine
// ============================================================================

/// The 16 states of the Requirement Analysis orchestrator (§4.5). The last
/// three are terminal: no edge is registered out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaState {
    /// Initial state; awaiting triage.
    Intake,
    /// Ambiguity/risk scoring complete.
    Triage,
    /// Gathering surrounding context.
    ContextEnrich,
    /// Consulting external research sources.
    WebResearch,
    /// Mining goals/constraints into an intent graph and assumptions.
    HypothesisBuild,
    /// Generating clarification questions.
    ClarifyGen,
    /// Awaiting/processing the user's answers.
    UserFeedback,
    /// Synthesizing a spec draft.
    SpecSynthesis,
    /// Persisting the draft to the vault (§4.5.4).
    SpecPersist,
    /// The user is editing the persisted draft directly.
    UserEdit,
    /// Running adversarial challenges against the draft.
    ChallengeReview,
    /// Comparing the draft against a referee pass.
    RefereeCompare,
    /// Running the eight-check Guard Gate.
    GuardGate,
    /// Terminal: ready to execute with no open risks.
    ExecutionReady,
    /// Terminal: ready to execute, with residual risks recorded.
    ExecutionReadyWithRisks,
    /// Terminal: analysis abandoned.
    Abandoned,
}

impl RaState {
    /// True for the three terminal states (§8 property 5): no outgoing
    /// transition is registered for any of them.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::ExecutionReady | Self::ExecutionReadyWithRisks | Self::Abandoned
        )
    }
}

fn outcome_is(payload: &Payload, expected: &str) -> bool {
    matches!(payload.get("outcome"), Some(PayloadValue::String(s)) if s == expected)
}

fn outcome_is_execution_ready(payload: &Payload) -> bool {
    outcome_is(payload, "execution_ready")
}

fn outcome_is_execution_ready_with_risks(payload: &Payload) -> bool {
    outcome_is(payload, "execution_ready_with_risks")
}

fn outcome_is_abandoned(payload: &Payload) -> bool {
    outcome_is(payload, "abandoned")
}

fn has_no_questions(payload: &Payload) -> bool {
    matches!(payload.get("question_count"), Some(PayloadValue::Int(0)) | None)
}

fn has_questions(payload: &Payload) -> bool {
    !has_no_questions(payload)
}

/// Builds the RA orchestrator state machine (§4.5).
///
/// `SPEC_PERSIST`, `USER_EDIT`, and `REFEREE_COMPARE` are named in the
/// state enumeration but the driver's abbreviated transition table never
/// names an event that enters or leaves them as standalone states — the
/// persister runs as part of the `SPEC_SYNTHESIS` step and a referee
/// comparison, where present, runs as part of `CHALLENGE_REVIEW` before
/// `RA_GATE_DECIDED`. They remain part of [`RaState`] for completeness and
/// future extension (see `DESIGN.md`).
#[must_use]
pub fn ra_state_machine() -> StateMachine<RaState> {
    let mut machine = StateMachine::new(RaState::Intake);
    machine.add_edge(RaState::Intake, EventType::RaTriageCompleted, RaState::Triage, None);
    machine.add_edge(RaState::Triage, EventType::RaContextEnriched, RaState::ContextEnrich, None);
    machine.add_edge(
        RaState::ContextEnrich,
        EventType::RaHypothesisBuilt,
        RaState::HypothesisBuild,
        None,
    );
    machine.add_edge(
        RaState::ContextEnrich,
        EventType::RaWebResearched,
        RaState::WebResearch,
        None,
    );
    machine.add_edge(
        RaState::WebResearch,
        EventType::RaHypothesisBuilt,
        RaState::HypothesisBuild,
        None,
    );
    machine.add_edge(
        RaState::HypothesisBuild,
        EventType::RaClarifyGenerated,
        RaState::ClarifyGen,
        None,
    );
    machine.add_edge(
        RaState::ClarifyGen,
        EventType::RaSpecSynthesized,
        RaState::SpecSynthesis,
        Some(has_no_questions),
    );
    machine.add_edge(
        RaState::ClarifyGen,
        EventType::RaUserResponded,
        RaState::UserFeedback,
        Some(has_questions),
    );
    machine.add_edge(
        RaState::UserFeedback,
        EventType::RaHypothesisBuilt,
        RaState::HypothesisBuild,
        None,
    );
    machine.add_edge(
        RaState::UserFeedback,
        EventType::RaSpecSynthesized,
        RaState::SpecSynthesis,
        None,
    );
    machine.add_edge(RaState::UserFeedback, EventType::RaCompleted, RaState::Abandoned, None);
    machine.add_edge(
        RaState::SpecSynthesis,
        EventType::RaChallengeReviewed,
        RaState::ChallengeReview,
        None,
    );
    machine.add_edge(
        RaState::ChallengeReview,
        EventType::RaGateDecided,
        RaState::GuardGate,
        None,
    );
    machine.add_edge(
        RaState::ChallengeReview,
        EventType::RaSpecSynthesized,
        RaState::SpecSynthesis,
        None,
    );
    // Payload-routed fan-out (§4.5): `canTransition` is true for all three,
    // but which edge fires depends on `payload.outcome`.
    machine.add_edge(
        RaState::GuardGate,
        EventType::RaCompleted,
        RaState::ExecutionReady,
        Some(outcome_is_execution_ready),
    );
    machine.add_edge(
        RaState::GuardGate,
        EventType::RaCompleted,
        RaState::ExecutionReadyWithRisks,
        Some(outcome_is_execution_ready_with_risks),
    );
    machine.add_edge(
        RaState::GuardGate,
        EventType::RaCompleted,
        RaState::Abandoned,
        Some(outcome_is_abandoned),
    );
    machine.add_edge(RaState::GuardGate, EventType::RaClarifyGenerated, RaState::ClarifyGen, None);
    machine
}

// ============================================================================
// SECTION: Oscillation Detector
// ============================================================================

/// Bounded-history monitor that flags a state machine bouncing between the
/// same two states (§4.4). The detector never blocks a transition; it only
/// surfaces a policy violation for the orchestrator to act on.
pub struct OscillationDetector<S> {
    max_oscillations: u32,
    history: VecDeque<S>,
}

impl<S: Clone + PartialEq + std::fmt::Debug> OscillationDetector<S> {
    /// Creates a detector that raises after `max_oscillations` repeats of a
    /// two-state cycle.
    #[must_use]
    pub fn new(max_oscillations: u32) -> Self {
        Self {
            max_oscillations,
            history: VecDeque::new(),
        }
    }

    /// Records a newly entered state and checks for oscillation.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Oscillation`] once the trailing
    /// `2 * max_oscillations` states resolve to exactly two distinct values
    /// alternating strictly (even-indexed entries all equal, odd-indexed
    /// entries all equal, and the two differ).
    pub fn record(&mut self, state: S) -> Result<(), GovernanceError> {
        self.history.push_back(state);
        let window = (2 * self.max_oscillations) as usize;
        while self.history.len() > window {
            self.history.pop_front();
        }
        if self.history.len() < window || window == 0 {
            return Ok(());
        }
        let entries: Vec<&S> = self.history.iter().collect();
        let evens: Vec<&&S> = entries.iter().step_by(2).collect();
        let odds: Vec<&&S> = entries.iter().skip(1).step_by(2).collect();
        let evens_uniform = evens.windows(2).all(|w| w[0] == w[1]);
        let odds_uniform = odds.windows(2).all(|w| w[0] == w[1]);
        let distinct_pair = !evens.is_empty() && !odds.is_empty() && evens[0] != odds[0];
        if evens_uniform && odds_uniform && distinct_pair {
            return Err(GovernanceError::Oscillation {
                a: format!("{:?}", evens[0]),
                b: format!("{:?}", odds[0]),
                count: self.max_oscillations,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_machine_transitions_to_completed() {
        let mut machine = run_state_machine();
        let payload = Payload::new();
        let state = machine
            .transition(&EventType::RunCompleted, &payload)
            .expect("transition");
        assert_eq!(state, RunState::Completed);
    }

    #[test]
    fn invalid_event_is_rejected() {
        let mut machine = run_state_machine();
        let payload = Payload::new();
        let err = machine
            .transition(&EventType::TaskCompleted, &payload)
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
    }

    #[test]
    fn task_retry_guard_blocks_when_exhausted() {
        let mut machine = task_state_machine();
        machine
            .transition(&EventType::TaskAssigned, &Payload::new())
            .expect("assign");
        machine
            .transition(&EventType::TaskFailed, &Payload::new())
            .expect("fail");
        let mut payload = Payload::new();
        payload.insert("retry_count".to_string(), PayloadValue::Int(3));
        payload.insert("max_retries".to_string(), PayloadValue::Int(3));
        let err = machine
            .transition(&EventType::TaskAssigned, &payload)
            .unwrap_err();
        assert!(matches!(err, TransitionError::GuardFailed(_)));
    }

    #[test]
    fn oscillation_detector_raises_after_bound() {
        let mut detector = OscillationDetector::new(2);
        for i in 0..4 {
            let result = detector.record(if i % 2 == 0 { "a" } else { "b" });
            if i < 3 {
                assert!(result.is_ok());
            } else {
                assert!(matches!(result, Err(GovernanceError::Oscillation { .. })));
            }
        }
    }

    #[test]
    fn oscillation_detector_ignores_varied_history() {
        let mut detector = OscillationDetector::new(2);
        for state in ["a", "b", "c", "a"] {
            assert!(detector.record(state).is_ok());
        }
    }

    fn drive_to_guard_gate() -> StateMachine<RaState> {
        let mut machine = ra_state_machine();
        let empty = Payload::new();
        machine
            .transition(&EventType::RaTriageCompleted, &empty)
            .expect("triage");
        machine
            .transition(&EventType::RaContextEnriched, &empty)
            .expect("context enrich");
        machine
            .transition(&EventType::RaHypothesisBuilt, &empty)
            .expect("hypothesis build");
        machine
            .transition(&EventType::RaClarifyGenerated, &empty)
            .expect("clarify gen");
        let mut no_questions = Payload::new();
        no_questions.insert("question_count".to_string(), PayloadValue::Int(0));
        machine
            .transition(&EventType::RaSpecSynthesized, &no_questions)
            .expect("spec synthesis");
        machine
            .transition(&EventType::RaChallengeReviewed, &empty)
            .expect("challenge review");
        machine
            .transition(&EventType::RaGateDecided, &empty)
            .expect("gate decided");
        assert_eq!(machine.state(), &RaState::GuardGate);
        machine
    }

    #[test]
    fn ra_machine_routes_straight_line_to_guard_gate() {
        drive_to_guard_gate();
    }

    #[test]
    fn ra_machine_fans_out_to_execution_ready() {
        let mut machine = drive_to_guard_gate();
        let mut payload = Payload::new();
        payload.insert("outcome".to_string(), PayloadValue::String("execution_ready".to_string()));
        let state = machine
            .transition(&EventType::RaCompleted, &payload)
            .expect("fan-out");
        assert_eq!(state, RaState::ExecutionReady);
        assert!(machine.valid_events().is_empty());
    }

    #[test]
    fn ra_machine_fans_out_to_execution_ready_with_risks() {
        let mut machine = drive_to_guard_gate();
        let mut payload = Payload::new();
        payload.insert(
            "outcome".to_string(),
            PayloadValue::String("execution_ready_with_risks".to_string()),
        );
        let state = machine
            .transition(&EventType::RaCompleted, &payload)
            .expect("fan-out");
        assert_eq!(state, RaState::ExecutionReadyWithRisks);
    }

    #[test]
    fn ra_machine_fans_out_to_abandoned() {
        let mut machine = drive_to_guard_gate();
        let mut payload = Payload::new();
        payload.insert("outcome".to_string(), PayloadValue::String("abandoned".to_string()));
        let state = machine
            .transition(&EventType::RaCompleted, &payload)
            .expect("fan-out");
        assert_eq!(state, RaState::Abandoned);
    }

    #[test]
    fn ra_machine_rejects_unrecognized_outcome() {
        let mut machine = drive_to_guard_gate();
        let mut payload = Payload::new();
        payload.insert("outcome".to_string(), PayloadValue::String("mystery".to_string()));
        let err = machine
            .transition(&EventType::RaCompleted, &payload)
            .unwrap_err();
        assert!(matches!(err, TransitionError::GuardFailed(_)));
    }

    #[test]
    fn ra_terminal_states_have_no_outgoing_transitions() {
        for terminal in [
            RaState::ExecutionReady,
            RaState::ExecutionReadyWithRisks,
            RaState::Abandoned,
        ] {
            assert!(terminal.is_terminal());
        }
        let mut machine = drive_to_guard_gate();
        let mut payload = Payload::new();
        payload.insert("outcome".to_string(), PayloadValue::String("execution_ready".to_string()));
        machine
            .transition(&EventType::RaCompleted, &payload)
            .expect("reach terminal");
        assert!(machine.valid_events().is_empty());
    }
}
