// hiveforge-core/src/core/event.rs
// ============================================================================
// Module: Akashic Record Event Model
// Description: The closed event-type enumeration and the immutable Event record.
// Purpose: Provide the atomic, hash-chained unit of the Akashic Record (§3.1, §6.1, §6.2).
// Dependencies: crate::core::{hashing, identifiers, payload, time}, serde, serde_json
// ============================================================================

//! ## Overview
//! An [`Event`] is the atomic, immutable unit of the Akashic Record. Its wire
//! type discriminator is a closed enumeration (§6.1); an unrecognized type
//! string degrades to [`EventType::Unknown`] so that older readers can replay
//! logs written by newer writers without losing the record (forward
//! compatibility, §4.1). `Event::finalized` computes `hash` as the SHA-256 of
//! the RFC 8785 canonical form of every field except `hash` itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::Actor;
use crate::core::identifiers::ColonyId;
use crate::core::identifiers::EventId;
use crate::core::identifiers::HiveId;
use crate::core::identifiers::RunId;
use crate::core::identifiers::TaskId;
use crate::core::identifiers::WorkerId;
use crate::core::payload::Payload;
use crate::core::payload::PayloadValue;
use crate::core::time::Timestamp;

/// Maximum size, in bytes of the canonical JSON form, an `UnknownEvent`
/// payload may retain before being replaced by a truncation sentinel (§4.1).
pub const UNKNOWN_PAYLOAD_MAX_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Event Type Enumeration
// ============================================================================

/// The closed wire-level event type enumeration (§6.1).
///
/// # Invariants
/// - `as_wire_str`/`from_wire_str` round-trip for every non-`Unknown` variant.
/// - An unrecognized wire string is preserved verbatim in `Unknown` rather
///   than rejected, so replay is forward-compatible with newer writers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    /// `hive.created`
    HiveCreated,
    /// `hive.closed`
    HiveClosed,
    /// `colony.created`
    ColonyCreated,
    /// `colony.started`
    ColonyStarted,
    /// `colony.suspended`
    ColonySuspended,
    /// `colony.completed`
    ColonyCompleted,
    /// `colony.failed`
    ColonyFailed,
    /// `run.started`
    RunStarted,
    /// `run.completed`
    RunCompleted,
    /// `run.failed`
    RunFailed,
    /// `run.aborted`
    RunAborted,
    /// `task.created`
    TaskCreated,
    /// `task.assigned`
    TaskAssigned,
    /// `task.progressed`
    TaskProgressed,
    /// `task.completed`
    TaskCompleted,
    /// `task.failed`
    TaskFailed,
    /// `task.blocked`
    TaskBlocked,
    /// `task.unblocked`
    TaskUnblocked,
    /// `requirement.created`
    RequirementCreated,
    /// `requirement.approved`
    RequirementApproved,
    /// `requirement.rejected`
    RequirementRejected,
    /// `decision.recorded`
    DecisionRecorded,
    /// `proposal.created`
    ProposalCreated,
    /// `proposal.applied`
    ProposalApplied,
    /// `proposal.superseded`
    ProposalSuperseded,
    /// `conference.started`
    ConferenceStarted,
    /// `conference.ended`
    ConferenceEnded,
    /// `conflict.detected`
    ConflictDetected,
    /// `conflict.resolved`
    ConflictResolved,
    /// `operation.timeout`
    OperationTimeout,
    /// `operation.failed`
    OperationFailed,
    /// `intervention.user_direct`
    InterventionUserDirect,
    /// `intervention.queen_escalation`
    InterventionQueenEscalation,
    /// `intervention.beekeeper_feedback`
    InterventionBeekeeperFeedback,
    /// `worker.assigned`
    WorkerAssigned,
    /// `worker.started`
    WorkerStarted,
    /// `worker.progress`
    WorkerProgress,
    /// `worker.completed`
    WorkerCompleted,
    /// `worker.failed`
    WorkerFailed,
    /// `llm.request`
    LlmRequest,
    /// `llm.response`
    LlmResponse,
    /// `sentinel.alert_raised`
    SentinelAlertRaised,
    /// `sentinel.report`
    SentinelReport,
    /// `guard.verification_requested`
    GuardVerificationRequested,
    /// `guard.passed`
    GuardPassed,
    /// `guard.conditional_passed`
    GuardConditionalPassed,
    /// `guard.failed`
    GuardFailed,
    /// `system.heartbeat`
    SystemHeartbeat,
    /// `system.error`
    SystemError,
    /// `system.silence_detected`
    SystemSilenceDetected,
    /// `system.emergency_stop`
    SystemEmergencyStop,
    /// `ra.intake_received`
    RaIntakeReceived,
    /// `ra.triage_completed`
    RaTriageCompleted,
    /// `ra.context_enriched`
    RaContextEnriched,
    /// `ra.web_researched`
    RaWebResearched,
    /// `ra.web_skipped`
    RaWebSkipped,
    /// `ra.hypothesis_built`
    RaHypothesisBuilt,
    /// `ra.clarify_generated`
    RaClarifyGenerated,
    /// `ra.user_responded`
    RaUserResponded,
    /// `ra.spec_synthesized`
    RaSpecSynthesized,
    /// `ra.challenge_reviewed`
    RaChallengeReviewed,
    /// `ra.referee_compared`
    RaRefereeCompared,
    /// `ra.gate_decided`
    RaGateDecided,
    /// `ra.completed`
    RaCompleted,
    /// `github.issue_created`
    GithubIssueCreated,
    /// `github.issue_updated`
    GithubIssueUpdated,
    /// `github.issue_closed`
    GithubIssueClosed,
    /// `github.comment_added`
    GithubCommentAdded,
    /// `github.label_applied`
    GithubLabelApplied,
    /// `github.project_synced`
    GithubProjectSynced,
    /// An event type string outside the closed enumeration. Preserved
    /// verbatim so forward-compatible replay never loses data (§4.1).
    Unknown(String),
}

impl EventType {
    /// Returns the wire-level dotted string for this event type.
    #[must_use]
    pub fn as_wire_str(&self) -> &str {
        match self {
            Self::HiveCreated => "hive.created",
            Self::HiveClosed => "hive.closed",
            Self::ColonyCreated => "colony.created",
            Self::ColonyStarted => "colony.started",
            Self::ColonySuspended => "colony.suspended",
            Self::ColonyCompleted => "colony.completed",
            Self::ColonyFailed => "colony.failed",
            Self::RunStarted => "run.started",
            Self::RunCompleted => "run.completed",
            Self::RunFailed => "run.failed",
            Self::RunAborted => "run.aborted",
            Self::TaskCreated => "task.created",
            Self::TaskAssigned => "task.assigned",
            Self::TaskProgressed => "task.progressed",
            Self::TaskCompleted => "task.completed",
            Self::TaskFailed => "task.failed",
            Self::TaskBlocked => "task.blocked",
            Self::TaskUnblocked => "task.unblocked",
            Self::RequirementCreated => "requirement.created",
            Self::RequirementApproved => "requirement.approved",
            Self::RequirementRejected => "requirement.rejected",
            Self::DecisionRecorded => "decision.recorded",
            Self::ProposalCreated => "proposal.created",
            Self::ProposalApplied => "proposal.applied",
            Self::ProposalSuperseded => "proposal.superseded",
            Self::ConferenceStarted => "conference.started",
            Self::ConferenceEnded => "conference.ended",
            Self::ConflictDetected => "conflict.detected",
            Self::ConflictResolved => "conflict.resolved",
            Self::OperationTimeout => "operation.timeout",
            Self::OperationFailed => "operation.failed",
            Self::InterventionUserDirect => "intervention.user_direct",
            Self::InterventionQueenEscalation => "intervention.queen_escalation",
            Self::InterventionBeekeeperFeedback => "intervention.beekeeper_feedback",
            Self::WorkerAssigned => "worker.assigned",
            Self::WorkerStarted => "worker.started",
            Self::WorkerProgress => "worker.progress",
            Self::WorkerCompleted => "worker.completed",
            Self::WorkerFailed => "worker.failed",
            Self::LlmRequest => "llm.request",
            Self::LlmResponse => "llm.response",
            Self::SentinelAlertRaised => "sentinel.alert_raised",
            Self::SentinelReport => "sentinel.report",
            Self::GuardVerificationRequested => "guard.verification_requested",
            Self::GuardPassed => "guard.passed",
            Self::GuardConditionalPassed => "guard.conditional_passed",
            Self::GuardFailed => "guard.failed",
            Self::SystemHeartbeat => "system.heartbeat",
            Self::SystemError => "system.error",
            Self::SystemSilenceDetected => "system.silence_detected",
            Self::SystemEmergencyStop => "system.emergency_stop",
            Self::RaIntakeReceived => "ra.intake_received",
            Self::RaTriageCompleted => "ra.triage_completed",
            Self::RaContextEnriched => "ra.context_enriched",
            Self::RaWebResearched => "ra.web_researched",
            Self::RaWebSkipped => "ra.web_skipped",
            Self::RaHypothesisBuilt => "ra.hypothesis_built",
            Self::RaClarifyGenerated => "ra.clarify_generated",
            Self::RaUserResponded => "ra.user_responded",
            Self::RaSpecSynthesized => "ra.spec_synthesized",
            Self::RaChallengeReviewed => "ra.challenge_reviewed",
            Self::RaRefereeCompared => "ra.referee_compared",
            Self::RaGateDecided => "ra.gate_decided",
            Self::RaCompleted => "ra.completed",
            Self::GithubIssueCreated => "github.issue_created",
            Self::GithubIssueUpdated => "github.issue_updated",
            Self::GithubIssueClosed => "github.issue_closed",
            Self::GithubCommentAdded => "github.comment_added",
            Self::GithubLabelApplied => "github.label_applied",
            Self::GithubProjectSynced => "github.project_synced",
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    /// Parses a wire-level event type string, falling back to
    /// [`EventType::Unknown`] for anything outside the closed enumeration.
    #[must_use]
    pub fn from_wire_str(raw: &str) -> Self {
        match raw {
            "hive.created" => Self::HiveCreated,
            "hive.closed" => Self::HiveClosed,
            "colony.created" => Self::ColonyCreated,
            "colony.started" => Self::ColonyStarted,
            "colony.suspended" => Self::ColonySuspended,
            "colony.completed" => Self::ColonyCompleted,
            "colony.failed" => Self::ColonyFailed,
            "run.started" => Self::RunStarted,
            "run.completed" => Self::RunCompleted,
            "run.failed" => Self::RunFailed,
            "run.aborted" => Self::RunAborted,
            "task.created" => Self::TaskCreated,
            "task.assigned" => Self::TaskAssigned,
            "task.progressed" => Self::TaskProgressed,
            "task.completed" => Self::TaskCompleted,
            "task.failed" => Self::TaskFailed,
            "task.blocked" => Self::TaskBlocked,
            "task.unblocked" => Self::TaskUnblocked,
            "requirement.created" => Self::RequirementCreated,
            "requirement.approved" => Self::RequirementApproved,
            "requirement.rejected" => Self::RequirementRejected,
            "decision.recorded" => Self::DecisionRecorded,
            "proposal.created" => Self::ProposalCreated,
            "proposal.applied" => Self::ProposalApplied,
            "proposal.superseded" => Self::ProposalSuperseded,
            "conference.started" => Self::ConferenceStarted,
            "conference.ended" => Self::ConferenceEnded,
            "conflict.detected" => Self::ConflictDetected,
            "conflict.resolved" => Self::ConflictResolved,
            "operation.timeout" => Self::OperationTimeout,
            "operation.failed" => Self::OperationFailed,
            "intervention.user_direct" => Self::InterventionUserDirect,
            "intervention.queen_escalation" => Self::InterventionQueenEscalation,
            "intervention.beekeeper_feedback" => Self::InterventionBeekeeperFeedback,
            "worker.assigned" => Self::WorkerAssigned,
            "worker.started" => Self::WorkerStarted,
            "worker.progress" => Self::WorkerProgress,
            "worker.completed" => Self::WorkerCompleted,
            "worker.failed" => Self::WorkerFailed,
            "llm.request" => Self::LlmRequest,
            "llm.response" => Self::LlmResponse,
            "sentinel.alert_raised" => Self::SentinelAlertRaised,
            "sentinel.report" => Self::SentinelReport,
            "guard.verification_requested" => Self::GuardVerificationRequested,
            "guard.passed" => Self::GuardPassed,
            "guard.conditional_passed" => Self::GuardConditionalPassed,
            "guard.failed" => Self::GuardFailed,
            "system.heartbeat" => Self::SystemHeartbeat,
            "system.error" => Self::SystemError,
            "system.silence_detected" => Self::SystemSilenceDetected,
            "system.emergency_stop" => Self::SystemEmergencyStop,
            "ra.intake_received" => Self::RaIntakeReceived,
            "ra.triage_completed" => Self::RaTriageCompleted,
            "ra.context_enriched" => Self::RaContextEnriched,
            "ra.web_researched" => Self::RaWebResearched,
            "ra.web_skipped" => Self::RaWebSkipped,
            "ra.hypothesis_built" => Self::RaHypothesisBuilt,
            "ra.clarify_generated" => Self::RaClarifyGenerated,
            "ra.user_responded" => Self::RaUserResponded,
            "ra.spec_synthesized" => Self::RaSpecSynthesized,
            "ra.challenge_reviewed" => Self::RaChallengeReviewed,
            "ra.referee_compared" => Self::RaRefereeCompared,
            "ra.gate_decided" => Self::RaGateDecided,
            "ra.completed" => Self::RaCompleted,
            "github.issue_created" => Self::GithubIssueCreated,
            "github.issue_updated" => Self::GithubIssueUpdated,
            "github.issue_closed" => Self::GithubIssueClosed,
            "github.comment_added" => Self::GithubCommentAdded,
            "github.label_applied" => Self::GithubLabelApplied,
            "github.project_synced" => Self::GithubProjectSynced,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns true when this type fell outside the closed enumeration.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire_str(&raw))
    }
}

// ============================================================================
// SECTION: Event Record
// ============================================================================

/// The atomic, immutable unit of the Akashic Record (§3.1, §6.2).
///
/// # Invariants
/// - `hash` is the SHA-256 of the RFC 8785 canonical form of every other
///   field (`Event::hash_input`), computed by [`Event::finalized`].
/// - `prev_hash` equals the previous event's `hash` in the same stream, or
///   is `None` at the stream head (the chain invariant, §3.1, verified by
///   `hiveforge_storage::verify_chain`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Globally unique, time-ordered identifier.
    pub id: EventId,
    /// Wire-level event type discriminator.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// UTC instant the event was recorded.
    pub timestamp: Timestamp,
    /// Run stream key, when this event belongs to a run stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    /// Hive stream key, used in place of `run_id` for hive-scoped events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hive_id: Option<HiveId>,
    /// Colony cross-reference tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colony_id: Option<ColonyId>,
    /// Task cross-reference tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    /// Worker cross-reference tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<WorkerId>,
    /// Free-form actor string.
    pub actor: Actor,
    /// Ordered event payload.
    #[serde(default)]
    pub payload: Payload,
    /// Hash of the previous event in the same stream, or `None` at the head.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,
    /// Ordered list of causally-preceding event ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<EventId>,
    /// SHA-256 of the canonical form of every other field, lowercase hex.
    /// Empty until [`Event::finalized`] is called.
    #[serde(default)]
    pub hash: String,
}

/// The subset of [`Event`] that participates in canonical hashing: every
/// field except `hash` itself (§3.1, §4.1).
#[derive(Serialize)]
struct HashInput<'a> {
    id: &'a EventId,
    #[serde(rename = "type")]
    event_type: &'a EventType,
    timestamp: &'a Timestamp,
    run_id: &'a Option<RunId>,
    hive_id: &'a Option<HiveId>,
    colony_id: &'a Option<ColonyId>,
    task_id: &'a Option<TaskId>,
    worker_id: &'a Option<WorkerId>,
    actor: &'a Actor,
    payload: &'a Payload,
    prev_hash: &'a Option<String>,
    parents: &'a [EventId],
}

impl Event {
    /// Computes this event's canonical hash and returns a copy with `hash`
    /// populated. `prev_hash` must already be set by the caller (the
    /// storage layer resolves it from the stream tail before calling this).
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the payload cannot be canonicalized.
    pub fn finalized(mut self) -> Result<Self, HashError> {
        let input = HashInput {
            id: &self.id,
            event_type: &self.event_type,
            timestamp: &self.timestamp,
            run_id: &self.run_id,
            hive_id: &self.hive_id,
            colony_id: &self.colony_id,
            task_id: &self.task_id,
            worker_id: &self.worker_id,
            actor: &self.actor,
            payload: &self.payload,
            prev_hash: &self.prev_hash,
            parents: &self.parents,
        };
        self.hash = hash_canonical_json(HashAlgorithm::Sha256, &input)?;
        Ok(self)
    }

    /// Returns the stream key this event belongs to: `run_id` if present,
    /// otherwise `hive_id` (§3.1).
    #[must_use]
    pub fn stream_key(&self) -> Option<&str> {
        self.run_id
            .as_ref()
            .map(RunId::as_str)
            .or_else(|| self.hive_id.as_ref().map(HiveId::as_str))
    }
}

/// A preserved record of an event whose `type` fell outside the closed
/// enumeration (§4.1). The payload is bounded at
/// [`UNKNOWN_PAYLOAD_MAX_BYTES`]; oversized payloads are replaced with a
/// truncation sentinel so the record stays bounded in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownEvent {
    /// The original, unrecognized wire type string.
    pub original_type: String,
    /// The underlying event, with its payload bounded as described above.
    pub event: Event,
}

/// Sentinel payload key marking a payload that was replaced because it
/// exceeded [`UNKNOWN_PAYLOAD_MAX_BYTES`] in canonical form.
pub const TRUNCATION_SENTINEL_KEY: &str = "_truncated";
/// Sentinel payload key carrying the original, oversized size in bytes.
pub const TRUNCATION_ORIGINAL_SIZE_KEY: &str = "_original_size";
/// Sentinel payload key carrying the bound that was exceeded.
pub const TRUNCATION_MAX_SIZE_KEY: &str = "_max_size";

/// Parses a wire-level event from its JSON object form, bounding any
/// unknown-type payload per §4.1.
///
/// # Errors
///
/// Returns an error if `raw` is not a valid JSON object shaped like an
/// [`Event`].
pub fn parse_event(raw: &serde_json::Value) -> Result<Event, serde_json::Error> {
    let event: Event = serde_json::from_value(raw.clone())?;
    Ok(bound_unknown_payload(event))
}

fn bound_unknown_payload(mut event: Event) -> Event {
    if !event.event_type.is_unknown() {
        return event;
    }
    let size = crate::core::hashing::canonical_json_bytes(&event.payload)
        .map(|bytes| bytes.len())
        .unwrap_or(usize::MAX);
    if size > UNKNOWN_PAYLOAD_MAX_BYTES {
        let mut truncated = Payload::new();
        truncated.insert(TRUNCATION_SENTINEL_KEY.to_string(), PayloadValue::Bool(true));
        truncated.insert(
            TRUNCATION_ORIGINAL_SIZE_KEY.to_string(),
            PayloadValue::Int(size as i64),
        );
        truncated.insert(
            TRUNCATION_MAX_SIZE_KEY.to_string(),
            PayloadValue::Int(UNKNOWN_PAYLOAD_MAX_BYTES as i64),
        );
        truncated.insert(
            "type".to_string(),
            PayloadValue::String(event.event_type.as_wire_str().to_string()),
        );
        event.payload = truncated;
    }
    event
}
