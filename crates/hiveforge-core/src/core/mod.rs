// hiveforge-core/src/core/mod.rs
// ============================================================================
// Module: Core Domain
// Description: Submodule wiring for the Akashic Record domain model.
// Purpose: Re-export the stable public surface of the core domain.
// ============================================================================

pub mod conflict;
pub mod errors;
pub mod event;
pub mod guard_domain;
pub mod hashing;
pub mod honeycomb_domain;
pub mod identifiers;
pub mod payload;
pub mod policy;
pub mod projections;
pub mod ra_domain;
pub mod state_machine;
pub mod time;

pub use conflict::Conflict;
pub use conflict::ClaimOperation;
pub use conflict::ConflictSeverity;
pub use conflict::ConflictType;
pub use conflict::ResourceClaim;
pub use conflict::ResourceType;
pub use conflict::claims_conflict;
pub use conflict::infer_severity;
pub use errors::GovernanceError;
pub use errors::TransitionError;
pub use event::Event;
pub use event::EventType;
pub use event::UnknownEvent;
pub use event::parse_event;
pub use guard_domain::Evidence;
pub use guard_domain::EvidenceType;
pub use guard_domain::GuardBeeReport;
pub use guard_domain::RuleLevel;
pub use guard_domain::RuleResult;
pub use guard_domain::Verdict;
pub use hashing::HashAlgorithm;
pub use hashing::HashError;
pub use honeycomb_domain::Episode;
pub use honeycomb_domain::FailureClass;
pub use honeycomb_domain::KpiScores;
pub use honeycomb_domain::Outcome;
pub use identifiers::Actor;
pub use identifiers::AlertId;
pub use identifiers::ApprovalRequestId;
pub use identifiers::AssumptionId;
pub use identifiers::ChallengeId;
pub use identifiers::ColonyId;
pub use identifiers::ConferenceId;
pub use identifiers::DocId;
pub use identifiers::DraftId;
pub use identifiers::EpisodeId;
pub use identifiers::EventId;
pub use identifiers::HiveId;
pub use identifiers::HypothesisId;
pub use identifiers::QuestionId;
pub use identifiers::ReportId;
pub use identifiers::RequirementId;
pub use identifiers::ResourceId;
pub use identifiers::RunId;
pub use identifiers::TaskId;
pub use identifiers::WorkerId;
pub use payload::Payload;
pub use payload::PayloadError;
pub use payload::PayloadValue;
pub use policy::ActionClass;
pub use policy::ConfirmationOutcome;
pub use policy::TrustLevel;
pub use policy::classify_tool;
pub use policy::confirmation_outcome;
pub use projections::ColonyView;
pub use projections::ConferenceProjection;
pub use projections::ConferenceStateView;
pub use projections::HiveAggregate;
pub use projections::HiveStateView;
pub use projections::Projector;
pub use projections::RequirementProjection;
pub use projections::RequirementStateView;
pub use projections::RunProjection;
pub use projections::RunStateView;
pub use projections::TaskProjection;
pub use projections::TaskStateView;
pub use projections::WorkerPoolProjection;
pub use projections::WorkerProjection;
pub use projections::WorkerStateView;
pub use ra_domain::AcceptanceCriterion;
pub use ra_domain::AmbiguityScores;
pub use ra_domain::AnalysisPath;
pub use ra_domain::Assumption;
pub use ra_domain::AssumptionStatus;
pub use ra_domain::Challenge;
pub use ra_domain::ChallengeReport;
pub use ra_domain::ChallengeVerdict;
pub use ra_domain::ClarificationQuestion;
pub use ra_domain::ClarificationRound;
pub use ra_domain::FailureHypothesis;
pub use ra_domain::GateCheck;
pub use ra_domain::IntentGraph;
pub use ra_domain::QuestionType;
pub use ra_domain::RaGateResult;
pub use ra_domain::RequiredAction;
pub use ra_domain::Severity;
pub use ra_domain::SpecDraft;
pub use state_machine::ColonyState;
pub use state_machine::Guard;
pub use state_machine::HiveState;
pub use state_machine::OscillationDetector;
pub use state_machine::RaState;
pub use state_machine::RequirementState;
pub use state_machine::RunState;
pub use state_machine::StateMachine;
pub use state_machine::TaskState;
pub use state_machine::Transition;
pub use state_machine::colony_state_machine;
pub use state_machine::hive_state_machine;
pub use state_machine::ra_state_machine;
pub use state_machine::requirement_state_machine;
pub use state_machine::run_state_machine;
pub use state_machine::task_state_machine;
pub use time::Clock;
pub use time::SystemClock;
pub use time::Timestamp;
