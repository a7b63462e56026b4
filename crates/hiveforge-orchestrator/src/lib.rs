// hiveforge-orchestrator/src/lib.rs
// ============================================================================
// Crate: hiveforge-orchestrator
// Description: Requirement-analysis driver, task pipeline, Sentinel Hornet,
//              Guard Bee verifier, conflict resolution, and the activity bus
//              that ties colony execution back to the Akashic Record.
// Dependencies: hiveforge-core, hiveforge-storage, hiveforge-llm,
//               hiveforge-rules, hiveforge-config
// ============================================================================

//! ## Overview
//! HiveForge orchestrator wires the pure domain model in `hiveforge-core` to
//! a running colony: it drives requirement analysis through its sixteen
//! states, decomposes approved specs into task DAGs and dispatches them to
//! workers, watches the event stream for loops, cost overruns, and runaway
//! rates, verifies evidence against the Guard Bee's two-tier rule set, and
//! detects conflicting resource claims between concurrently running tasks.
//! Every public operation reads and appends to the same Akashic Record; none
//! of it holds state the record itself doesn't already have.

#![forbid(unsafe_code)]

mod activity;
mod conflict;
mod error;
mod eventlog;
mod guard;
mod pipeline;
mod ra;
mod sentinel;
mod silence;

pub use activity::ActivityBus;
pub use activity::ActivityEvent;
pub use activity::AgentHierarchyView;
pub use activity::DEFAULT_HISTORY_CAPACITY;
pub use activity::DEFAULT_QUEUE_CAPACITY;
pub use activity::Subscription;
pub use activity::SubscriptionId;
pub use conflict::ConflictDetector;
pub use conflict::ConflictListener;
pub use conflict::ConflictResolver;
pub use conflict::MergeRule;
pub use conflict::ResolutionOutcome;
pub use conflict::ResolutionStrategy;
pub use error::OrchestratorError;
pub use guard::GuardBeeVerifier;
pub use pipeline::ApprovalGate;
pub use pipeline::Dispatcher;
pub use pipeline::GateDecision;
pub use pipeline::PendingApproval;
pub use pipeline::PipelineOutcome;
pub use pipeline::TaskExecutor;
pub use pipeline::TaskOutcome;
pub use pipeline::TaskPipeline;
pub use pipeline::TaskPlan;
pub use pipeline::TaskPlanner;
pub use pipeline::TaskRunStatus;
pub use pipeline::PlannedTask;
pub use pipeline::RetryDecision;
pub use pipeline::RetryManager;
pub use ra::AmbiguityScorer;
pub use ra::AssumptionMapper;
pub use ra::ClarificationGenerator;
pub use ra::MappedAssumptions;
pub use ra::RaDriver;
pub use ra::RaOutcome;
pub use ra::RiskChallenger;
pub use ra::IntentMiner;
pub use ra::SpecDiff;
pub use ra::SpecPersister;
pub use ra::SpecSynthesizer;
pub use ra::PersistedDocument;
pub use ra::evaluate_guard_gate;
pub use sentinel::Alert;
pub use sentinel::AlertKind;
pub use sentinel::AlertSeverity;
pub use sentinel::SentinelConfig;
pub use sentinel::SentinelHornet;
pub use silence::HeartbeatManager;
pub use silence::SilenceDetector;
pub use silence::SilenceEvent;
