// hiveforge-orchestrator/src/error.rs
// ============================================================================
// Module: Orchestrator Errors
// Description: Failure modes across the RA orchestrator and task pipeline (§7).
// Dependencies: thiserror, hiveforge_core, hiveforge_storage, hiveforge_llm
// ============================================================================

use thiserror::Error;

/// Failures raised by the RA orchestrator driver, task pipeline, Sentinel
/// Hornet, Guard Bee, and conflict resolver.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The Akashic Record failed to read or write.
    #[error("akashic record error: {0}")]
    Storage(#[from] hiveforge_storage::StorageError),
    /// A state transition was rejected.
    #[error("state transition error: {0}")]
    Transition(#[from] hiveforge_core::TransitionError),
    /// The governance oscillation detector tripped.
    #[error("governance error: {0}")]
    Governance(#[from] hiveforge_core::GovernanceError),
    /// The LLM client failed.
    #[error("llm error: {0}")]
    Llm(#[from] hiveforge_llm::LlmError),
    /// A worker's JSON response did not match the expected schema.
    #[error("malformed worker response: {0}")]
    MalformedResponse(String),
    /// A task plan violated a pipeline invariant (cycle, unknown dependency,
    /// duplicate goal, …).
    #[error("invalid task plan: {0}")]
    InvalidPlan(String),
    /// An irreversible action requires human approval before it proceeds.
    #[error("approval required for {action} ({task_count} task(s)), request {request_id}")]
    ApprovalRequired {
        /// The planned action awaiting approval.
        action: String,
        /// Number of tasks the pending plan would dispatch.
        task_count: usize,
        /// Identifier the caller must present to `resume_with_approval`.
        request_id: String,
    },
    /// `resume_with_approval` was called with an id not found in the
    /// pending-approval table.
    #[error("unknown approval request: {0}")]
    UnknownApprovalRequest(String),
    /// The spec persister could not read or write a document.
    #[error("persistence error: {0}")]
    Persistence(String),
    /// A YAML document could not be (de)serialized.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// An I/O operation on the requirements directory failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
