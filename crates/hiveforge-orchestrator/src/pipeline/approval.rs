// hiveforge-orchestrator/src/pipeline/approval.rs
// ============================================================================
// Module: Approval Gate
// Description: Human-in-the-loop confirmation gate for irreversible actions
//              (§4.6, §4.7).
// Dependencies: hiveforge_core::{ActionClass, TrustLevel, ConfirmationOutcome, confirmation_outcome}
// ============================================================================

use std::collections::BTreeMap;

use hiveforge_core::ApprovalRequestId;
use hiveforge_core::ConfirmationOutcome;
use hiveforge_core::TaskId;
use hiveforge_core::TrustLevel;
use hiveforge_core::confirmation_outcome;

use crate::error::OrchestratorError;

/// An irreversible action parked pending human confirmation.
#[derive(Debug, Clone)]
pub struct PendingApproval {
    /// Identifier the caller presents back to [`ApprovalGate::resolve`].
    pub request_id: ApprovalRequestId,
    /// Tool or action name awaiting confirmation.
    pub action: String,
    /// Tasks whose dispatch is blocked on this approval.
    pub task_ids: Vec<TaskId>,
}

/// What the caller should do after [`ApprovalGate::check`].
pub enum GateDecision {
    /// The action may proceed without stopping the pipeline.
    Proceed,
    /// The action may proceed, but the caller should surface a notification.
    ProceedWithNotice,
    /// The pipeline must pause; the action is recorded as `request`.
    Pause(PendingApproval),
}

/// Gates irreversible tool calls behind the §4.7 action-class/trust-level
/// confirmation matrix, holding paused requests until a human resolves
/// them.
pub struct ApprovalGate {
    /// Operator's trust level for the colony this gate guards.
    trust_level: TrustLevel,
    /// Whether `FullDelegation` may skip confirmation even for irreversible
    /// actions (§4.7 matrix footnote).
    allow_irreversible_skip: bool,
    /// Requests awaiting a human decision, keyed by request id.
    pending: BTreeMap<String, PendingApproval>,
    /// Monotonic counter backing fresh request ids.
    next_id: u64,
}

impl ApprovalGate {
    /// Builds a gate at the given trust level with no pending requests.
    #[must_use]
    pub fn new(trust_level: TrustLevel, allow_irreversible_skip: bool) -> Self {
        Self { trust_level, allow_irreversible_skip, pending: BTreeMap::new(), next_id: 0 }
    }

    /// Classifies `tool_name` and decides whether dispatch of `task_ids` may
    /// proceed, proceed with a notification, or must pause for approval.
    pub fn check(&mut self, tool_name: &str, task_ids: &[TaskId]) -> GateDecision {
        let class = hiveforge_core::classify_tool(tool_name);
        match confirmation_outcome(self.trust_level, class, self.allow_irreversible_skip) {
            ConfirmationOutcome::Auto => GateDecision::Proceed,
            ConfirmationOutcome::AutoNotify => GateDecision::ProceedWithNotice,
            ConfirmationOutcome::Confirm => {
                self.next_id += 1;
                let request_id = ApprovalRequestId::new(format!("approval-{}", self.next_id));
                let request = PendingApproval {
                    request_id: request_id.clone(),
                    action: tool_name.to_string(),
                    task_ids: task_ids.to_vec(),
                };
                self.pending.insert(request_id.into_string(), request.clone());
                GateDecision::Pause(request)
            }
        }
    }

    /// Resolves a pending request, approving or rejecting it. Returns the
    /// tasks that were waiting on the decision.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::UnknownApprovalRequest`] if `request_id`
    /// is not pending.
    pub fn resolve(&mut self, request_id: &str, approved: bool) -> Result<Vec<TaskId>, OrchestratorError> {
        let request = self
            .pending
            .remove(request_id)
            .ok_or_else(|| OrchestratorError::UnknownApprovalRequest(request_id.to_string()))?;
        if approved { Ok(request.task_ids) } else { Ok(Vec::new()) }
    }

    /// Returns the pending request for `request_id`, if any.
    #[must_use]
    pub fn pending(&self, request_id: &str) -> Option<&PendingApproval> {
        self.pending.get(request_id)
    }
}
