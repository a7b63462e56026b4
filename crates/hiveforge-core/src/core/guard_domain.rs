// hiveforge-core/src/core/guard_domain.rs
// ============================================================================
// Module: Guard Bee Domain Entities
// Description: Evidence, rule results, and verification reports (§3.4).
// Purpose: Give the Guard Bee verifier (hiveforge-orchestrator) a shared vocabulary.
// Dependencies: serde
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ColonyId;
use crate::core::identifiers::RunId;
use crate::core::identifiers::TaskId;
use crate::core::time::Timestamp;

/// Kind of evidence a worker can submit for verification (§3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    /// A code diff.
    Diff,
    /// Lint tool output.
    LintResult,
    /// Test run output.
    TestResult,
    /// Test coverage measurement.
    TestCoverage,
    /// Static type-check output.
    TypeCheck,
    /// Security scan output.
    SecurityScan,
    /// A task decomposition plan.
    PlanDecomposition,
    /// Anything not covered above.
    Custom,
}

/// A single piece of submitted evidence (§3.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// The kind of evidence.
    pub evidence_type: EvidenceType,
    /// Where the evidence came from (tool name, worker id, …).
    pub source: String,
    /// Raw evidence content (JSON-serializable; interpreted per `evidence_type`).
    pub content: serde_json::Value,
    /// When the evidence was collected.
    pub collected_at: Timestamp,
}

/// The tier a rule belongs to (§4.9): L1 rules gate L2 rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleLevel {
    /// Blocking rule; any L1 failure fails verification outright.
    L1,
    /// Advisory rule; an L2-only failure yields a conditional pass.
    L2,
}

/// The outcome of evaluating a single rule against submitted evidence (§3.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    /// Rule name.
    pub rule_name: String,
    /// Rule tier.
    pub level: RuleLevel,
    /// Whether the rule passed.
    pub passed: bool,
    /// Human-readable explanation.
    pub message: String,
    /// Evidence type this rule consumed, if any.
    pub evidence_type: Option<EvidenceType>,
    /// Arbitrary structured detail (counts, thresholds, …).
    pub details: serde_json::Value,
}

/// Overall verdict of a Guard Bee verification pass (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// All rules passed.
    Pass,
    /// L1 passed but at least one L2 rule failed.
    ConditionalPass,
    /// At least one L1 rule failed.
    Fail,
}

/// The full report of a Guard Bee verification pass (§3.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardBeeReport {
    /// Colony the verified task belongs to.
    pub colony_id: ColonyId,
    /// Verified task.
    pub task_id: TaskId,
    /// Run the task belongs to.
    pub run_id: RunId,
    /// Overall verdict.
    pub verdict: Verdict,
    /// Every individual rule result, in registration order.
    pub rule_results: Vec<RuleResult>,
    /// Number of evidence items considered.
    pub evidence_count: usize,
    /// Conjunction of L1 rule results.
    pub l1_passed: bool,
    /// Conjunction of L2 rule results (vacuously true if none ran).
    pub l2_passed: bool,
    /// Reason sent back to the worker on failure, naming failing L1 rules.
    pub remand_reason: Option<String>,
    /// Messages from failing rules, to guide a retry.
    pub improvement_instructions: Vec<String>,
    /// When this report was produced.
    pub verified_at: Timestamp,
}

impl GuardBeeReport {
    /// Computes the verdict from rule results (§4.9): any L1 failure fails
    /// outright; an L2-only failure conditionally passes; otherwise passes.
    #[must_use]
    pub fn compute_verdict(l1_passed: bool, l2_passed: bool) -> Verdict {
        if !l1_passed {
            Verdict::Fail
        } else if !l2_passed {
            Verdict::ConditionalPass
        } else {
            Verdict::Pass
        }
    }
}
