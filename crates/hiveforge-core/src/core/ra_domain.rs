// hiveforge-core/src/core/ra_domain.rs
// ============================================================================
// Module: Requirement Analysis Domain Entities
// Description: Strict, frozen records produced by the RA Orchestrator pipeline (§3.3).
// Purpose: Give every RA subsystem a shared, serializable vocabulary.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! These records are the nouns of requirement analysis: ambiguity scores,
//! intent graphs, assumptions, failure hypotheses, clarification rounds,
//! spec drafts, challenges, and gate results. They carry no behavior beyond
//! a handful of derived predicates (§4.5); the orchestrator (a separate
//! crate) is what sequences them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AssumptionId;
use crate::core::identifiers::ChallengeId;
use crate::core::identifiers::DocId;
use crate::core::identifiers::DraftId;
use crate::core::identifiers::HypothesisId;
use crate::core::identifiers::QuestionId;
use crate::core::identifiers::ReportId;

/// Per-run cap on assumptions (§3.3).
pub const MAX_ASSUMPTIONS_PER_RUN: usize = 10;
/// Per-run cap on failure hypotheses (§3.3).
pub const MAX_HYPOTHESES_PER_RUN: usize = 5;
/// Per-round cap on clarification questions (§3.3).
pub const MAX_QUESTIONS_PER_ROUND: usize = 3;
/// Per-run cap on clarification rounds (§3.3).
pub const MAX_CLARIFICATION_ROUNDS: usize = 3;
/// Per-report cap on challenges (§3.3).
pub const MAX_CHALLENGES_PER_REPORT: usize = 5;

// ============================================================================
// SECTION: Ambiguity Scores
// ============================================================================

/// Pure scoring output of the ambiguity scorer (§4.5.1).
///
/// # Invariants
/// - Every field lies in `[0, 1]`; construct via [`AmbiguityScores::new`],
///   which clamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbiguityScores {
    /// How vague the request's language is.
    pub ambiguity: f64,
    /// How much surrounding context has been gathered.
    pub context_sufficiency: f64,
    /// How risky the implied action is.
    pub execution_risk: f64,
}

impl AmbiguityScores {
    /// Constructs a score triple, clamping each field into `[0, 1]`.
    #[must_use]
    pub fn new(ambiguity: f64, context_sufficiency: f64, execution_risk: f64) -> Self {
        Self {
            ambiguity: ambiguity.clamp(0.0, 1.0),
            context_sufficiency: context_sufficiency.clamp(0.0, 1.0),
            execution_risk: execution_risk.clamp(0.0, 1.0),
        }
    }

    /// True when the request is too vague or risky to proceed without
    /// clarification (the complement of instant/assumption pass, §4.5.1).
    #[must_use]
    pub fn needs_clarification(&self) -> bool {
        !(self.ambiguity < 0.3 && self.context_sufficiency > 0.8 && self.execution_risk < 0.3)
            && !(self.ambiguity < 0.7 && self.execution_risk < 0.5)
    }

    /// True when the request can proceed on stated assumptions without a
    /// full clarification round (§4.5.1 ASSUMPTION_PASS).
    #[must_use]
    pub fn can_proceed_with_assumptions(&self) -> bool {
        !self.is_instant_pass() && self.ambiguity < 0.7 && self.execution_risk < 0.5
    }

    fn is_instant_pass(&self) -> bool {
        self.ambiguity < 0.3 && self.context_sufficiency > 0.8 && self.execution_risk < 0.3
    }

    /// Classifies the scores into the analysis path the orchestrator should
    /// take (§4.5.1).
    #[must_use]
    pub fn analysis_path(&self) -> AnalysisPath {
        if self.is_instant_pass() {
            AnalysisPath::InstantPass
        } else if self.can_proceed_with_assumptions() {
            AnalysisPath::AssumptionPass
        } else {
            AnalysisPath::FullAnalysis
        }
    }
}

/// The analysis path an intake is routed to (§3.3, §4.5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPath {
    /// Skip straight to execution readiness.
    InstantPass,
    /// Proceed on stated assumptions without a full clarification round.
    AssumptionPass,
    /// Run the full clarify/challenge/gate pipeline.
    FullAnalysis,
}

// ============================================================================
// SECTION: Intent Graph
// ============================================================================

/// Mined intent structure for a request (§3.3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentGraph {
    /// At least one goal statement.
    pub goals: Vec<String>,
    /// Observable success criteria.
    pub success_criteria: Vec<String>,
    /// Explicit constraints.
    pub constraints: Vec<String>,
    /// Explicit non-goals.
    pub non_goals: Vec<String>,
    /// Open unknowns surfaced during mining.
    pub unknowns: Vec<String>,
}

// ============================================================================
// SECTION: Assumptions
// ============================================================================

/// Disposition of an [`Assumption`] (§3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionStatus {
    /// Awaiting user confirmation.
    Pending,
    /// Confirmed by the user.
    Confirmed,
    /// Rejected by the user.
    Rejected,
    /// Promoted automatically (confidence ≥ 0.8, §4.5.2).
    AutoApproved,
}

/// A stated assumption the pipeline is proceeding on (§3.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumption {
    /// Assumption identifier.
    pub id: AssumptionId,
    /// Assumption text.
    pub text: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Evidence ids backing this assumption.
    pub evidence_ids: Vec<String>,
    /// Current disposition.
    pub status: AssumptionStatus,
    /// User's response text, if solicited.
    pub user_response: Option<String>,
}

// ============================================================================
// SECTION: Failure Hypotheses
// ============================================================================

/// Severity of a [`FailureHypothesis`] (§3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Low severity.
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
}

/// A hypothesized way the request could fail (§3.3, Risk Challenger Phase A).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureHypothesis {
    /// Hypothesis identifier.
    pub id: HypothesisId,
    /// Hypothesis text.
    pub text: String,
    /// Severity.
    pub severity: Severity,
    /// Proposed mitigation, if any.
    pub mitigation: Option<String>,
    /// Whether this hypothesis has been addressed.
    pub addressed: bool,
}

// ============================================================================
// SECTION: Clarification
// ============================================================================

/// Answer shape a [`ClarificationQuestion`] expects (§3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Yes/no answer.
    YesNo,
    /// A single choice among `options`.
    SingleChoice,
    /// Any subset of `options`.
    MultiChoice,
    /// Unconstrained text.
    FreeText,
}

/// A single clarification question (§3.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationQuestion {
    /// Question identifier.
    pub id: QuestionId,
    /// Question text.
    pub text: String,
    /// Expected answer shape.
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Candidate options, when relevant to `question_type`.
    pub options: Vec<String>,
    /// Why this question matters.
    pub impact: String,
    /// Assumptions this question would resolve.
    pub related_assumption_ids: Vec<AssumptionId>,
    /// The user's answer, once solicited.
    pub answer: Option<String>,
}

/// One round of clarification (§3.3). Capped at
/// [`MAX_QUESTIONS_PER_ROUND`] questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationRound {
    /// 1-based round number.
    pub round_number: u32,
    /// Questions asked this round.
    pub questions: Vec<ClarificationQuestion>,
}

impl ClarificationRound {
    /// True when this round asked no questions, signalling `skip_to_spec`
    /// (§4.5.2).
    #[must_use]
    pub fn skip_to_spec(&self) -> bool {
        self.questions.is_empty()
    }
}

// ============================================================================
// SECTION: Spec Draft
// ============================================================================

/// A single acceptance criterion, either structured or a raw string (§3.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceCriterion {
    /// Criterion text.
    pub text: String,
    /// Whether this criterion is objectively measurable.
    pub measurable: bool,
    /// Metric name, when measurable.
    pub metric: Option<String>,
    /// Threshold value, when measurable.
    pub threshold: Option<String>,
}

impl AcceptanceCriterion {
    /// Wraps a raw string as an unmeasurable criterion, the degraded form
    /// the Spec Synthesizer accepts alongside structured criteria (§4.5.2).
    #[must_use]
    pub fn from_raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            measurable: false,
            metric: None,
            threshold: None,
        }
    }
}

/// A synthesized requirement specification (§3.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecDraft {
    /// Draft identifier.
    pub draft_id: DraftId,
    /// Monotonically increasing version, starting at 1.
    pub version: u32,
    /// Goal statement.
    pub goal: String,
    /// At least one acceptance criterion.
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
    /// Constraints.
    pub constraints: Vec<String>,
    /// Non-goals.
    pub non_goals: Vec<String>,
    /// Unresolved open items.
    pub open_items: Vec<String>,
    /// Mitigations for addressed risks.
    pub risk_mitigations: Vec<String>,
    /// Persisted document id, once written (§4.5.4).
    pub doorstop_id: Option<DocId>,
    /// Persisted file path, once written (§4.5.4).
    pub file_path: Option<String>,
}

// ============================================================================
// SECTION: Challenges
// ============================================================================

/// The action a challenge demands (§3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredAction {
    /// Needs a clarification round.
    Clarify,
    /// Needs a spec revision.
    SpecRevision,
    /// Blocks progress entirely.
    Block,
    /// No action beyond recording.
    LogOnly,
}

/// A single adversarial challenge against a draft (§3.3, Risk Challenger
/// Phase B).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    /// Challenge identifier.
    pub id: ChallengeId,
    /// The claim being challenged.
    pub claim: String,
    /// Supporting evidence.
    pub evidence: String,
    /// Severity.
    pub severity: Severity,
    /// Action this challenge demands.
    pub required_action: RequiredAction,
    /// Counterexample, if one was found.
    pub counterexample: Option<String>,
    /// Whether this challenge has been addressed.
    pub addressed: bool,
    /// Resolution text, once addressed.
    pub resolution: Option<String>,
}

/// Verdict of a [`ChallengeReport`] (§3.3, §4.5.2 Phase B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeVerdict {
    /// Passes, though residual risks remain.
    PassWithRisks,
    /// Requires human review before proceeding.
    ReviewRequired,
    /// Blocks progress entirely.
    Block,
}

/// A batch of challenges against one draft (§3.3). Capped at
/// [`MAX_CHALLENGES_PER_REPORT`] challenges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeReport {
    /// Report identifier.
    pub report_id: ReportId,
    /// Draft this report challenges.
    pub draft_id: DraftId,
    /// Individual challenges.
    pub challenges: Vec<Challenge>,
    /// Overall verdict.
    pub verdict: ChallengeVerdict,
    /// Free-form summary.
    pub summary: String,
}

impl ChallengeReport {
    /// Computes the verdict from unaddressed challenge counts (§4.5.2 Phase
    /// B): any unaddressed HIGH blocks; two or more unaddressed MEDIUM
    /// requires review; otherwise passes with risks.
    #[must_use]
    pub fn compute_verdict(challenges: &[Challenge]) -> ChallengeVerdict {
        let unaddressed_high = challenges
            .iter()
            .filter(|c| !c.addressed && c.severity == Severity::High)
            .count();
        let unaddressed_medium = challenges
            .iter()
            .filter(|c| !c.addressed && c.severity == Severity::Medium)
            .count();
        if unaddressed_high >= 1 {
            ChallengeVerdict::Block
        } else if unaddressed_medium >= 2 {
            ChallengeVerdict::ReviewRequired
        } else {
            ChallengeVerdict::PassWithRisks
        }
    }
}

// ============================================================================
// SECTION: Guard Gate
// ============================================================================

/// Result of one RA Guard Gate check (§3.3, §4.5.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCheck {
    /// Check name.
    pub name: String,
    /// Whether this check passed.
    pub passed: bool,
    /// Human-readable reason, populated when failed.
    pub reason: Option<String>,
}

/// Overall RA Guard Gate result (§3.3, §4.5.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaGateResult {
    /// Conjunction of every check's `passed`.
    pub passed: bool,
    /// Individual check results.
    pub checks: Vec<GateCheck>,
    /// Actions required by failed checks.
    pub required_actions: Vec<String>,
}

impl RaGateResult {
    /// Builds a result from a set of checks, computing `passed` as their
    /// conjunction and collecting failure reasons into `required_actions`.
    #[must_use]
    pub fn from_checks(checks: Vec<GateCheck>) -> Self {
        let passed = checks.iter().all(|c| c.passed);
        let required_actions = checks
            .iter()
            .filter(|c| !c.passed)
            .filter_map(|c| c.reason.clone())
            .collect();
        Self {
            passed,
            checks,
            required_actions,
        }
    }
}
