// hiveforge-orchestrator/src/guard.rs
// ============================================================================
// Module: Guard Bee Verifier
// Description: Evidence-first L1/L2 rule registry and verdict synthesis
//              (§4.9). Distinct from the RA Guard Gate (§4.5.3, ra/guard_gate.rs),
//              which judges a synthesized spec draft rather than task evidence.
// Dependencies: hiveforge_core::guard_domain, hiveforge_rules::{Requirement, KleeneLogic}
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use hiveforge_core::Actor;
use hiveforge_core::Clock;
use hiveforge_core::ColonyId;
use hiveforge_core::Evidence;
use hiveforge_core::EvidenceType;
use hiveforge_core::EventType;
use hiveforge_core::GuardBeeReport;
use hiveforge_core::Payload;
use hiveforge_core::PayloadValue;
use hiveforge_core::RunId;
use hiveforge_core::RuleLevel;
use hiveforge_core::RuleResult;
use hiveforge_core::TaskId;
use hiveforge_core::Verdict;
use hiveforge_rules::KleeneLogic;
use hiveforge_rules::Requirement;
use hiveforge_rules::TriState;
use hiveforge_rules::TriStatePredicateEval;
use hiveforge_storage::AkashicRecord;
use serde::Deserialize;
use serde::Serialize;

use crate::error::OrchestratorError;
use crate::eventlog::append_event;

const MIN_COVERAGE_PERCENT: f64 = 80.0;
const MIN_GOAL_LENGTH: usize = 5;

#[derive(Debug, Deserialize)]
struct PlanTaskEvidence {
    id: String,
    goal: String,
    #[serde(default)]
    depends_on: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PlanEvidenceBody {
    tasks: Vec<PlanTaskEvidence>,
}

/// Pre-computed evidence for the tri-state `plan_structure` predicates.
/// `None` in any field means the evidence needed to decide that predicate
/// was never submitted, yielding [`TriState::Unknown`] under fail-closed
/// Kleene logic.
#[derive(Debug, Clone, Default)]
struct PlanEvidenceReader {
    no_cycles: Option<bool>,
    no_unknown_deps: Option<bool>,
    no_duplicate_goals: Option<bool>,
}

/// The three structural checks composing the `plan_structure` L1 rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum PlanCheck {
    NoCycles,
    NoUnknownDeps,
    NoDuplicateGoals,
}

impl TriStatePredicateEval for PlanCheck {
    type Reader<'a> = PlanEvidenceReader;

    fn eval_row_tristate(&self, reader: &Self::Reader<'_>, _row: hiveforge_rules::Row) -> TriState {
        let value = match self {
            Self::NoCycles => reader.no_cycles,
            Self::NoUnknownDeps => reader.no_unknown_deps,
            Self::NoDuplicateGoals => reader.no_duplicate_goals,
        };
        value.map_or(TriState::Unknown, TriState::from)
    }
}

fn analyze_plan(content: &serde_json::Value) -> PlanEvidenceReader {
    let Ok(body) = serde_json::from_value::<PlanEvidenceBody>(content.clone()) else {
        return PlanEvidenceReader::default();
    };

    let ids: BTreeSet<&str> = body.tasks.iter().map(|task| task.id.as_str()).collect();
    let no_unknown_deps = body.tasks.iter().all(|task| task.depends_on.iter().all(|dep| ids.contains(dep.as_str())));

    let mut seen_goals = BTreeSet::new();
    let no_duplicate_goals = body.tasks.iter().all(|task| seen_goals.insert(task.goal.as_str()));

    let no_cycles = !has_cycle(&body.tasks);

    PlanEvidenceReader {
        no_cycles: Some(no_cycles),
        no_unknown_deps: Some(no_unknown_deps),
        no_duplicate_goals: Some(no_duplicate_goals),
    }
}

/// Kahn's-algorithm cycle check over raw plan evidence, independent of
/// [`crate::pipeline::planner::TaskPlan`]: evidence submitted to Guard Bee
/// may describe a plan the planner never typed, so it is parsed on its own
/// terms here.
fn has_cycle(tasks: &[PlanTaskEvidence]) -> bool {
    let mut indegree: std::collections::HashMap<&str, usize> =
        tasks.iter().map(|task| (task.id.as_str(), task.depends_on.len())).collect();
    let mut dependents: std::collections::HashMap<&str, Vec<&str>> = std::collections::HashMap::new();
    for task in tasks {
        for dep in &task.depends_on {
            dependents.entry(dep.as_str()).or_default().push(task.id.as_str());
        }
    }

    let mut frontier: std::collections::VecDeque<&str> =
        indegree.iter().filter(|(_, &degree)| degree == 0).map(|(id, _)| *id).collect();
    let mut visited = 0usize;
    while let Some(id) = frontier.pop_front() {
        visited += 1;
        if let Some(next_ids) = dependents.get(id) {
            for next_id in next_ids {
                if let Some(degree) = indegree.get_mut(next_id) {
                    *degree -= 1;
                    if *degree == 0 {
                        frontier.push_back(next_id);
                    }
                }
            }
        }
    }
    visited != tasks.len()
}

fn find_evidence<'a>(evidence: &'a [Evidence], evidence_type: EvidenceType) -> Option<&'a Evidence> {
    evidence.iter().find(|item| item.evidence_type == evidence_type)
}

fn rule(name: &str, level: RuleLevel, passed: bool, message: String, evidence_type: Option<EvidenceType>) -> RuleResult {
    RuleResult { rule_name: name.to_string(), level, passed, message, evidence_type, details: serde_json::Value::Null }
}

fn evaluate_diff_exists(evidence: &[Evidence]) -> RuleResult {
    let passed = find_evidence(evidence, EvidenceType::Diff).is_some();
    let message = if passed { "diff evidence present".to_string() } else { "no diff evidence submitted".to_string() };
    rule("diff_exists", RuleLevel::L1, passed, message, Some(EvidenceType::Diff))
}

fn evaluate_all_tests_pass(evidence: &[Evidence]) -> RuleResult {
    let test = find_evidence(evidence, EvidenceType::TestResult);
    let passed = test.is_some_and(|item| {
        item.content.get("failed").and_then(serde_json::Value::as_u64) == Some(0) && item.content.get("passed").is_some()
    });
    let message =
        if passed { "all tests passed".to_string() } else { "no passing test evidence submitted".to_string() };
    rule("all_tests_pass", RuleLevel::L1, passed, message, Some(EvidenceType::TestResult))
}

fn evaluate_coverage_threshold(evidence: &[Evidence]) -> RuleResult {
    let coverage = find_evidence(evidence, EvidenceType::TestCoverage);
    let percent = coverage.and_then(|item| item.content.get("percent").and_then(serde_json::Value::as_f64));
    let passed = percent.is_some_and(|value| value >= MIN_COVERAGE_PERCENT);
    let message = percent.map_or_else(
        || "no coverage evidence submitted".to_string(),
        |value| format!("coverage {value:.1}% against an {MIN_COVERAGE_PERCENT:.0}% floor"),
    );
    rule("coverage_threshold", RuleLevel::L1, passed, message, Some(EvidenceType::TestCoverage))
}

fn evaluate_lint_clean(evidence: &[Evidence]) -> RuleResult {
    let lint = find_evidence(evidence, EvidenceType::LintResult);
    let passed = lint.is_some_and(|item| item.content.get("errors").and_then(serde_json::Value::as_u64) == Some(0));
    let message = if passed { "lint clean".to_string() } else { "no clean-lint evidence submitted".to_string() };
    rule("lint_clean", RuleLevel::L1, passed, message, Some(EvidenceType::LintResult))
}

fn evaluate_type_check(evidence: &[Evidence]) -> RuleResult {
    let type_check = find_evidence(evidence, EvidenceType::TypeCheck);
    let passed = type_check.is_some_and(|item| item.content.get("ok").and_then(serde_json::Value::as_bool) == Some(true));
    let message = if passed { "type check passed".to_string() } else { "no passing type-check evidence submitted".to_string() };
    rule("type_check", RuleLevel::L1, passed, message, Some(EvidenceType::TypeCheck))
}

fn evaluate_plan_structure(evidence: &[Evidence]) -> RuleResult {
    let plan_evidence = find_evidence(evidence, EvidenceType::PlanDecomposition);
    let reader = plan_evidence.map_or_else(PlanEvidenceReader::default, |item| analyze_plan(&item.content));

    let requirement = Requirement::and(vec![
        Requirement::predicate(PlanCheck::NoCycles),
        Requirement::predicate(PlanCheck::NoUnknownDeps),
        Requirement::predicate(PlanCheck::NoDuplicateGoals),
    ]);
    let verdict = requirement.eval_tristate(&reader, 0, &KleeneLogic);
    let passed = verdict.is_true();
    let message = match verdict {
        TriState::True => "plan is acyclic with resolved dependencies and unique goals".to_string(),
        TriState::False => "plan violates a structural invariant (cycle, unknown dependency, or duplicate goal)".to_string(),
        TriState::Unknown => "no plan decomposition evidence submitted".to_string(),
    };
    rule("plan_structure", RuleLevel::L1, passed, message, Some(EvidenceType::PlanDecomposition))
}

fn evaluate_plan_goal_coverage(evidence: &[Evidence], original_goal: Option<&str>) -> RuleResult {
    let Some(plan_evidence) = find_evidence(evidence, EvidenceType::PlanDecomposition) else {
        return rule(
            "plan_goal_coverage",
            RuleLevel::L2,
            false,
            "no plan decomposition evidence submitted".to_string(),
            Some(EvidenceType::PlanDecomposition),
        );
    };
    let Ok(body) = serde_json::from_value::<PlanEvidenceBody>(plan_evidence.content.clone()) else {
        return rule(
            "plan_goal_coverage",
            RuleLevel::L2,
            false,
            "plan decomposition evidence was not well-formed".to_string(),
            Some(EvidenceType::PlanDecomposition),
        );
    };

    let has_short_goal = body.tasks.iter().any(|task| task.goal.trim().chars().count() < MIN_GOAL_LENGTH);
    let majority_repeats_original = original_goal.is_some_and(|goal| {
        let repeats = body.tasks.iter().filter(|task| task.goal.trim() == goal.trim()).count();
        !body.tasks.is_empty() && repeats * 2 > body.tasks.len()
    });

    let passed = !has_short_goal && !majority_repeats_original;
    let message = if passed {
        "plan covers the goal without trivial or repeated tasks".to_string()
    } else if has_short_goal {
        format!("a task goal is shorter than {MIN_GOAL_LENGTH} characters")
    } else {
        "a majority of tasks merely repeat the original goal".to_string()
    };
    rule("plan_goal_coverage", RuleLevel::L2, passed, message, Some(EvidenceType::PlanDecomposition))
}

/// Evidence-first L1/L2 verifier over deliverables (§4.9).
pub struct GuardBeeVerifier;

impl GuardBeeVerifier {
    /// Builds a verifier. Stateless: every call to [`Self::verify`] is
    /// self-contained.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs the L1 rule registry, then L2 if L1 passed, computes the
    /// verdict, and records `GUARD_VERIFICATION_REQUESTED` followed by the
    /// verdict event to the Akashic Record (§4.9).
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError::Storage`] if event persistence
    /// fails.
    pub fn verify(
        &self,
        record: &AkashicRecord,
        clock: &Arc<dyn Clock>,
        run_id: &RunId,
        colony_id: &ColonyId,
        task_id: &TaskId,
        evidence: &[Evidence],
        context: Option<&str>,
    ) -> Result<GuardBeeReport, OrchestratorError> {
        append_event(
            record,
            clock.as_ref(),
            run_id,
            EventType::GuardVerificationRequested,
            Some(colony_id.clone()),
            Some(task_id.clone()),
            None,
            Actor::system(),
            Payload::new(),
        )?;

        let mut rule_results = vec![
            evaluate_diff_exists(evidence),
            evaluate_all_tests_pass(evidence),
            evaluate_coverage_threshold(evidence),
            evaluate_lint_clean(evidence),
            evaluate_type_check(evidence),
            evaluate_plan_structure(evidence),
        ];
        let l1_passed = rule_results.iter().all(|result| result.passed);

        let l2_passed = if l1_passed {
            let l2 = evaluate_plan_goal_coverage(evidence, context);
            let passed = l2.passed;
            rule_results.push(l2);
            passed
        } else {
            true
        };

        let verdict = GuardBeeReport::compute_verdict(l1_passed, l2_passed);
        let remand_reason = (!l1_passed).then(|| {
            let failing: Vec<&str> = rule_results
                .iter()
                .filter(|result| result.level == RuleLevel::L1 && !result.passed)
                .map(|result| result.rule_name.as_str())
                .collect();
            format!("failing L1 rules: {}", failing.join(", "))
        });
        let improvement_instructions =
            rule_results.iter().filter(|result| !result.passed).map(|result| result.message.clone()).collect();

        let report = GuardBeeReport {
            colony_id: colony_id.clone(),
            task_id: task_id.clone(),
            run_id: run_id.clone(),
            verdict,
            evidence_count: evidence.len(),
            rule_results,
            l1_passed,
            l2_passed,
            remand_reason,
            improvement_instructions,
            verified_at: clock.now(),
        };

        let verdict_event_type = match verdict {
            Verdict::Pass => EventType::GuardPassed,
            Verdict::ConditionalPass => EventType::GuardConditionalPassed,
            Verdict::Fail => EventType::GuardFailed,
        };
        let mut payload = Payload::new();
        payload.insert("verdict".to_string(), PayloadValue::String(format!("{verdict:?}")));
        append_event(
            record,
            clock.as_ref(),
            run_id,
            verdict_event_type,
            Some(colony_id.clone()),
            Some(task_id.clone()),
            None,
            Actor::system(),
            payload,
        )?;

        Ok(report)
    }
}

impl Default for GuardBeeVerifier {
    fn default() -> Self {
        Self::new()
    }
}
