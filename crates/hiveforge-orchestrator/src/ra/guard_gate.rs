// hiveforge-orchestrator/src/ra/guard_gate.rs
// ============================================================================
// Module: RA Guard Gate
// Description: Eight rule-based checks against a spec draft and its analysis
//              history (§4.5.3).
// Dependencies: hiveforge_core::{SpecDraft, AmbiguityScores, FailureHypothesis, ChallengeReport, GateCheck, RaGateResult}
// ============================================================================

use hiveforge_core::AmbiguityScores;
use hiveforge_core::ChallengeReport;
use hiveforge_core::ChallengeVerdict;
use hiveforge_core::FailureHypothesis;
use hiveforge_core::GateCheck;
use hiveforge_core::RaGateResult;
use hiveforge_core::Severity;
use hiveforge_core::SpecDraft;

/// Minimum goal length, below which `goal_clarity` fails as trivial.
const MIN_GOAL_LENGTH: usize = 5;
/// Ambiguity ceiling `ambiguity_threshold` enforces (§4.5.3, strict `<`).
const AMBIGUITY_CEILING: f64 = 0.5;

/// Evaluates the eight RA Guard Gate checks against a draft and its
/// surrounding analysis history (§4.5.3). Checks 7 and 8 are reserved for
/// extension and always pass.
#[must_use]
pub fn evaluate(
    draft: &SpecDraft,
    scores: &AmbiguityScores,
    hypotheses: &[FailureHypothesis],
    challenges: Option<&ChallengeReport>,
) -> RaGateResult {
    let checks = vec![
        goal_clarity(draft),
        success_testability(draft),
        constraints_explicit(draft),
        risks_addressed(hypotheses),
        ambiguity_threshold(scores),
        challenges_resolved(challenges),
        reserved_check("reserved_7"),
        reserved_check("reserved_8"),
    ];
    RaGateResult::from_checks(checks)
}

fn goal_clarity(draft: &SpecDraft) -> GateCheck {
    let passed = draft.goal.trim().len() >= MIN_GOAL_LENGTH;
    GateCheck {
        name: "goal_clarity".to_string(),
        passed,
        reason: (!passed).then(|| "goal is empty or trivially short".to_string()),
    }
}

fn success_testability(draft: &SpecDraft) -> GateCheck {
    let passed = !draft.acceptance_criteria.is_empty()
        && draft.acceptance_criteria.iter().all(|criterion| criterion.measurable);
    GateCheck {
        name: "success_testability".to_string(),
        passed,
        reason: (!passed).then(|| "not every acceptance criterion is structured and measurable".to_string()),
    }
}

fn constraints_explicit(draft: &SpecDraft) -> GateCheck {
    let passed = !draft.constraints.is_empty();
    GateCheck {
        name: "constraints_explicit".to_string(),
        passed,
        reason: (!passed).then(|| "no constraints were stated".to_string()),
    }
}

fn risks_addressed(hypotheses: &[FailureHypothesis]) -> GateCheck {
    let passed = hypotheses
        .iter()
        .filter(|h| h.severity == Severity::High)
        .all(|h| h.mitigation.is_some());
    GateCheck {
        name: "risks_addressed".to_string(),
        passed,
        reason: (!passed).then(|| "a high-severity failure hypothesis has no mitigation".to_string()),
    }
}

fn ambiguity_threshold(scores: &AmbiguityScores) -> GateCheck {
    let passed = scores.ambiguity < AMBIGUITY_CEILING;
    GateCheck {
        name: "ambiguity_threshold".to_string(),
        passed,
        reason: (!passed).then(|| format!("ambiguity {} is not below {AMBIGUITY_CEILING}", scores.ambiguity)),
    }
}

fn challenges_resolved(challenges: Option<&ChallengeReport>) -> GateCheck {
    let passed = challenges.is_none_or(|report| report.verdict != ChallengeVerdict::Block);
    GateCheck {
        name: "challenges_resolved".to_string(),
        passed,
        reason: (!passed).then(|| "the challenge report verdict is BLOCK".to_string()),
    }
}

fn reserved_check(name: &str) -> GateCheck {
    GateCheck { name: name.to_string(), passed: true, reason: None }
}

#[cfg(test)]
mod tests {
    use hiveforge_core::AcceptanceCriterion;
    use hiveforge_core::DraftId;
    use hiveforge_core::HypothesisId;

    use super::*;

    fn draft() -> SpecDraft {
        SpecDraft {
            draft_id: DraftId::new("d1"),
            version: 1,
            goal: "ship the widget export feature".to_string(),
            acceptance_criteria: vec![AcceptanceCriterion {
                text: "exports under 200ms".to_string(),
                measurable: true,
                metric: Some("latency".to_string()),
                threshold: Some("200ms".to_string()),
            }],
            constraints: vec!["no new dependencies".to_string()],
            non_goals: Vec::new(),
            open_items: Vec::new(),
            risk_mitigations: Vec::new(),
            doorstop_id: None,
            file_path: None,
        }
    }

    #[test]
    fn passes_when_every_check_passes() {
        let scores = AmbiguityScores::new(0.2, 0.9, 0.1);
        let result = evaluate(&draft(), &scores, &[], None);
        assert!(result.passed);
    }

    #[test]
    fn fails_on_unmeasurable_criterion() {
        let mut spec = draft();
        spec.acceptance_criteria.push(AcceptanceCriterion::from_raw("looks nice"));
        let scores = AmbiguityScores::new(0.2, 0.9, 0.1);
        let result = evaluate(&spec, &scores, &[], None);
        assert!(!result.passed);
    }

    #[test]
    fn fails_on_unmitigated_high_severity_risk() {
        let hypotheses = vec![FailureHypothesis {
            id: HypothesisId::new("h1"),
            text: "data loss on migration".to_string(),
            severity: Severity::High,
            mitigation: None,
            addressed: false,
        }];
        let scores = AmbiguityScores::new(0.2, 0.9, 0.1);
        let result = evaluate(&draft(), &scores, &hypotheses, None);
        assert!(!result.passed);
        assert!(result.required_actions.iter().any(|a| a.contains("mitigation")));
    }

    #[test]
    fn fails_above_ambiguity_ceiling() {
        let scores = AmbiguityScores::new(0.6, 0.9, 0.1);
        let result = evaluate(&draft(), &scores, &[], None);
        assert!(!result.passed);
    }
}
