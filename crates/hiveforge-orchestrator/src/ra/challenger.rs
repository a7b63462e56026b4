// hiveforge-orchestrator/src/ra/challenger.rs
// ============================================================================
// Module: Risk Challenger
// Description: Phase A (failure hypotheses) and Phase B (challenges against a
//              draft) LLM workers (§4.5.2).
// Dependencies: hiveforge_llm::LlmClient, hiveforge_core::{FailureHypothesis, Challenge, ChallengeReport}
// ============================================================================

use hiveforge_core::Challenge;
use hiveforge_core::ChallengeId;
use hiveforge_core::ChallengeReport;
use hiveforge_core::FailureHypothesis;
use hiveforge_core::HypothesisId;
use hiveforge_core::ReportId;
use hiveforge_core::SpecDraft;
use hiveforge_core::ra_domain::MAX_CHALLENGES_PER_REPORT;
use hiveforge_core::ra_domain::MAX_HYPOTHESES_PER_RUN;
use hiveforge_llm::LlmClient;
use serde::Deserialize;

use crate::error::OrchestratorError;
use crate::ra::llm_support::call_structured;

const PHASE_A_SYSTEM_PROMPT: &str = "\
You hypothesize ways a requirement could fail in practice. Respond with a \
single JSON object: {\"hypotheses\": [{\"text\": string, \"severity\": \
\"LOW\"|\"MEDIUM\"|\"HIGH\", \"mitigation\": string|null}]}. Respond with \
JSON only.";

const PHASE_B_SYSTEM_PROMPT: &str = "\
You adversarially challenge a specification draft, looking for unjustified \
claims. Respond with a single JSON object: {\"challenges\": [{\"claim\": \
string, \"evidence\": string, \"severity\": \"LOW\"|\"MEDIUM\"|\"HIGH\", \
\"required_action\": \"clarify\"|\"spec_revision\"|\"block\"|\"log_only\", \
\"counterexample\": string|null}], \"summary\": string}. Respond with JSON \
only.";

#[derive(Debug, Deserialize)]
struct RawHypothesis {
    text: String,
    severity: hiveforge_core::Severity,
    mitigation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawHypotheses {
    hypotheses: Vec<RawHypothesis>,
}

#[derive(Debug, Deserialize)]
struct RawChallenge {
    claim: String,
    evidence: String,
    severity: hiveforge_core::Severity,
    required_action: hiveforge_core::RequiredAction,
    counterexample: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawChallenges {
    challenges: Vec<RawChallenge>,
    summary: String,
}

/// Risk Challenger: Phase A hypothesizes failures, Phase B challenges a
/// synthesized draft (§4.5.2).
pub struct RiskChallenger;

impl RiskChallenger {
    /// Phase A: hypothesizes failure modes for raw intake text, capped at
    /// [`MAX_HYPOTHESES_PER_RUN`].
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError::Llm`]/[`OrchestratorError::MalformedResponse`].
    pub async fn hypothesize(llm: &dyn LlmClient, context: &str) -> Result<Vec<FailureHypothesis>, OrchestratorError> {
        let raw: RawHypotheses = call_structured(llm, PHASE_A_SYSTEM_PROMPT, context).await?;
        let mut hypotheses: Vec<FailureHypothesis> = raw
            .hypotheses
            .into_iter()
            .enumerate()
            .map(|(index, item)| FailureHypothesis {
                id: HypothesisId::new(format!("hypothesis-{index}")),
                text: item.text,
                severity: item.severity,
                mitigation: item.mitigation,
                addressed: false,
            })
            .collect();
        hypotheses.truncate(MAX_HYPOTHESES_PER_RUN);
        Ok(hypotheses)
    }

    /// Phase B: challenges `draft`, capped at [`MAX_CHALLENGES_PER_REPORT`],
    /// with the verdict computed via [`ChallengeReport::compute_verdict`].
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError::Llm`]/[`OrchestratorError::MalformedResponse`].
    pub async fn challenge(llm: &dyn LlmClient, draft: &SpecDraft) -> Result<ChallengeReport, OrchestratorError> {
        let context = serde_json::to_string(draft).unwrap_or_default();
        let raw: RawChallenges = call_structured(llm, PHASE_B_SYSTEM_PROMPT, &context).await?;
        let mut challenges: Vec<Challenge> = raw
            .challenges
            .into_iter()
            .enumerate()
            .map(|(index, item)| Challenge {
                id: ChallengeId::new(format!("challenge-{index}")),
                claim: item.claim,
                evidence: item.evidence,
                severity: item.severity,
                required_action: item.required_action,
                counterexample: item.counterexample,
                addressed: false,
                resolution: None,
            })
            .collect();
        challenges.truncate(MAX_CHALLENGES_PER_REPORT);
        let verdict = ChallengeReport::compute_verdict(&challenges);
        Ok(ChallengeReport {
            report_id: ReportId::new(format!("report-{}", draft.draft_id)),
            draft_id: draft.draft_id.clone(),
            challenges,
            verdict,
            summary: raw.summary,
        })
    }
}
