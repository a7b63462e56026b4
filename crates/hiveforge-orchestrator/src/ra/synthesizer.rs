// hiveforge-orchestrator/src/ra/synthesizer.rs
// ============================================================================
// Module: Spec Synthesizer
// Description: LLM worker producing a SpecDraft from mined intent and assumptions (§4.5.2).
// Dependencies: hiveforge_llm::LlmClient, hiveforge_core::SpecDraft
// ============================================================================

use hiveforge_core::AcceptanceCriterion;
use hiveforge_core::DraftId;
use hiveforge_core::SpecDraft;
use hiveforge_llm::LlmClient;
use serde::Deserialize;

use crate::error::OrchestratorError;
use crate::ra::llm_support::call_structured;

const SYSTEM_PROMPT: &str = "\
You synthesize a requirement specification from mined intent, confirmed \
assumptions, and prior feedback. Respond with a single JSON object: \
{\"goal\": string, \"acceptance_criteria\": [string or {\"text\": string, \
\"measurable\": bool, \"metric\": string|null, \"threshold\": string|null}], \
\"constraints\": [string], \"non_goals\": [string], \"open_items\": \
[string], \"risk_mitigations\": [string]}. Respond with JSON only.";

/// A single acceptance criterion as the LLM may return it: either a raw
/// string or the fully structured form (§4.5.2 "accepts either structured
/// AcceptanceCriterion or raw strings").
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCriterion {
    /// A plain-text criterion.
    Raw(String),
    /// A fully structured, measurable criterion.
    Structured {
        /// Criterion text.
        text: String,
        /// Whether this criterion is objectively measurable.
        measurable: bool,
        /// Metric name, when measurable.
        #[serde(default)]
        metric: Option<String>,
        /// Threshold value, when measurable.
        #[serde(default)]
        threshold: Option<String>,
    },
}

impl From<RawCriterion> for AcceptanceCriterion {
    fn from(value: RawCriterion) -> Self {
        match value {
            RawCriterion::Raw(text) => Self::from_raw(text),
            RawCriterion::Structured { text, measurable, metric, threshold } => {
                Self { text, measurable, metric, threshold }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSpecDraft {
    goal: String,
    acceptance_criteria: Vec<RawCriterion>,
    #[serde(default)]
    constraints: Vec<String>,
    #[serde(default)]
    non_goals: Vec<String>,
    #[serde(default)]
    open_items: Vec<String>,
    #[serde(default)]
    risk_mitigations: Vec<String>,
}

/// Synthesizes a [`SpecDraft`] from mined intent and assumptions (§4.5.2).
pub struct SpecSynthesizer;

impl SpecSynthesizer {
    /// Synthesizes `version`'s draft from `context`, assigning `draft_id`.
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError::Llm`]/[`OrchestratorError::MalformedResponse`].
    pub async fn synthesize(
        llm: &dyn LlmClient,
        context: &str,
        draft_id: DraftId,
        version: u32,
    ) -> Result<SpecDraft, OrchestratorError> {
        let raw: RawSpecDraft = call_structured(llm, SYSTEM_PROMPT, context).await?;
        Ok(SpecDraft {
            draft_id,
            version,
            goal: raw.goal,
            acceptance_criteria: raw.acceptance_criteria.into_iter().map(AcceptanceCriterion::from).collect(),
            constraints: raw.constraints,
            non_goals: raw.non_goals,
            open_items: raw.open_items,
            risk_mitigations: raw.risk_mitigations,
            doorstop_id: None,
            file_path: None,
        })
    }
}
