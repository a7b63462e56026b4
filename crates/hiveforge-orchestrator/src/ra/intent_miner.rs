// hiveforge-orchestrator/src/ra/intent_miner.rs
// ============================================================================
// Module: Intent Miner
// Description: LLM worker mining goals, success criteria, constraints, non-goals,
//              and unknowns out of raw intake text (§4.5.2).
// Dependencies: hiveforge_llm::LlmClient, hiveforge_core::IntentGraph
// ============================================================================

use hiveforge_core::IntentGraph;
use hiveforge_llm::LlmClient;

use crate::error::OrchestratorError;
use crate::ra::llm_support::call_structured;

const SYSTEM_PROMPT: &str = "\
You mine structured intent out of a raw feature request. Respond with a \
single JSON object: {\"goals\": [string], \"success_criteria\": [string], \
\"constraints\": [string], \"non_goals\": [string], \"unknowns\": [string]}. \
Every field is a possibly-empty array of short strings. Respond with JSON only.";

/// Mines an [`IntentGraph`] out of raw intake text (§4.5.2).
pub struct IntentMiner;

impl IntentMiner {
    /// Calls the LLM to mine intent structure out of `text`.
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError::Llm`]/[`OrchestratorError::MalformedResponse`].
    pub async fn mine(llm: &dyn LlmClient, text: &str) -> Result<IntentGraph, OrchestratorError> {
        call_structured(llm, SYSTEM_PROMPT, text).await
    }
}
