// hiveforge-orchestrator/src/ra/clarifier.rs
// ============================================================================
// Module: Clarification Generator
// Description: LLM worker producing one round of clarification questions (§4.5.2).
// Dependencies: hiveforge_llm::LlmClient, hiveforge_core::ClarificationRound
// ============================================================================

use hiveforge_core::AssumptionId;
use hiveforge_core::ClarificationQuestion;
use hiveforge_core::ClarificationRound;
use hiveforge_core::QuestionId;
use hiveforge_core::QuestionType;
use hiveforge_core::ra_domain::MAX_QUESTIONS_PER_ROUND;
use hiveforge_llm::LlmClient;
use serde::Deserialize;

use crate::error::OrchestratorError;
use crate::ra::llm_support::call_structured;

const SYSTEM_PROMPT: &str = "\
You generate clarification questions for an ambiguous request, or none if \
the request is already clear enough to specify. Respond with a single JSON \
object: {\"questions\": [{\"text\": string, \"type\": \
\"yes_no\"|\"single_choice\"|\"multi_choice\"|\"free_text\", \"options\": \
[string], \"impact\": string, \"related_assumption_ids\": [string]}]}. \
Respond with JSON only.";

#[derive(Debug, Deserialize)]
struct RawQuestion {
    text: String,
    #[serde(rename = "type")]
    question_type: QuestionType,
    #[serde(default)]
    options: Vec<String>,
    impact: String,
    #[serde(default)]
    related_assumption_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawQuestions {
    questions: Vec<RawQuestion>,
}

/// Generates one [`ClarificationRound`] (§4.5.2).
pub struct ClarificationGenerator;

impl ClarificationGenerator {
    /// Generates round `round_number`, capping questions at
    /// [`MAX_QUESTIONS_PER_ROUND`]. An empty round signals
    /// [`ClarificationRound::skip_to_spec`].
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError::Llm`]/[`OrchestratorError::MalformedResponse`].
    pub async fn generate(
        llm: &dyn LlmClient,
        context: &str,
        round_number: u32,
    ) -> Result<ClarificationRound, OrchestratorError> {
        let raw: RawQuestions = call_structured(llm, SYSTEM_PROMPT, context).await?;
        let mut questions: Vec<ClarificationQuestion> = raw
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, item)| ClarificationQuestion {
                id: QuestionId::new(format!("round-{round_number}-question-{index}")),
                text: item.text,
                question_type: item.question_type,
                options: item.options,
                impact: item.impact,
                related_assumption_ids: item.related_assumption_ids.into_iter().map(AssumptionId::new).collect(),
                answer: None,
            })
            .collect();
        questions.truncate(MAX_QUESTIONS_PER_ROUND);
        Ok(ClarificationRound { round_number, questions })
    }
}
