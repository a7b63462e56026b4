// hiveforge-orchestrator/src/ra/assumption_mapper.rs
// ============================================================================
// Module: Assumption Mapper
// Description: LLM worker proposing assumptions, with confidence-driven
//              post-processing (§4.5.2).
// Dependencies: hiveforge_llm::LlmClient, hiveforge_core::{Assumption, AssumptionStatus}
// ============================================================================

use hiveforge_core::Assumption;
use hiveforge_core::AssumptionId;
use hiveforge_core::AssumptionStatus;
use hiveforge_core::ra_domain::MAX_ASSUMPTIONS_PER_RUN;
use hiveforge_llm::LlmClient;
use serde::Deserialize;

use crate::error::OrchestratorError;
use crate::ra::llm_support::call_structured;

const SYSTEM_PROMPT: &str = "\
You propose assumptions an implementer could safely make about an \
under-specified request, each with a confidence in [0, 1]. Respond with a \
single JSON object: {\"assumptions\": [{\"text\": string, \"confidence\": \
number, \"evidence_ids\": [string]}]}. Respond with JSON only.";

#[derive(Debug, Deserialize)]
struct RawAssumption {
    text: String,
    confidence: f64,
    #[serde(default)]
    evidence_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawAssumptions {
    assumptions: Vec<RawAssumption>,
}

/// Result of one assumption-mapping pass (§4.5.2): surviving assumptions
/// plus the low-confidence items reported back as unknowns.
pub struct MappedAssumptions {
    /// Assumptions retained (capped at [`MAX_ASSUMPTIONS_PER_RUN`]).
    pub assumptions: Vec<Assumption>,
    /// Text of assumptions dropped for `confidence < 0.3`.
    pub unknowns: Vec<String>,
}

/// Confidence floor below which a proposed assumption is dropped and
/// reported as an unknown instead (§4.5.2).
const DROP_THRESHOLD: f64 = 0.3;
/// Confidence ceiling at or above which an assumption is auto-approved
/// without a clarification round (§4.5.2).
const AUTO_APPROVE_THRESHOLD: f64 = 0.8;

/// Maps raw intake text (plus mined intent) to a set of assumptions.
pub struct AssumptionMapper;

impl AssumptionMapper {
    /// Calls the LLM to propose assumptions, then applies the confidence
    /// post-processing rules from §4.5.2.
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError::Llm`]/[`OrchestratorError::MalformedResponse`].
    pub async fn map(llm: &dyn LlmClient, context: &str) -> Result<MappedAssumptions, OrchestratorError> {
        let raw: RawAssumptions = call_structured(llm, SYSTEM_PROMPT, context).await?;

        let mut unknowns = Vec::new();
        let mut kept = Vec::new();
        for (index, item) in raw.assumptions.into_iter().enumerate() {
            if item.confidence < DROP_THRESHOLD {
                unknowns.push(item.text);
                continue;
            }
            let status = if item.confidence >= AUTO_APPROVE_THRESHOLD {
                AssumptionStatus::AutoApproved
            } else {
                AssumptionStatus::Pending
            };
            kept.push(Assumption {
                id: AssumptionId::new(format!("assumption-{index}")),
                text: item.text,
                confidence: item.confidence.clamp(0.0, 1.0),
                evidence_ids: item.evidence_ids,
                status,
                user_response: None,
            });
        }
        kept.truncate(MAX_ASSUMPTIONS_PER_RUN);

        Ok(MappedAssumptions { assumptions: kept, unknowns })
    }
}

#[cfg(test)]
mod tests {
    use hiveforge_llm::ChatResponse;
    use hiveforge_llm::FinishReason;
    use hiveforge_llm::Usage;

    use super::*;

    struct StubClient {
        body: &'static str,
    }

    #[async_trait::async_trait]
    impl LlmClient for StubClient {
        async fn chat(
            &self,
            _messages: &[hiveforge_llm::ChatMessage],
            _tools: &[hiveforge_llm::ToolSchema],
            _tool_choice: hiveforge_llm::ToolChoice,
        ) -> Result<ChatResponse, hiveforge_llm::LlmError> {
            Ok(ChatResponse {
                content: Some(self.body.to_string()),
                tool_calls: Vec::new(),
                finish_reason: FinishReason::Stop,
                usage: Usage::default(),
            })
        }
    }

    #[tokio::test]
    async fn low_confidence_assumptions_become_unknowns() {
        let client = StubClient {
            body: r#"{"assumptions":[
                {"text":"uses postgres","confidence":0.9,"evidence_ids":[]},
                {"text":"wild guess","confidence":0.1,"evidence_ids":[]}
            ]}"#,
        };
        let result = AssumptionMapper::map(&client, "ctx").await.expect("map");
        assert_eq!(result.assumptions.len(), 1);
        assert_eq!(result.assumptions[0].status, AssumptionStatus::AutoApproved);
        assert_eq!(result.unknowns, vec!["wild guess".to_string()]);
    }

    #[tokio::test]
    async fn caps_at_ten_assumptions() {
        let items: Vec<String> = (0 .. 15)
            .map(|i| format!(r#"{{"text":"a{i}","confidence":0.5,"evidence_ids":[]}}"#))
            .collect();
        let body = format!(r#"{{"assumptions":[{}]}}"#, items.join(","));
        let client = StubClient { body: Box::leak(body.into_boxed_str()) };
        let result = AssumptionMapper::map(&client, "ctx").await.expect("map");
        assert_eq!(result.assumptions.len(), MAX_ASSUMPTIONS_PER_RUN);
    }
}
